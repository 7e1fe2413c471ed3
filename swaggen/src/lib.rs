//! swaggen: Swagger 2.0 documents from self-describing Rust types.
//!
//! This facade crate re-exports the swaggen sub-crates through a single
//! dependency:
//!
//! ```ignore
//! use swaggen::prelude::*;
//! ```
//!
//! # Feature flags
//!
//! | Feature | Default | Crate          |
//! |---------|---------|----------------|
//! | `http`  | **yes** | `swaggen-http` |

// The derive uses `proc-macro-crate` to detect whether the user depends on
// `swaggen` or on `swaggen-core`, and generates the matching paths.
pub extern crate swaggen_core;
pub extern crate swaggen_macros;

pub use swaggen_core::*;
pub use swaggen_macros::ApiModel;

#[cfg(feature = "http")]
pub use swaggen_http;

#[cfg(feature = "http")]
pub use swaggen_http::{init_tracing, openapi_routes, ApiDocs, DocumentedRouter, SpecCell};

/// Everything needed to declare models and document handlers.
pub mod prelude {
    pub use swaggen_core::{
        ApiModel, DocConfig, DocError, Field, ParamLocation, ResponseExample, RouteSpecTable,
        Schema, Settings,
    };
    pub use swaggen_macros::ApiModel;

    #[cfg(feature = "http")]
    pub use swaggen_http::{init_tracing, ApiDocs, DocumentedRouter};
}
