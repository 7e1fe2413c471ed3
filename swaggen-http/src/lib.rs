//! axum integration: route handlers through a [`DocumentedRouter`], then let
//! [`ApiDocs::install`] build the document once and serve it.

pub mod docs;
pub mod handlers;
pub mod layers;
pub mod router;
pub mod spec_cell;

pub use docs::ApiDocs;
pub use handlers::{openapi_routes, spec_path};
pub use layers::init_tracing;
pub use router::DocumentedRouter;
pub use spec_cell::SpecCell;
