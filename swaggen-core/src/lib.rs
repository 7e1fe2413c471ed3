//! Schema resolution and Swagger 2.0 document assembly.
//!
//! Types describe themselves through [`Describe`] and [`ApiModel`]; handlers
//! are annotated in a [`RouteSpecTable`]; a [`DocumentBuilder`] joins both
//! against a [`RouteSource`] and emits the document.

pub mod assembler;
pub mod config;
pub mod docblock;
pub mod error;
pub mod field;
pub mod registry;
pub mod resolver;
pub mod route_spec;
pub mod routes;
pub mod shape;

pub use assembler::{build_spec, prune_nulls, DocumentBuilder};
pub use config::{ConfigError, ConfigValue, DocConfig, FromConfigValue, SecurityScheme, Settings};
pub use error::DocError;
pub use field::{ref_path, Field, FieldKind, FieldMeta, ObjectRef, DEFINITIONS_PREFIX};
pub use registry::{Definition, DefinitionKey, DefinitionRegistry};
pub use resolver::{resolve_body, Resolved, SchemaResolver, Strategy};
pub use route_spec::{
    ConsumedField, HandlerId, ParamLocation, ResponseExample, ResponseSpec, RouteSpec,
    RouteSpecBuilder, RouteSpecTable, SecurityRequirement,
};
pub use routes::{templated_path, PathParam, RouteEntry, RouteGroup, RouteHandlers, RouteSource, RouteTable};
pub use shape::{json_schema_of, ApiModel, Attribute, Describe, ModelType, Primitive, Schema, TypeShape};

// Re-exported for generated code.
pub use schemars;
pub use serde_json;
