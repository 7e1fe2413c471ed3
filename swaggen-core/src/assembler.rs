//! Swagger 2.0 document assembly.
//!
//! The builder walks the route table once, joins every operation against
//! its [`RouteSpec`] and resolves the declared fields through a
//! [`SchemaResolver`], which fills the definition registry as it goes.

use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::config::DocConfig;
use crate::error::DocError;
use crate::field::ref_path;
use crate::registry::DefinitionRegistry;
use crate::resolver::SchemaResolver;
use crate::route_spec::{ConsumedField, HandlerId, RouteSpec, RouteSpecTable};
use crate::routes::{templated_path, PathParam, RouteEntry, RouteSource};

/// Name of a consumed parameter whose field node carries no name.
const DEFAULT_PARAM_NAME: &str = "body";

/// Builds documents, owning the definition registry they are resolved into.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    registry: DefinitionRegistry,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Definitions registered by the last build.
    pub fn registry(&self) -> &DefinitionRegistry {
        &self.registry
    }

    /// Assemble the document for `source`.
    ///
    /// The registry is cleared first, so building twice from unchanged
    /// inputs yields identical documents.
    ///
    /// # Errors
    ///
    /// Any [`DocError`] raised while resolving a schema. No partial document
    /// is returned.
    pub fn build(
        &mut self,
        config: &DocConfig,
        specs: &RouteSpecTable,
        source: &dyn RouteSource,
    ) -> Result<Value, DocError> {
        self.registry.clear();
        let mut paths: Map<String, Value> = Map::new();
        let mut tags: Vec<String> = Vec::new();

        for route in source.routes() {
            if is_internal(&route.uri, config) {
                continue;
            }

            let mut methods = Map::new();
            for (method, handler) in route.handlers.expand() {
                let spec = specs.get(&handler);
                if method == "OPTIONS" || spec.exclude {
                    continue;
                }

                let operation_tags = effective_tags(spec, &handler, source);
                for tag in &operation_tags {
                    if !tags.contains(tag) {
                        tags.push(tag.clone());
                    }
                }

                let mut resolver = SchemaResolver::new(&mut self.registry);
                let operation =
                    build_operation(&mut resolver, config, route, spec, operation_tags)?;
                methods.insert(method.to_lowercase(), operation);
            }

            if methods.is_empty() {
                continue;
            }
            let path = templated_path(&route.uri);
            match paths.get_mut(&path) {
                Some(Value::Object(existing)) => existing.extend(methods),
                _ => {
                    paths.insert(path, Value::Object(methods));
                }
            }
        }

        info!(
            paths = paths.len(),
            definitions = self.registry.len(),
            "built API document"
        );

        let tags: Vec<Value> = tags.into_iter().map(|name| json!({ "name": name })).collect();
        Ok(json!({
            "swagger": "2.0",
            "info": config.info(),
            "schemes": config.schemes,
            "basePath": config.base_path,
            "tags": tags,
            "securityDefinitions": config.security_definitions_json(),
            "definitions": self.registry.to_definitions(),
            "paths": paths,
        }))
    }
}

/// Build a document with a fresh registry.
pub fn build_spec(
    config: &DocConfig,
    specs: &RouteSpecTable,
    source: &dyn RouteSource,
) -> Result<Value, DocError> {
    DocumentBuilder::new().build(config, specs, source)
}

/// Routes serving the documentation itself are not documented.
fn is_internal(uri: &str, config: &DocConfig) -> bool {
    (!config.docs_prefix.is_empty() && uri.starts_with(&config.docs_prefix))
        || uri.starts_with("/swagger")
        || uri.contains("<file_uri")
}

/// Explicit tags, or the name of the first group containing the handler.
fn effective_tags(spec: &RouteSpec, handler: &HandlerId, source: &dyn RouteSource) -> Vec<String> {
    if !spec.tags.is_empty() {
        return spec.tags.clone();
    }
    source
        .groups()
        .iter()
        .find(|group| group.contains(handler))
        .map(|group| vec![group.name.clone()])
        .unwrap_or_default()
}

fn build_operation(
    resolver: &mut SchemaResolver<'_>,
    config: &DocConfig,
    route: &RouteEntry,
    spec: &RouteSpec,
    tags: Vec<String>,
) -> Result<Value, DocError> {
    let mut parameters = Vec::new();
    for param in &route.parameters {
        parameters.push(path_parameter(resolver, param)?);
    }
    for consumed in &spec.consumes {
        parameters.extend(consumed_parameters(resolver, consumed)?);
    }

    let security: Vec<Value> = spec.security.iter().map(|s| s.to_json()).collect();
    let mut operation = json!({
        "operationId": spec.operation_id.as_deref().unwrap_or(&route.name),
        "summary": spec.summary,
        "description": spec.description,
        "consumes": spec.consumes_content_type.as_ref().unwrap_or(&config.consumes),
        "produces": spec.produces_content_type.as_ref().unwrap_or(&config.produces),
        "tags": (!tags.is_empty()).then_some(tags),
        "parameters": parameters,
        "responses": responses(resolver, spec)?,
        "security": security,
    });
    prune_nulls(&mut operation);
    Ok(operation)
}

fn path_parameter(resolver: &mut SchemaResolver<'_>, param: &PathParam) -> Result<Value, DocError> {
    let mut fragment = as_object(resolver.resolve_shape(&param.cast)?);
    fragment.insert("required".into(), json!(true));
    fragment.insert("in".into(), json!("path"));
    fragment.insert("name".into(), json!(param.name));
    Ok(Value::Object(fragment))
}

/// One parameter per property for object fragments, else a single one.
fn consumed_parameters(
    resolver: &mut SchemaResolver<'_>,
    consumed: &ConsumedField,
) -> Result<Vec<Value>, DocError> {
    let mut fragment = as_object(resolver.resolve(&consumed.schema)?);
    let location = consumed.location.as_str();

    let params = match fragment.remove("properties") {
        Some(Value::Object(properties)) => properties
            .into_iter()
            .map(|(name, property)| parameter(as_object(property), consumed.required, location, &name))
            .collect(),
        other => {
            if let Some(other) = other {
                fragment.insert("properties".into(), other);
            }
            let name = consumed.schema.name().unwrap_or(DEFAULT_PARAM_NAME).to_string();
            vec![parameter(fragment, consumed.required, location, &name)]
        }
    };
    Ok(params)
}

fn parameter(mut fragment: Map<String, Value>, required: bool, location: &str, name: &str) -> Value {
    fragment.insert("required".into(), json!(required));
    fragment.insert("in".into(), json!(location));
    fragment.insert("name".into(), json!(name));
    // A reference can only be carried by a body schema.
    if let Some(reference) = fragment.remove("$ref") {
        fragment.remove("type");
        fragment.insert("schema".into(), json!({ "$ref": reference }));
    }
    Value::Object(fragment)
}

fn responses(resolver: &mut SchemaResolver<'_>, spec: &RouteSpec) -> Result<Value, DocError> {
    let mut out = Map::new();
    for (status, response) in &spec.responses {
        let mut entry = Map::new();
        if let Some(ref description) = response.description {
            entry.insert("description".into(), json!(description));
        }
        match response.example.as_ref().and_then(|example| example.self_describing()) {
            Some(model) => {
                let name = resolver.define(model)?;
                entry.insert("schema".into(), json!({ "$ref": ref_path(&name) }));
            }
            None => warn!(status, "response example has no schema, documenting it without one"),
        }
        out.insert(status.to_string(), Value::Object(entry));
    }

    if let Some(ref produces) = spec.produces {
        if !out.contains_key("200") {
            let schema = resolver.resolve(produces)?;
            out.insert(
                "200".into(),
                json!({ "description": "Successful operation", "schema": schema }),
            );
        }
    }
    Ok(Value::Object(out))
}

fn as_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Drop every `null`-valued key, at any depth.
pub fn prune_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            for v in map.values_mut() {
                prune_nulls(v);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                prune_nulls(item);
            }
        }
        _ => {}
    }
}
