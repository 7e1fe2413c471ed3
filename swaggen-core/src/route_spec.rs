//! Per-handler documentation metadata.
//!
//! Each route handler is annotated once at setup time through a
//! [`RouteSpecBuilder`]. Annotations are additive and order-independent:
//! a consumed field, a tag or a response never replaces an earlier one.
//!
//! ```ignore
//! let mut specs = RouteSpecTable::new();
//! specs
//!     .handler("get_pet")
//!     .summary("Fetch a pet")
//!     .consumes(Field::integer().named("limit"), ParamLocation::Query, true)
//!     .response_example(200, "The pet", ResponseExample::json_schema::<Pet>());
//! ```

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::{json, Value};

use crate::shape::{ApiModel, ModelType, Schema};

/// Stable identity of a route handler.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(Cow<'static, str>);

impl HandlerId {
    pub fn new(id: impl Into<Cow<'static, str>>) -> Self {
        HandlerId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for HandlerId {
    fn from(id: &'static str) -> Self {
        HandlerId(Cow::Borrowed(id))
    }
}

impl From<String> for HandlerId {
    fn from(id: String) -> Self {
        HandlerId(Cow::Owned(id))
    }
}

impl std::fmt::Display for HandlerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a parameter is located in the HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Query,
    Path,
    Body,
    Header,
}

impl ParamLocation {
    pub fn as_str(self) -> &'static str {
        match self {
            ParamLocation::Query => "query",
            ParamLocation::Path => "path",
            ParamLocation::Body => "body",
            ParamLocation::Header => "header",
        }
    }
}

/// A field the handler consumes.
#[derive(Debug, Clone)]
pub struct ConsumedField {
    pub schema: Schema,
    pub location: ParamLocation,
    pub required: bool,
}

/// Example payload attached to a declared response.
#[derive(Debug, Clone)]
pub enum ResponseExample {
    /// A model type; only self-describing models yield a response schema.
    Model(ModelType),
    /// A literal payload.
    Value(Value),
}

impl ResponseExample {
    pub fn model<T: ApiModel>() -> Self {
        ResponseExample::Model(ModelType::of::<T>())
    }

    pub fn json_schema<T: schemars::JsonSchema + 'static>() -> Self {
        ResponseExample::Model(ModelType::json_schema::<T>())
    }

    pub fn value(value: impl Into<Value>) -> Self {
        ResponseExample::Value(value.into())
    }

    /// The model to resolve, if the example describes its own schema.
    pub fn self_describing(&self) -> Option<&ModelType> {
        match self {
            ResponseExample::Model(model) if model.is_self_describing() => Some(model),
            _ => None,
        }
    }
}

/// A declared response for one status code.
#[derive(Debug, Clone, Default)]
pub struct ResponseSpec {
    pub description: Option<String>,
    pub example: Option<ResponseExample>,
}

/// A security requirement: a scheme name and its scopes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityRequirement {
    pub scheme: String,
    pub scopes: Vec<String>,
}

impl SecurityRequirement {
    pub fn to_json(&self) -> Value {
        json!({ self.scheme.clone(): self.scopes })
    }
}

/// Accumulated documentation metadata of one handler.
#[derive(Debug, Clone, Default)]
pub struct RouteSpec {
    pub tags: Vec<String>,
    pub consumes: Vec<ConsumedField>,
    pub consumes_content_type: Option<Vec<String>>,
    pub produces: Option<Schema>,
    pub produces_content_type: Option<Vec<String>>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub operation_id: Option<String>,
    pub responses: BTreeMap<u16, ResponseSpec>,
    pub security: Vec<SecurityRequirement>,
    pub exclude: bool,
}

/// Mapping from handler identity to its [`RouteSpec`].
#[derive(Debug, Default)]
pub struct RouteSpecTable {
    specs: HashMap<HandlerId, RouteSpec>,
    empty: RouteSpec,
}

impl RouteSpecTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start annotating `handler`, creating an empty spec on first touch.
    pub fn handler(&mut self, handler: impl Into<HandlerId>) -> RouteSpecBuilder<'_> {
        RouteSpecBuilder {
            spec: self.specs.entry(handler.into()).or_default(),
        }
    }

    /// The spec of `handler`, or an empty one if it was never annotated.
    pub fn get(&self, handler: &HandlerId) -> &RouteSpec {
        self.specs.get(handler).unwrap_or(&self.empty)
    }

    pub fn contains(&self, handler: &HandlerId) -> bool {
        self.specs.contains_key(handler)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Additive annotations on one handler's spec.
pub struct RouteSpecBuilder<'a> {
    spec: &'a mut RouteSpec,
}

impl RouteSpecBuilder<'_> {
    pub fn summary(self, text: impl Into<String>) -> Self {
        self.spec.summary = Some(text.into());
        self
    }

    pub fn description(self, text: impl Into<String>) -> Self {
        self.spec.description = Some(text.into());
        self
    }

    pub fn operation_id(self, id: impl Into<String>) -> Self {
        self.spec.operation_id = Some(id.into());
        self
    }

    /// Add a consumed field.
    pub fn consumes(
        self,
        schema: impl Into<Schema>,
        location: ParamLocation,
        required: bool,
    ) -> Self {
        self.spec.consumes.push(ConsumedField {
            schema: schema.into(),
            location,
            required,
        });
        self
    }

    pub fn consumes_content_type<I, S>(self, content_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.consumes_content_type = Some(content_types.into_iter().map(Into::into).collect());
        self
    }

    pub fn produces(self, schema: impl Into<Schema>) -> Self {
        self.spec.produces = Some(schema.into());
        self
    }

    pub fn produces_content_type<I, S>(self, content_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.produces_content_type = Some(content_types.into_iter().map(Into::into).collect());
        self
    }

    /// Add a tag; tags form an ordered set.
    pub fn tag(self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.spec.tags.contains(&name) {
            self.spec.tags.push(name);
        }
        self
    }

    pub fn security<I, S>(self, scheme: impl Into<String>, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.security.push(SecurityRequirement {
            scheme: scheme.into(),
            scopes: scopes.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Declare a response for `status` without an example payload.
    pub fn response(self, status: u16, description: impl Into<String>) -> Self {
        self.spec.responses.insert(
            status,
            ResponseSpec {
                description: Some(description.into()),
                example: None,
            },
        );
        self
    }

    /// Declare a response for `status` with an example payload. Only a
    /// self-describing model example gives the response a schema.
    pub fn response_example(
        self,
        status: u16,
        description: impl Into<String>,
        example: ResponseExample,
    ) -> Self {
        self.spec.responses.insert(
            status,
            ResponseSpec {
                description: Some(description.into()),
                example: Some(example),
            },
        );
        self
    }

    pub fn exclude(self, exclude: bool) -> Self {
        self.spec.exclude = exclude;
        self
    }
}
