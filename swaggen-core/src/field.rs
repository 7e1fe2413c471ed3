//! Field nodes: typed schema fragments.
//!
//! A [`Field`] knows how to render itself as a Swagger 2.0 schema fragment.
//! Rendering is pure; object references render as `$ref` pointers and it is
//! the resolver's job to make sure the pointed-to definition exists.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use crate::shape::{ApiModel, ModelType, Primitive};

/// Prefix of every definition pointer.
pub const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Pointer to the definition registered under `name`.
pub fn ref_path(name: &str) -> String {
    format!("{DEFINITIONS_PREFIX}{name}")
}

/// Optional attributes shared by every field kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMeta {
    pub name: Option<String>,
    pub description: Option<String>,
    pub required: Option<bool>,
    pub choices: Option<Vec<Value>>,
    pub example: Option<Value>,
}

impl FieldMeta {
    /// Add the attributes that are set to `out`.
    pub fn write_into(&self, out: &mut Map<String, Value>) {
        if let Some(ref name) = self.name {
            out.insert("name".into(), json!(name));
        }
        if let Some(ref description) = self.description {
            out.insert("description".into(), json!(description));
        }
        if let Some(required) = self.required {
            out.insert("required".into(), json!(required));
        }
        if let Some(ref choices) = self.choices {
            out.insert("enum".into(), Value::Array(choices.clone()));
        }
        if let Some(ref example) = self.example {
            out.insert("example".into(), example.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == FieldMeta::default()
    }
}

/// Reference to a user type, rendered as a pointer into the definitions.
#[derive(Debug, Clone)]
pub struct ObjectRef {
    model: ModelType,
    display_name: Cow<'static, str>,
}

impl ObjectRef {
    pub fn new(model: ModelType) -> Self {
        let display_name = Cow::Owned(model.name().to_string());
        ObjectRef {
            model,
            display_name,
        }
    }

    pub fn model(&self) -> &ModelType {
        &self.model
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

#[derive(Debug, Clone)]
pub enum FieldKind {
    Integer,
    Float,
    String,
    Boolean,
    Date,
    DateTime,
    Dictionary(BTreeMap<String, Field>),
    List(Vec<Field>),
    Object(ObjectRef),
}

/// A typed schema fragment descriptor. The kind is fixed at construction.
#[derive(Debug, Clone)]
pub struct Field {
    kind: FieldKind,
    meta: FieldMeta,
}

impl Field {
    fn with_kind(kind: FieldKind) -> Self {
        Field {
            kind,
            meta: FieldMeta::default(),
        }
    }

    pub fn integer() -> Self {
        Self::with_kind(FieldKind::Integer)
    }

    pub fn float() -> Self {
        Self::with_kind(FieldKind::Float)
    }

    pub fn string() -> Self {
        Self::with_kind(FieldKind::String)
    }

    pub fn boolean() -> Self {
        Self::with_kind(FieldKind::Boolean)
    }

    pub fn date() -> Self {
        Self::with_kind(FieldKind::Date)
    }

    pub fn date_time() -> Self {
        Self::with_kind(FieldKind::DateTime)
    }

    pub fn primitive(primitive: Primitive) -> Self {
        match primitive {
            Primitive::Integer => Self::integer(),
            Primitive::Float => Self::float(),
            Primitive::String => Self::string(),
            Primitive::Boolean => Self::boolean(),
            Primitive::Date => Self::date(),
            Primitive::DateTime => Self::date_time(),
        }
    }

    pub fn dictionary<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Field)>,
    {
        let fields = fields.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self::with_kind(FieldKind::Dictionary(fields))
    }

    pub fn list(items: Vec<Field>) -> Self {
        Self::with_kind(FieldKind::List(items))
    }

    pub fn list_of(item: Field) -> Self {
        Self::list(vec![item])
    }

    pub fn object(model: ModelType) -> Self {
        Self::with_kind(FieldKind::Object(ObjectRef::new(model)))
    }

    pub fn model<T: ApiModel>() -> Self {
        Self::object(ModelType::of::<T>())
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.meta.name = Some(name.into());
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.meta.description = Some(description.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.meta.required = Some(required);
        self
    }

    pub fn choices<I, V>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.meta.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    pub fn example(mut self, example: impl Into<Value>) -> Self {
        self.meta.example = Some(example.into());
        self
    }

    /// Override the display name of an object reference. No-op on other kinds.
    pub fn object_name(mut self, name: impl Into<String>) -> Self {
        if let FieldKind::Object(ref mut object) = self.kind {
            object.display_name = Cow::Owned(name.into());
        }
        self
    }

    pub fn with_meta(mut self, meta: FieldMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn meta(&self) -> &FieldMeta {
        &self.meta
    }

    /// Object references in this node and its children, depth first.
    pub fn object_refs(&self) -> Vec<&ObjectRef> {
        let mut out = Vec::new();
        self.collect_refs(&mut out);
        out
    }

    fn collect_refs<'a>(&'a self, out: &mut Vec<&'a ObjectRef>) {
        match &self.kind {
            FieldKind::Dictionary(fields) => {
                for field in fields.values() {
                    field.collect_refs(out);
                }
            }
            FieldKind::List(items) => {
                for item in items {
                    item.collect_refs(out);
                }
            }
            FieldKind::Object(object) => out.push(object),
            _ => {}
        }
    }

    /// Render this node, pointing object references at their own display name.
    pub fn serialize(&self) -> Value {
        self.render(&|object| object.display_name().to_string())
    }

    /// Render this node, asking `pointer_name` which definition each object
    /// reference points at.
    pub fn render(&self, pointer_name: &dyn Fn(&ObjectRef) -> String) -> Value {
        let mut out = Map::new();
        match &self.kind {
            FieldKind::Integer => {
                out.insert("type".into(), json!("integer"));
                out.insert("format".into(), json!("int64"));
            }
            FieldKind::Float => {
                out.insert("type".into(), json!("number"));
                out.insert("format".into(), json!("double"));
            }
            FieldKind::String => {
                out.insert("type".into(), json!("string"));
            }
            FieldKind::Boolean => {
                out.insert("type".into(), json!("boolean"));
            }
            FieldKind::Date => {
                out.insert("type".into(), json!("string"));
                out.insert("format".into(), json!("date"));
            }
            FieldKind::DateTime => {
                out.insert("type".into(), json!("string"));
                out.insert("format".into(), json!("date-time"));
            }
            FieldKind::Dictionary(fields) => {
                let properties: Map<String, Value> = fields
                    .iter()
                    .map(|(key, field)| (key.clone(), field.render(pointer_name)))
                    .collect();
                out.insert("type".into(), json!("object"));
                out.insert("properties".into(), Value::Object(properties));
            }
            FieldKind::List(items) => {
                out.insert("type".into(), json!("array"));
                out.insert("items".into(), render_items(items, pointer_name));
            }
            FieldKind::Object(object) => {
                out.insert("type".into(), json!("object"));
                out.insert("$ref".into(), json!(ref_path(&pointer_name(object))));
            }
        }
        self.meta.write_into(&mut out);
        Value::Object(out)
    }
}

/// Items of a list: one fragment, a tuple of fragments, or any.
fn render_items(items: &[Field], pointer_name: &dyn Fn(&ObjectRef) -> String) -> Value {
    match items {
        [] => json!({}),
        [single] => single.render(pointer_name),
        many => Value::Array(many.iter().map(|item| item.render(pointer_name)).collect()),
    }
}
