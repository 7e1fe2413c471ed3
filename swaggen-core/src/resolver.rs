//! Turning types and field nodes into schema fragments.
//!
//! Resolving a schema renders it as a fragment and, as a side effect,
//! registers every user model it reaches into the [`DefinitionRegistry`].
//! A model's definition body comes from the first [`Strategy`] that applies
//! to it. Nested models are processed from a worklist; models that are
//! already registered are never re-entered, so cyclic type graphs terminate.

use std::collections::{BTreeSet, HashSet, VecDeque};

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::docblock;
use crate::error::DocError;
use crate::field::{ref_path, Field, DEFINITIONS_PREFIX};
use crate::registry::{DefinitionKey, DefinitionRegistry};
use crate::shape::{Attribute, ModelType, Schema, TypeShape};

/// A definition body computed by a strategy, with what it depends on.
#[derive(Debug, Clone, Default)]
pub struct Resolved {
    pub body: Value,
    /// Models referenced by the body, to be registered next.
    pub dependencies: Vec<ModelType>,
    /// Extra named definitions reported alongside the body.
    pub named: Vec<(String, Value)>,
}

/// Metadata sources for a model's definition, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// The type reports its own schema (schemars).
    SelfDescribing,
    /// A YAML block in the type's documentation.
    DocBlock,
    /// The declared attributes and their field-builder metadata.
    FieldBuilders,
}

impl Strategy {
    pub const ORDER: [Strategy; 3] = [
        Strategy::SelfDescribing,
        Strategy::DocBlock,
        Strategy::FieldBuilders,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::SelfDescribing => "self-describing",
            Strategy::DocBlock => "doc block",
            Strategy::FieldBuilders => "field builders",
        }
    }

    /// Compute the body of `model`, or `None` if this strategy does not apply.
    /// Never mutates the registry; it is only read to name pointers.
    pub fn apply(
        self,
        model: &ModelType,
        registry: &DefinitionRegistry,
    ) -> Option<Result<Resolved, DocError>> {
        match self {
            Strategy::SelfDescribing => model.self_schema().map(|schema| Ok(split_self_schema(schema))),
            Strategy::DocBlock => {
                let text = docblock::split(model.doc()?);
                let block = text.block?;
                Some(from_doc_block(model, registry, text.narrative, &block))
            }
            Strategy::FieldBuilders => Some(Ok(from_field_builders(model, registry))),
        }
    }
}

/// Run the strategies in order and return the first body produced.
pub fn resolve_body(
    model: &ModelType,
    registry: &DefinitionRegistry,
) -> Result<(Strategy, Resolved), DocError> {
    for strategy in Strategy::ORDER {
        if let Some(result) = strategy.apply(model, registry) {
            return result.map(|resolved| (strategy, resolved));
        }
    }
    Ok((Strategy::FieldBuilders, from_field_builders(model, registry)))
}

/// Resolves schemas against a definition registry.
pub struct SchemaResolver<'r> {
    registry: &'r mut DefinitionRegistry,
}

impl<'r> SchemaResolver<'r> {
    pub fn new(registry: &'r mut DefinitionRegistry) -> Self {
        SchemaResolver { registry }
    }

    pub fn registry(&self) -> &DefinitionRegistry {
        &*self.registry
    }

    /// Render `schema` as a fragment, registering the models it reaches.
    ///
    /// Primitives render inline; models render as `$ref` pointers.
    pub fn resolve(&mut self, schema: &Schema) -> Result<Value, DocError> {
        match schema {
            Schema::Type(shape) => self.resolve_shape(shape),
            Schema::Field(field) => self.resolve_field(field),
        }
    }

    pub fn resolve_shape(&mut self, shape: &TypeShape) -> Result<Value, DocError> {
        for model in shape.models() {
            self.define(model)?;
        }
        let mut dependencies = Vec::new();
        Ok(render_shape(shape, self.registry, &mut dependencies))
    }

    pub fn resolve_field(&mut self, field: &Field) -> Result<Value, DocError> {
        for object in field.object_refs() {
            self.define_as(object.model(), object.display_name())?;
        }
        let registry = &*self.registry;
        Ok(field.render(&|object| {
            pointer_name(registry, object.model(), object.display_name())
        }))
    }

    /// Register `model` (and everything it reaches) under its own name.
    /// Returns the name the model is registered under.
    pub fn define(&mut self, model: &ModelType) -> Result<String, DocError> {
        self.define_as(model, model.name())
    }

    fn define_as(&mut self, root: &ModelType, display_name: &str) -> Result<String, DocError> {
        let mut queue = VecDeque::from([(root.clone(), display_name.to_string())]);
        let mut queued = HashSet::from([root.key()]);

        while let Some((model, name)) = queue.pop_front() {
            if self.registry.contains(&model.key()) {
                continue;
            }
            if name.is_empty() {
                return Err(DocError::MissingIdentity {
                    type_name: model.type_name().to_string(),
                });
            }

            self.registry.reserve(model.key(), &name);
            let registered = resolve_body(&model, self.registry).and_then(|(strategy, resolved)| {
                let Resolved { body, dependencies, named } = resolved;
                self.registry.register(model.key(), &name, body)?;
                Ok((strategy, dependencies, named))
            });
            let (strategy, dependencies, named) = match registered {
                Ok(registered) => registered,
                Err(e) => {
                    self.registry.release(&model.key());
                    return Err(e);
                }
            };
            for (sub_name, sub_body) in named {
                self.registry
                    .register(DefinitionKey::Named(sub_name.clone()), &sub_name, sub_body)?;
            }
            debug!(model = %name, strategy = strategy.as_str(), "resolved model definition");

            for dependency in dependencies {
                let key = dependency.key();
                if !self.registry.contains(&key) && queued.insert(key) {
                    let name = dependency.name().to_string();
                    queue.push_back((dependency, name));
                }
            }
        }

        Ok(pointer_name(self.registry, root, display_name))
    }
}

/// The name a pointer to `model` must use: its registered name if it has one.
fn pointer_name(registry: &DefinitionRegistry, model: &ModelType, fallback: &str) -> String {
    registry
        .name_of(&model.key())
        .unwrap_or(fallback)
        .to_string()
}

/// Render a type shape, collecting the models it points at.
fn render_shape(
    shape: &TypeShape,
    registry: &DefinitionRegistry,
    dependencies: &mut Vec<ModelType>,
) -> Value {
    match shape {
        TypeShape::Primitive(primitive) => Field::primitive(*primitive).serialize(),
        TypeShape::Dictionary => Field::dictionary(Vec::<(String, Field)>::new()).serialize(),
        TypeShape::List(items) => {
            let items = match items.as_slice() {
                [] => json!({}),
                [single] => render_shape(single, registry, dependencies),
                many => Value::Array(
                    many.iter()
                        .map(|item| render_shape(item, registry, dependencies))
                        .collect(),
                ),
            };
            json!({ "type": "array", "items": items })
        }
        TypeShape::Union(alternatives) => {
            let one_of: Vec<Value> = alternatives
                .iter()
                .map(|alternative| render_shape(alternative, registry, dependencies))
                .collect();
            json!({ "oneOf": one_of })
        }
        TypeShape::Model(model) => {
            dependencies.push(model.clone());
            Field::object(model.clone())
                .render(&|object| pointer_name(registry, object.model(), object.display_name()))
        }
    }
}

fn definition_body(
    properties: Map<String, Value>,
    required: Vec<String>,
    description: Option<String>,
) -> Value {
    let mut body = Map::new();
    body.insert("type".into(), json!("object"));
    if !required.is_empty() {
        body.insert("required".into(), json!(required));
    }
    body.insert("properties".into(), Value::Object(properties));
    if let Some(description) = description {
        body.insert("description".into(), json!(description));
    }
    Value::Object(body)
}

fn documented_attributes(model: &ModelType) -> Vec<Attribute> {
    model
        .attributes()
        .into_iter()
        .filter(|attribute| !attribute.is_private())
        .collect()
}

fn attribute_properties(
    attributes: &[Attribute],
    registry: &DefinitionRegistry,
    dependencies: &mut Vec<ModelType>,
) -> Map<String, Value> {
    attributes
        .iter()
        .map(|attribute| {
            let mut fragment = render_shape(&attribute.shape, registry, dependencies);
            if let Value::Object(ref mut map) = fragment {
                attribute.meta.write_into(map);
            }
            (attribute.name.to_string(), fragment)
        })
        .collect()
}

fn required_of(attributes: &[Attribute]) -> Vec<String> {
    attributes
        .iter()
        .filter(|attribute| attribute.required)
        .map(|attribute| attribute.name.to_string())
        .collect()
}

// ── Self-describing strategy ────────────────────────────────────────────────

/// Split a schemars schema into its body and promoted sub-definitions.
///
/// schemars 1.x generates JSON Schema 2020-12 with `$defs` and
/// `#/$defs/X` pointers; Swagger 2.0 wants `#/definitions/X`.
fn split_self_schema(mut schema: Value) -> Resolved {
    let mut named = Vec::new();
    if let Some(obj) = schema.as_object_mut() {
        obj.remove("$schema");
        obj.remove("title");
        for defs_key in ["$defs", "definitions"] {
            if let Some(Value::Object(defs)) = obj.remove(defs_key) {
                for (name, mut def) in defs {
                    sanitize_schema(&mut def);
                    named.push((name, def));
                }
            }
        }
    }
    sanitize_schema(&mut schema);
    Resolved {
        body: schema,
        dependencies: Vec::new(),
        named,
    }
}

/// Rewrite `$ref` pointers to the definitions table and collapse nullable
/// type lists, which Swagger 2.0 cannot express.
fn sanitize_schema(value: &mut Value) {
    match value {
        Value::Object(obj) => {
            if let Some(Value::String(ref_str)) = obj.get_mut("$ref") {
                if let Some(name) = ref_str.strip_prefix("#/$defs/") {
                    *ref_str = format!("{DEFINITIONS_PREFIX}{name}");
                }
            }
            let collapsed = match obj.get("type") {
                Some(Value::Array(types)) => {
                    let mut non_null = types.iter().filter(|t| t.as_str() != Some("null"));
                    match (non_null.next(), non_null.next()) {
                        (Some(single), None) => Some(single.clone()),
                        _ => None,
                    }
                }
                _ => None,
            };
            if let Some(single) = collapsed {
                obj.insert("type".into(), single);
            }

            for (_, v) in obj.iter_mut() {
                sanitize_schema(v);
            }
        }
        Value::Array(arr) => {
            for v in arr.iter_mut() {
                sanitize_schema(v);
            }
        }
        _ => {}
    }
}

// ── Doc block strategy ──────────────────────────────────────────────────────

fn from_doc_block(
    model: &ModelType,
    registry: &DefinitionRegistry,
    narrative: Option<String>,
    yaml: &str,
) -> Result<Resolved, DocError> {
    let block = docblock::parse_block(yaml).map_err(|e| DocError::DocBlock {
        model: model.name().to_string(),
        message: e.to_string(),
    })?;
    let attributes = documented_attributes(model);
    let mut dependencies = Vec::new();

    let properties = match block.properties {
        Some(documented) => {
            check_properties(model, &documented, &attributes)?;
            let mut properties = Map::new();
            for (name, spec) in documented {
                let shape = attributes
                    .iter()
                    .find(|attribute| *attribute.name == *name)
                    .map(|attribute| &attribute.shape);
                let linked = match shape {
                    Some(shape) => {
                        link_property(model, &name, spec, shape, registry, &mut dependencies)?
                    }
                    None => spec,
                };
                properties.insert(name, linked);
            }
            properties
        }
        None => attribute_properties(&attributes, registry, &mut dependencies),
    };

    let required = block.required.unwrap_or_else(|| required_of(&attributes));
    Ok(Resolved {
        body: definition_body(properties, required, block.description.or(narrative)),
        dependencies,
        named: Vec::new(),
    })
}

/// Documented and declared property names must match exactly.
fn check_properties(
    model: &ModelType,
    documented: &Map<String, Value>,
    attributes: &[Attribute],
) -> Result<(), DocError> {
    let documented: BTreeSet<&str> = documented.keys().map(String::as_str).collect();
    let declared: BTreeSet<&str> = attributes.iter().map(|a| &*a.name).collect();

    let documented_only: Vec<String> = documented
        .difference(&declared)
        .map(|s| s.to_string())
        .collect();
    let declared_only: Vec<String> = declared
        .difference(&documented)
        .map(|s| s.to_string())
        .collect();

    if documented_only.is_empty() && declared_only.is_empty() {
        Ok(())
    } else {
        Err(DocError::PropertyMismatch {
            model: model.name().to_string(),
            documented_only,
            declared_only,
        })
    }
}

/// Rewrite the `ref` entries of a documented property into `$ref` pointers.
fn link_property(
    model: &ModelType,
    property: &str,
    spec: Value,
    shape: &TypeShape,
    registry: &DefinitionRegistry,
    dependencies: &mut Vec<ModelType>,
) -> Result<Value, DocError> {
    let mut spec = match spec {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            return Err(DocError::DocBlock {
                model: model.name().to_string(),
                message: format!("property `{property}` must be a mapping, found `{other}`"),
            })
        }
    };
    let site = RefSite {
        model,
        property,
        shape,
        registry,
    };

    if let Some(reference) = spec.remove("ref") {
        let target = site.lookup(&reference, false)?;
        spec.insert("$ref".into(), json!(site.pointer(&target)));
        dependencies.push(target);
    } else if type_is(&spec, "array") {
        if let Some(Value::Object(items)) = spec.get_mut("items") {
            if let Some(reference) = items.remove("ref") {
                let target = site.lookup(&reference, true)?;
                items.insert("$ref".into(), json!(site.pointer(&target)));
                dependencies.push(target);
            }
        }
    } else if type_is(&spec, "union") {
        spec.remove("type");
        let alternatives = match spec.remove("items") {
            Some(Value::Array(items)) => items,
            Some(single) => vec![single],
            None => Vec::new(),
        };
        let mut one_of = Vec::with_capacity(alternatives.len());
        for alternative in alternatives {
            let reference = match alternative {
                Value::Object(mut map) => map.remove("ref").unwrap_or(Value::Null),
                other => other,
            };
            let target = site.lookup(&reference, false)?;
            one_of.push(json!({ "$ref": site.pointer(&target) }));
            dependencies.push(target);
        }
        spec.insert("oneOf".into(), Value::Array(one_of));
    }

    Ok(Value::Object(spec))
}

fn type_is(spec: &Map<String, Value>, expected: &str) -> bool {
    spec.get("type")
        .and_then(Value::as_str)
        .is_some_and(|t| t.eq_ignore_ascii_case(expected))
}

/// A documented property whose references are being linked.
struct RefSite<'a> {
    model: &'a ModelType,
    property: &'a str,
    shape: &'a TypeShape,
    registry: &'a DefinitionRegistry,
}

impl RefSite<'_> {
    /// Find the model named by `reference` in the declared attribute type.
    ///
    /// With `strict_list`, a list wrapper must carry exactly one item type.
    fn lookup(&self, reference: &Value, strict_list: bool) -> Result<ModelType, DocError> {
        let name = reference.as_str().ok_or_else(|| DocError::DocBlock {
            model: self.model.name().to_string(),
            message: format!("`ref` of property `{}` must be a type name", self.property),
        })?;
        self.find(self.shape, name, strict_list)?
            .ok_or_else(|| DocError::UnresolvedReference {
                model: self.model.name().to_string(),
                property: self.property.to_string(),
                reference: name.to_string(),
            })
    }

    fn find(
        &self,
        shape: &TypeShape,
        name: &str,
        strict_list: bool,
    ) -> Result<Option<ModelType>, DocError> {
        match shape {
            TypeShape::Model(model) => Ok((model.name() == name).then(|| model.clone())),
            TypeShape::List(items) => match items.as_slice() {
                [single] => self.find(single, name, strict_list),
                _ if strict_list => Err(DocError::UnsupportedShape {
                    model: self.model.name().to_string(),
                    property: self.property.to_string(),
                    arity: items.len(),
                }),
                _ => self.find_any(items, name),
            },
            TypeShape::Union(alternatives) => self.find_any(alternatives, name),
            TypeShape::Primitive(_) | TypeShape::Dictionary => Ok(None),
        }
    }

    fn find_any(&self, shapes: &[TypeShape], name: &str) -> Result<Option<ModelType>, DocError> {
        for shape in shapes {
            if let Some(found) = self.find(shape, name, false)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    fn pointer(&self, target: &ModelType) -> String {
        ref_path(&pointer_name(self.registry, target, target.name()))
    }
}

// ── Field builder strategy ──────────────────────────────────────────────────

fn from_field_builders(model: &ModelType, registry: &DefinitionRegistry) -> Resolved {
    let attributes = documented_attributes(model);
    let mut dependencies = Vec::new();
    let properties = attribute_properties(&attributes, registry, &mut dependencies);
    let narrative = model.doc().and_then(|doc| docblock::split(doc).narrative);

    Resolved {
        body: definition_body(properties, required_of(&attributes), narrative),
        dependencies,
        named: Vec::new(),
    }
}
