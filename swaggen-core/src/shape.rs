//! Static introspection of schema-bearing types.
//!
//! A [`TypeShape`] is the class-level view of a type: which primitive it
//! reduces to, or which user model it names. User models expose their
//! declared attributes and doc text through [`ApiModel`], usually via
//! `#[derive(ApiModel)]`.

use std::any::TypeId;
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

use serde_json::Value;

use crate::field::{Field, FieldMeta};
use crate::registry::DefinitionKey;

/// Leaf types of the field model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Integer,
    Float,
    String,
    Boolean,
    Date,
    DateTime,
}

/// Class-level representation of a type.
#[derive(Debug, Clone)]
pub enum TypeShape {
    Primitive(Primitive),
    Dictionary,
    /// Zero items is an untyped list, one is homogeneous, more is a tuple.
    List(Vec<TypeShape>),
    Union(Vec<TypeShape>),
    Model(ModelType),
}

impl TypeShape {
    pub fn list_of(item: TypeShape) -> Self {
        TypeShape::List(vec![item])
    }

    /// Model types reachable from this shape, in declaration order.
    pub fn models(&self) -> Vec<&ModelType> {
        let mut out = Vec::new();
        self.collect_models(&mut out);
        out
    }

    fn collect_models<'a>(&'a self, out: &mut Vec<&'a ModelType>) {
        match self {
            TypeShape::Primitive(_) | TypeShape::Dictionary => {}
            TypeShape::List(items) | TypeShape::Union(items) => {
                for item in items {
                    item.collect_models(out);
                }
            }
            TypeShape::Model(model) => out.push(model),
        }
    }
}

/// Identity and metadata hooks of a user-defined type.
#[derive(Debug, Clone)]
pub struct ModelType {
    id: TypeId,
    name: Cow<'static, str>,
    type_name: &'static str,
    doc: Option<&'static str>,
    attributes: fn() -> Vec<Attribute>,
    self_schema: fn() -> Option<Value>,
}

impl ModelType {
    /// The model type of a declared [`ApiModel`].
    pub fn of<T: ApiModel>() -> Self {
        ModelType {
            id: TypeId::of::<T>(),
            name: Cow::Borrowed(T::model_name()),
            type_name: std::any::type_name::<T>(),
            doc: T::model_doc(),
            attributes: T::attributes,
            self_schema: T::self_schema,
        }
    }

    /// The model type of a type that reports its own schema through schemars.
    pub fn json_schema<T: schemars::JsonSchema + 'static>() -> Self {
        ModelType {
            id: TypeId::of::<T>(),
            name: T::schema_name(),
            type_name: std::any::type_name::<T>(),
            doc: None,
            attributes: Vec::new,
            self_schema: json_schema_of::<T>,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Display name, which defaults to the type's own name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fully qualified Rust type name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn doc(&self) -> Option<&'static str> {
        self.doc
    }

    pub fn attributes(&self) -> Vec<Attribute> {
        (self.attributes)()
    }

    pub fn self_schema(&self) -> Option<Value> {
        (self.self_schema)()
    }

    pub fn is_self_describing(&self) -> bool {
        self.self_schema().is_some()
    }

    pub fn key(&self) -> DefinitionKey {
        DefinitionKey::Type(self.id)
    }
}

/// Serialize the schemars schema of `T`.
pub fn json_schema_of<T: schemars::JsonSchema>() -> Option<Value> {
    serde_json::to_value(schemars::schema_for!(T)).ok()
}

/// A statically declared attribute of a model.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: Cow<'static, str>,
    pub shape: TypeShape,
    pub required: bool,
    pub meta: FieldMeta,
}

impl Attribute {
    pub fn new(name: impl Into<Cow<'static, str>>, shape: TypeShape) -> Self {
        Attribute {
            name: name.into(),
            shape,
            required: false,
            meta: FieldMeta::default(),
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_meta(mut self, meta: FieldMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Private attributes (leading underscore) are never documented.
    pub fn is_private(&self) -> bool {
        self.name.starts_with('_')
    }
}

/// A schema-bearing type declaration.
///
/// Implement via `#[derive(ApiModel)]`:
///
/// ```ignore
/// /// A pet in the store.
/// ///
/// /// ---
/// /// required:
/// ///   - name
/// /// properties:
/// ///   name:
/// ///     type: string
/// ///   owner:
/// ///     ref: Owner
/// #[derive(ApiModel)]
/// pub struct Pet {
///     pub name: String,
///     pub owner: Owner,
/// }
/// ```
pub trait ApiModel: 'static {
    /// Display name of the definition (e.g. `"Pet"`).
    fn model_name() -> &'static str;

    /// Raw documentation text, if any.
    fn model_doc() -> Option<&'static str> {
        None
    }

    /// Declared attributes, in declaration order.
    fn attributes() -> Vec<Attribute>;

    /// Self-reported schema, for types implementing the self-describing protocol.
    fn self_schema() -> Option<Value> {
        None
    }
}

/// Types that reduce to a [`TypeShape`].
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be described as an API schema",
    label = "no schema shape for this type",
    note = "derive `ApiModel` for your own types, or wrap schemars types with `ModelType::json_schema`"
)]
pub trait Describe {
    fn shape() -> TypeShape;
}

macro_rules! describe_primitive {
    ($primitive:ident => $($ty:ty),+ $(,)?) => {
        $(
            impl Describe for $ty {
                fn shape() -> TypeShape {
                    TypeShape::Primitive(Primitive::$primitive)
                }
            }
        )+
    };
}

describe_primitive!(Integer => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
describe_primitive!(Float => f32, f64);
describe_primitive!(String => String, char);
describe_primitive!(Boolean => bool);
describe_primitive!(Date => chrono::NaiveDate);
describe_primitive!(DateTime => chrono::NaiveDateTime);

impl Describe for &str {
    fn shape() -> TypeShape {
        TypeShape::Primitive(Primitive::String)
    }
}

impl<Tz: chrono::TimeZone> Describe for chrono::DateTime<Tz> {
    fn shape() -> TypeShape {
        TypeShape::Primitive(Primitive::DateTime)
    }
}

impl<K, V, S> Describe for HashMap<K, V, S> {
    fn shape() -> TypeShape {
        TypeShape::Dictionary
    }
}

impl<K, V> Describe for BTreeMap<K, V> {
    fn shape() -> TypeShape {
        TypeShape::Dictionary
    }
}

impl Describe for serde_json::Map<String, Value> {
    fn shape() -> TypeShape {
        TypeShape::Dictionary
    }
}

impl Describe for Value {
    fn shape() -> TypeShape {
        TypeShape::Dictionary
    }
}

macro_rules! describe_sequence {
    ($($ty:ident),+) => {
        $(
            impl<T: Describe> Describe for $ty<T> {
                fn shape() -> TypeShape {
                    TypeShape::list_of(T::shape())
                }
            }
        )+
    };
}

describe_sequence!(Vec, VecDeque, BTreeSet);

impl<T: Describe, S> Describe for HashSet<T, S> {
    fn shape() -> TypeShape {
        TypeShape::list_of(T::shape())
    }
}

impl<T: Describe> Describe for [T] {
    fn shape() -> TypeShape {
        TypeShape::list_of(T::shape())
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn shape() -> TypeShape {
        TypeShape::list_of(T::shape())
    }
}

macro_rules! describe_transparent {
    ($($ty:ident),+) => {
        $(
            impl<T: Describe + ?Sized> Describe for $ty<T> {
                fn shape() -> TypeShape {
                    T::shape()
                }
            }
        )+
    };
}

describe_transparent!(Box, Arc, Rc);

impl<T: Describe> Describe for Option<T> {
    fn shape() -> TypeShape {
        T::shape()
    }
}

macro_rules! describe_tuple {
    ($($name:ident),+) => {
        impl<$($name: Describe),+> Describe for ($($name,)+) {
            fn shape() -> TypeShape {
                TypeShape::List(vec![$($name::shape()),+])
            }
        }
    };
}

describe_tuple!(A, B);
describe_tuple!(A, B, C);
describe_tuple!(A, B, C, D);

/// Input of the schema resolver: a type or a built field node.
#[derive(Debug, Clone)]
pub enum Schema {
    Type(TypeShape),
    Field(Field),
}

impl Schema {
    pub fn of<T: Describe + ?Sized>() -> Self {
        Schema::Type(T::shape())
    }

    /// A type implementing the self-describing protocol.
    pub fn json_schema<T: schemars::JsonSchema + 'static>() -> Self {
        Schema::Type(TypeShape::Model(ModelType::json_schema::<T>()))
    }

    /// Parameter name carried by a field node, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            Schema::Field(field) => field.meta().name.as_deref(),
            Schema::Type(_) => None,
        }
    }
}

impl From<Field> for Schema {
    fn from(field: Field) -> Self {
        Schema::Field(field)
    }
}

impl From<TypeShape> for Schema {
    fn from(shape: TypeShape) -> Self {
        Schema::Type(shape)
    }
}

impl From<Primitive> for Schema {
    fn from(primitive: Primitive) -> Self {
        Schema::Type(TypeShape::Primitive(primitive))
    }
}
