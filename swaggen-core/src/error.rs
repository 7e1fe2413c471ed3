/// Errors raised while building an API document.
///
/// Every variant is an authoring error detected at build time: the declared
/// routes and types are static, so a failing build must stop startup rather
/// than serve a partial document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocError {
    /// The properties documented in a type's doc block and its declared
    /// attributes disagree.
    PropertyMismatch {
        model: String,
        documented_only: Vec<String>,
        declared_only: Vec<String>,
    },
    /// A documented `ref` names a type that the matching declared attribute
    /// does not carry.
    UnresolvedReference {
        model: String,
        property: String,
        reference: String,
    },
    /// A list attribute referenced from a doc block does not carry exactly
    /// one item type.
    UnsupportedShape {
        model: String,
        property: String,
        arity: usize,
    },
    /// A definition has no display name to be registered under.
    MissingIdentity { type_name: String },
    /// Two distinct types claim the same display name.
    NameCollision { name: String },
    /// The structured block of a doc comment is not valid.
    DocBlock { model: String, message: String },
    /// The built document could not be serialized for serving.
    Serialization { message: String },
}

impl std::fmt::Display for DocError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocError::PropertyMismatch {
                model,
                documented_only,
                declared_only,
            } => {
                write!(f, "documented and declared properties of `{model}` disagree")?;
                if !documented_only.is_empty() {
                    write!(f, "; documented but not declared: {}", documented_only.join(", "))?;
                }
                if !declared_only.is_empty() {
                    write!(f, "; declared but not documented: {}", declared_only.join(", "))?;
                }
                Ok(())
            }
            DocError::UnresolvedReference {
                model,
                property,
                reference,
            } => write!(
                f,
                "`{model}.{property}` references `{reference}`, which is not among the declared attribute types"
            ),
            DocError::UnsupportedShape {
                model,
                property,
                arity,
            } => write!(
                f,
                "`{model}.{property}` must list exactly one item type to be referenced, found {arity}"
            ),
            DocError::MissingIdentity { type_name } => {
                write!(f, "no obj nor name defined for `{type_name}`")
            }
            DocError::NameCollision { name } => {
                write!(f, "definition name `{name}` is claimed by two distinct types")
            }
            DocError::DocBlock { model, message } => {
                write!(f, "invalid doc block on `{model}`: {message}")
            }
            DocError::Serialization { message } => {
                write!(f, "failed to serialize the API document: {message}")
            }
        }
    }
}

impl std::error::Error for DocError {}
