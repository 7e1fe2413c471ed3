use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swaggen::ApiModel;

/// A pet for sale.
///
/// ---
/// required:
///   - name
///   - kind
/// properties:
///   id:
///     type: integer
///     format: int64
///     readOnly: true
///   name:
///     type: string
///     example: Rex
///   birthday:
///     type: string
///     format: date
///   owner:
///     ref: Owner
///   toys:
///     type: array
///     items:
///       ref: Toy
///   kind:
///     type: Union
///     items:
///       - ref: Cat
///       - Dog
#[derive(Debug, Clone, Serialize, Deserialize, ApiModel)]
pub struct Pet {
    pub id: i64,
    pub name: String,
    pub birthday: Option<NaiveDate>,
    pub owner: Option<Owner>,
    pub toys: Vec<Toy>,
    pub kind: Animal,
}

/// Someone who bought a pet.
#[derive(Debug, Clone, Serialize, Deserialize, ApiModel)]
pub struct Owner {
    /// Full name.
    pub name: String,
    #[field(example = "owner@example.com")]
    pub email: Option<String>,
    #[field(choices("active", "retired"), example = "active")]
    pub status: String,
    #[serde(skip)]
    #[field(skip)]
    pub password_hash: String,
}

/// Reports its own schema through schemars.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, ApiModel)]
#[model(json_schema)]
pub struct Toy {
    pub name: String,
    pub squeaky: bool,
    pub material: Material,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, ApiModel)]
#[serde(rename_all = "lowercase")]
#[model(json_schema)]
pub enum Material {
    Plush,
    Rubber,
    Rope,
}

#[derive(Debug, Clone, Serialize, Deserialize, ApiModel)]
pub struct Cat {
    pub indoor: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ApiModel)]
pub struct Dog {
    #[field(description = "Whether the dog has been trained.")]
    pub trained: bool,
    pub breed: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ApiModel)]
#[serde(tag = "species", rename_all = "lowercase")]
pub enum Animal {
    Cat(Cat),
    Dog(Dog),
}

/// Body of a pet creation request.
#[derive(Debug, Clone, Serialize, Deserialize, ApiModel)]
#[model(name = "PetCreation")]
pub struct NewPet {
    pub name: String,
    pub birthday: Option<NaiveDate>,
    #[serde(rename = "ownerEmail")]
    #[field(name = "ownerEmail", required)]
    pub owner_email: Option<String>,
    pub kind: Animal,
}

/// Error payload.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, ApiModel)]
#[model(json_schema)]
pub struct ApiError {
    pub message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
