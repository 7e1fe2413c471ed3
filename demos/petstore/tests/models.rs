use petstore::models::{Animal, Dog, NewPet, Owner, Pet, Toy};
use serde_json::{json, Value};
use swaggen::{ApiModel, DefinitionRegistry, Describe, Schema, SchemaResolver, TypeShape};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn resolve<T: Describe>() -> (Value, DefinitionRegistry) {
    let mut registry = DefinitionRegistry::new();
    let fragment = SchemaResolver::new(&mut registry)
        .resolve(&Schema::of::<T>())
        .unwrap();
    (fragment, registry)
}

fn body<'a>(registry: &'a DefinitionRegistry, name: &str) -> &'a Value {
    &registry
        .iter()
        .find(|definition| definition.name == name)
        .unwrap_or_else(|| panic!("no definition named {name}"))
        .body
}

// ── Doc blocks ──────────────────────────────────────────────────────────────

#[test]
fn doc_comment_is_kept_verbatim() {
    let doc = Pet::model_doc().unwrap();
    assert!(doc.starts_with("A pet for sale.\n\n---\nrequired:\n  - name\n"));
    assert_eq!(Dog::model_doc(), None);
}

#[test]
fn doc_block_drives_the_pet_definition() {
    let (fragment, registry) = resolve::<Pet>();
    assert_eq!(fragment, json!({ "type": "object", "$ref": "#/definitions/Pet" }));

    let pet = body(&registry, "Pet");
    assert_eq!(pet["description"], "A pet for sale.");
    assert_eq!(pet["required"], json!(["name", "kind"]));
    assert_eq!(
        pet["properties"]["id"],
        json!({ "type": "integer", "format": "int64", "readOnly": true })
    );
    assert_eq!(pet["properties"]["owner"], json!({ "$ref": "#/definitions/Owner" }));
    assert_eq!(
        pet["properties"]["toys"],
        json!({ "type": "array", "items": { "$ref": "#/definitions/Toy" } })
    );
    assert_eq!(
        pet["properties"]["kind"],
        json!({ "oneOf": [{ "$ref": "#/definitions/Cat" }, { "$ref": "#/definitions/Dog" }] })
    );

    for name in ["Pet", "Owner", "Toy", "Material", "Cat", "Dog"] {
        assert!(registry.contains_name(name), "{name} not registered");
    }
}

// ── Field attributes ────────────────────────────────────────────────────────

#[test]
fn field_attributes_shape_the_owner_definition() {
    let (_, registry) = resolve::<Owner>();
    let owner = body(&registry, "Owner");

    assert_eq!(owner["description"], "Someone who bought a pet.");
    assert_eq!(owner["required"], json!(["name", "status"]));
    assert_eq!(
        owner["properties"]["name"],
        json!({ "type": "string", "description": "Full name." })
    );
    assert_eq!(
        owner["properties"]["email"],
        json!({ "type": "string", "example": "owner@example.com" })
    );
    assert_eq!(
        owner["properties"]["status"],
        json!({ "type": "string", "enum": ["active", "retired"], "example": "active" })
    );
    assert!(owner["properties"].get("password_hash").is_none());
}

#[test]
fn renamed_model_and_property() {
    assert_eq!(NewPet::model_name(), "PetCreation");

    let (fragment, registry) = resolve::<NewPet>();
    assert_eq!(fragment["$ref"], "#/definitions/PetCreation");

    let new_pet = body(&registry, "PetCreation");
    assert_eq!(new_pet["required"], json!(["name", "ownerEmail", "kind"]));
    assert_eq!(new_pet["properties"]["ownerEmail"], json!({ "type": "string" }));
    assert_eq!(
        new_pet["properties"]["birthday"],
        json!({ "type": "string", "format": "date" })
    );
    assert!(new_pet["properties"].get("owner_email").is_none());
    assert!(new_pet.get("description").is_some());
}

#[test]
fn field_description_attribute() {
    let (_, registry) = resolve::<Dog>();
    let dog = body(&registry, "Dog");
    assert_eq!(
        dog["properties"]["trained"],
        json!({ "type": "boolean", "description": "Whether the dog has been trained." })
    );
    assert_eq!(dog["required"], json!(["trained"]));
    assert!(dog.get("description").is_none());
}

// ── Enums and self-describing types ─────────────────────────────────────────

#[test]
fn newtype_enum_is_a_union() {
    match Animal::shape() {
        TypeShape::Union(alternatives) => assert_eq!(alternatives.len(), 2),
        other => panic!("expected a union, got {other:?}"),
    }

    let (fragment, registry) = resolve::<Animal>();
    assert_eq!(
        fragment,
        json!({ "oneOf": [
            { "type": "object", "$ref": "#/definitions/Cat" },
            { "type": "object", "$ref": "#/definitions/Dog" }
        ] })
    );
    assert_eq!(registry.len(), 2);
}

#[test]
fn json_schema_model_describes_itself() {
    let (_, registry) = resolve::<Toy>();
    let toy = body(&registry, "Toy");

    assert!(toy.get("$schema").is_none());
    assert!(toy.get("title").is_none());
    assert_eq!(toy["properties"]["squeaky"], json!({ "type": "boolean" }));
    assert_eq!(
        toy["properties"]["material"],
        json!({ "$ref": "#/definitions/Material" })
    );
    assert_eq!(body(&registry, "Material")["enum"], json!(["plush", "rubber", "rope"]));
}
