use serde_json::json;
use swaggen_core::{Field, HandlerId, ParamLocation, ResponseExample, RouteSpecTable, Schema};

#[test]
fn unknown_handler_has_empty_spec() {
    let specs = RouteSpecTable::new();
    let spec = specs.get(&HandlerId::from("nobody"));
    assert!(spec.tags.is_empty());
    assert!(spec.consumes.is_empty());
    assert!(spec.responses.is_empty());
    assert!(!spec.exclude);
    assert!(specs.is_empty());
}

#[test]
fn annotations_accumulate() {
    let mut specs = RouteSpecTable::new();
    specs
        .handler("create_pet")
        .consumes(Field::string().named("name"), ParamLocation::Query, true)
        .tag("pets");
    specs
        .handler("create_pet")
        .consumes(Schema::of::<i64>(), ParamLocation::Header, false)
        .tag("store")
        .tag("pets")
        .response(201, "Created")
        .security("appToken", ["write"]);

    let spec = specs.get(&HandlerId::from("create_pet"));
    assert_eq!(specs.len(), 1);
    assert_eq!(spec.tags, vec!["pets".to_string(), "store".to_string()]);
    assert_eq!(spec.consumes.len(), 2);
    assert_eq!(spec.consumes[0].location, ParamLocation::Query);
    assert!(spec.consumes[0].required);
    assert_eq!(spec.consumes[1].location.as_str(), "header");
    assert_eq!(spec.responses[&201].description.as_deref(), Some("Created"));
    assert_eq!(spec.security[0].to_json(), json!({ "appToken": ["write"] }));
}

#[test]
fn owned_and_borrowed_ids_are_equal() {
    let mut specs = RouteSpecTable::new();
    specs.handler(String::from("dynamic")).summary("Built at runtime");
    assert!(specs.contains(&HandlerId::from("dynamic")));
    assert_eq!(
        specs.get(&HandlerId::new("dynamic")).summary.as_deref(),
        Some("Built at runtime")
    );
}

#[test]
fn only_model_examples_describe_themselves() {
    #[derive(schemars::JsonSchema)]
    #[allow(dead_code)]
    struct Tag {
        name: String,
    }

    assert!(ResponseExample::json_schema::<Tag>().self_describing().is_some());
    assert!(ResponseExample::value(json!({ "name": "x" })).self_describing().is_none());
}
