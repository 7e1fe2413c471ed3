use schemars::JsonSchema;
use serde_json::{json, Value};
use swaggen_core::{
    build_spec, prune_nulls, ApiModel, Attribute, DocConfig, DocError, DocumentBuilder, Field,
    ModelType, ParamLocation, Primitive, ResponseExample, RouteEntry, RouteSpecTable, RouteTable,
    Schema, SecurityScheme, TypeShape,
};

// ── Helpers ─────────────────────────────────────────────────────────────────

#[allow(dead_code)]
#[derive(JsonSchema)]
struct Pet {
    name: String,
    age: i64,
}

struct Owner;

impl ApiModel for Owner {
    fn model_name() -> &'static str {
        "Owner"
    }

    fn attributes() -> Vec<Attribute> {
        vec![
            Attribute::new("name", TypeShape::Primitive(Primitive::String)).required(true),
            Attribute::new("pet", TypeShape::Model(ModelType::json_schema::<Pet>())),
        ]
    }
}

fn config() -> DocConfig {
    DocConfig::new("Pet Store", "2.1.0")
}

fn pets_api() -> (RouteSpecTable, RouteTable) {
    let mut specs = RouteSpecTable::new();
    specs
        .handler("get_pet")
        .summary("Fetch a pet")
        .consumes(Field::integer().named("limit"), ParamLocation::Query, true)
        .response_example(200, "The pet", ResponseExample::json_schema::<Pet>());

    let mut routes = RouteTable::new();
    routes.add(RouteEntry::new("/pets/<id:int>", "get_pet", ["GET", "OPTIONS"], "get_pet"));
    (specs, routes)
}

fn find_param<'a>(operation: &'a Value, location: &str, name: &str) -> &'a Value {
    operation["parameters"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["in"] == location && p["name"] == name)
        .unwrap_or_else(|| panic!("no {location} parameter {name}"))
}

fn assert_no_nulls(value: &Value) {
    match value {
        Value::Null => panic!("null found in document"),
        Value::Object(map) => map.values().for_each(assert_no_nulls),
        Value::Array(items) => items.iter().for_each(assert_no_nulls),
        _ => {}
    }
}

// ── Document shape ──────────────────────────────────────────────────────────

#[test]
fn empty_document() {
    let doc = build_spec(&config(), &RouteSpecTable::new(), &RouteTable::new()).unwrap();
    assert_eq!(doc["swagger"], "2.0");
    assert_eq!(doc["info"]["title"], "Pet Store");
    assert_eq!(doc["info"]["version"], "2.1.0");
    assert_eq!(doc["schemes"], json!(["http"]));
    assert_eq!(doc["basePath"], "");
    assert_eq!(doc["tags"], json!([]));
    assert_eq!(doc["securityDefinitions"], json!({}));
    assert!(doc["paths"].as_object().unwrap().is_empty());
    assert!(doc["definitions"].as_object().unwrap().is_empty());
}

#[test]
fn info_block_drops_unset_keys() {
    let doc = build_spec(&config(), &RouteSpecTable::new(), &RouteTable::new()).unwrap();
    assert!(doc["info"].get("termsOfService").is_none());
    assert!(doc["info"].get("contact").is_none());
    assert!(doc["info"].get("license").is_none());

    let full = config()
        .with_contact_email("api@example.com")
        .with_license("MIT", "https://opensource.org/licenses/MIT");
    let doc = build_spec(&full, &RouteSpecTable::new(), &RouteTable::new()).unwrap();
    assert_eq!(doc["info"]["contact"], json!({ "email": "api@example.com" }));
    assert_eq!(
        doc["info"]["license"],
        json!({ "name": "MIT", "url": "https://opensource.org/licenses/MIT" })
    );
}

#[test]
fn security_definitions_come_from_config() {
    let config = config()
        .with_security_scheme("appToken", SecurityScheme::api_key("X-API-TOKEN", "header"))
        .with_security_scheme("basicAuth", SecurityScheme::basic());
    let doc = build_spec(&config, &RouteSpecTable::new(), &RouteTable::new()).unwrap();
    assert_eq!(
        doc["securityDefinitions"],
        json!({
            "appToken": { "type": "apiKey", "name": "X-API-TOKEN", "in": "header" },
            "basicAuth": { "type": "basic" }
        })
    );
}

// ── End to end ──────────────────────────────────────────────────────────────

#[test]
fn pets_route_end_to_end() {
    let (specs, routes) = pets_api();
    let doc = build_spec(&config(), &specs, &routes).unwrap();

    let paths = doc["paths"].as_object().unwrap();
    assert_eq!(paths.keys().collect::<Vec<_>>(), vec!["/pets/{id}"]);
    let get = &doc["paths"]["/pets/{id}"]["get"];
    assert!(doc["paths"]["/pets/{id}"].get("options").is_none());

    let id = find_param(get, "path", "id");
    assert_eq!(id["type"], "integer");
    assert_eq!(id["required"], true);

    let limit = find_param(get, "query", "limit");
    assert_eq!(limit["type"], "integer");
    assert_eq!(limit["required"], true);

    assert_eq!(get["operationId"], "get_pet");
    assert_eq!(get["summary"], "Fetch a pet");
    assert_eq!(get["consumes"], json!(["application/vnd.api+json"]));
    assert_eq!(get["produces"], json!(["application/vnd.api+json"]));
    assert_eq!(
        get["responses"]["200"],
        json!({ "description": "The pet", "schema": { "$ref": "#/definitions/Pet" } })
    );

    let pet = &doc["definitions"]["Pet"];
    assert_eq!(pet["type"], "object");
    assert_eq!(pet["properties"]["name"]["type"], "string");
    assert_eq!(pet["properties"]["age"]["type"], "integer");
}

#[test]
fn building_twice_is_identical() {
    let (specs, routes) = pets_api();
    let mut builder = DocumentBuilder::new();
    let first = serde_json::to_string(&builder.build(&config(), &specs, &routes).unwrap()).unwrap();
    let second = serde_json::to_string(&builder.build(&config(), &specs, &routes).unwrap()).unwrap();
    assert_eq!(first, second);
    assert_eq!(builder.registry().len(), 1);
}

#[test]
fn operations_contain_no_nulls() {
    let (specs, routes) = pets_api();
    let doc = build_spec(&config(), &specs, &routes).unwrap();
    assert_no_nulls(&doc["paths"]);
    assert!(doc["paths"]["/pets/{id}"]["get"].get("description").is_none());
    assert!(doc["paths"]["/pets/{id}"]["get"].get("tags").is_none());
}

#[test]
fn prune_nulls_recurses() {
    let mut value = json!({ "a": null, "b": { "c": null, "d": 1 }, "e": [{ "f": null }] });
    prune_nulls(&mut value);
    assert_eq!(value, json!({ "b": { "d": 1 }, "e": [{}] }));
}

// ── Routes and operations ───────────────────────────────────────────────────

#[test]
fn internal_and_excluded_routes_are_skipped() {
    let mut specs = RouteSpecTable::new();
    specs.handler("hidden").exclude(true);

    let mut routes = RouteTable::new();
    routes
        .add(RouteEntry::new("/openapi/spec.json", "spec", ["GET"], "spec"))
        .add(RouteEntry::new("/swagger/", "ui", ["GET"], "ui"))
        .add(RouteEntry::new("/static/<file_uri:path>", "files", ["GET"], "files"))
        .add(RouteEntry::new("/hidden", "hidden", ["GET"], "hidden"))
        .add(RouteEntry::new("/visible", "visible", ["GET"], "visible"));

    let doc = build_spec(&config(), &specs, &routes).unwrap();
    let paths: Vec<_> = doc["paths"].as_object().unwrap().keys().cloned().collect();
    assert_eq!(paths, vec!["/visible".to_string()]);
}

#[test]
fn composite_route_expands_per_method() {
    let mut specs = RouteSpecTable::new();
    specs.handler("list_pets").operation_id("listPets");

    let mut routes = RouteTable::new();
    routes
        .add_method("/pets", "pets", "GET", "list_pets")
        .add_method("/pets", "pets", "POST", "create_pet");

    let doc = build_spec(&config(), &specs, &routes).unwrap();
    let pets = &doc["paths"]["/pets"];
    assert_eq!(pets["get"]["operationId"], "listPets");
    assert_eq!(pets["post"]["operationId"], "pets");
}

#[test]
fn group_name_is_the_default_tag() {
    let mut specs = RouteSpecTable::new();
    specs.handler("tagged").tag("admin");

    let mut routes = RouteTable::new();
    routes
        .add(RouteEntry::new("/store", "store", ["GET"], "store"))
        .add(RouteEntry::new("/tagged", "tagged", ["GET"], "tagged"))
        .add_to_group("store", "store")
        .add_to_group("store", "tagged");

    let doc = build_spec(&config(), &specs, &routes).unwrap();
    assert_eq!(doc["paths"]["/store"]["get"]["tags"], json!(["store"]));
    assert_eq!(doc["paths"]["/tagged"]["get"]["tags"], json!(["admin"]));
    assert_eq!(doc["tags"], json!([{ "name": "store" }, { "name": "admin" }]));
}

#[test]
fn consumed_dictionary_is_flattened() {
    let mut specs = RouteSpecTable::new();
    specs.handler("search").consumes(
        Field::dictionary([("q", Field::string()), ("page", Field::integer())]),
        ParamLocation::Query,
        false,
    );

    let mut routes = RouteTable::new();
    routes.add(RouteEntry::new("/search", "search", ["GET"], "search"));

    let doc = build_spec(&config(), &specs, &routes).unwrap();
    let get = &doc["paths"]["/search"]["get"];
    assert_eq!(get["parameters"].as_array().unwrap().len(), 2);
    assert_eq!(
        find_param(get, "query", "q"),
        &json!({ "type": "string", "required": false, "in": "query", "name": "q" })
    );
    assert_eq!(find_param(get, "query", "page")["type"], "integer");
}

#[test]
fn consumed_model_becomes_body_schema() {
    let mut specs = RouteSpecTable::new();
    specs
        .handler("create_owner")
        .consumes(Schema::Type(TypeShape::Model(ModelType::of::<Owner>())), ParamLocation::Body, true)
        .response(201, "Created");

    let mut routes = RouteTable::new();
    routes.add(RouteEntry::new("/owners", "create_owner", ["POST"], "create_owner"));

    let doc = build_spec(&config(), &specs, &routes).unwrap();
    let post = &doc["paths"]["/owners"]["post"];
    assert_eq!(
        find_param(post, "body", "body"),
        &json!({
            "required": true,
            "in": "body",
            "name": "body",
            "schema": { "$ref": "#/definitions/Owner" }
        })
    );
    assert_eq!(post["responses"]["201"], json!({ "description": "Created" }));
    assert!(doc["definitions"].get("Owner").is_some());
    assert!(doc["definitions"].get("Pet").is_some());
}

#[test]
fn produced_field_documents_the_200_response() {
    let mut specs = RouteSpecTable::new();
    specs
        .handler("list")
        .produces(Schema::of::<Vec<String>>())
        .response_example(404, "Not found", ResponseExample::value(json!({ "error": "missing" })));

    let mut routes = RouteTable::new();
    routes.add(RouteEntry::new("/names", "list", ["GET"], "list"));

    let doc = build_spec(&config(), &specs, &routes).unwrap();
    let responses = &doc["paths"]["/names"]["get"]["responses"];
    assert_eq!(
        responses["200"],
        json!({
            "description": "Successful operation",
            "schema": { "type": "array", "items": { "type": "string" } }
        })
    );
    assert_eq!(responses["404"], json!({ "description": "Not found" }));
}

#[test]
fn route_content_types_override_config() {
    let mut specs = RouteSpecTable::new();
    specs
        .handler("upload")
        .consumes_content_type(["multipart/form-data"])
        .security("appToken", Vec::<String>::new());

    let mut routes = RouteTable::new();
    routes.add(RouteEntry::new("/upload", "upload", ["PUT"], "upload"));

    let doc = build_spec(&config(), &specs, &routes).unwrap();
    let put = &doc["paths"]["/upload"]["put"];
    assert_eq!(put["consumes"], json!(["multipart/form-data"]));
    assert_eq!(put["produces"], json!(["application/vnd.api+json"]));
    assert_eq!(put["security"], json!([{ "appToken": [] }]));
}

#[test]
fn failing_resolution_aborts_the_build() {
    struct Nameless;

    impl ApiModel for Nameless {
        fn model_name() -> &'static str {
            ""
        }

        fn attributes() -> Vec<Attribute> {
            Vec::new()
        }
    }

    let mut specs = RouteSpecTable::new();
    specs.handler("broken").produces(Field::object(ModelType::of::<Nameless>()));

    let mut routes = RouteTable::new();
    routes.add(RouteEntry::new("/broken", "broken", ["GET"], "broken"));

    let err = build_spec(&config(), &specs, &routes).unwrap_err();
    assert!(matches!(err, DocError::MissingIdentity { .. }));
}
