use axum::body::Body;
use axum::Router;
use http::Request;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use swaggen::{DocConfig, SecurityScheme, Settings};
use tower::ServiceExt;

// ── Helpers ─────────────────────────────────────────────────────────────────

fn config() -> DocConfig {
    DocConfig::new("Pet Store", "1.0.0")
        .with_security_scheme("appToken", SecurityScheme::api_key("X-API-TOKEN", "header"))
}

fn app() -> Router {
    petstore::app(config()).unwrap()
}

async fn send(router: Router, req: Request<Body>) -> (http::StatusCode, Value) {
    let response = router.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn get(router: Router, path: &str) -> (http::StatusCode, Value) {
    let req = Request::builder().uri(path).body(Body::empty()).unwrap();
    send(router, req).await
}

async fn spec() -> Value {
    let (status, doc) = get(app(), "/openapi/spec.json").await;
    assert_eq!(status, http::StatusCode::OK);
    doc
}

// ── Document ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn document_lists_every_documented_operation() {
    let doc = spec().await;

    assert_eq!(doc["swagger"], "2.0");
    assert_eq!(doc["info"], json!({ "title": "Pet Store", "version": "1.0.0", "description": "" }));
    assert_eq!(doc["tags"], json!([{ "name": "pets" }]));

    let paths = doc["paths"].as_object().unwrap();
    let mut keys: Vec<&str> = paths.keys().map(String::as_str).collect();
    keys.sort();
    assert_eq!(keys, vec!["/pets", "/pets/{pet_id}"]);
    assert!(paths["/pets"].get("get").is_some());
    assert!(paths["/pets"].get("post").is_some());
    assert!(paths["/pets/{pet_id}"].get("get").is_some());
    assert!(paths["/pets/{pet_id}"].get("delete").is_some());
}

#[tokio::test]
async fn operations_carry_their_annotations() {
    let doc = spec().await;

    let list = &doc["paths"]["/pets"]["get"];
    assert_eq!(list["operationId"], "list_pets");
    assert_eq!(list["tags"], json!(["pets"]));
    assert_eq!(
        list["responses"]["200"],
        json!({
            "description": "Successful operation",
            "schema": { "type": "array", "items": { "type": "object", "$ref": "#/definitions/Pet" } }
        })
    );

    let get_pet = &doc["paths"]["/pets/{pet_id}"]["get"];
    assert_eq!(
        get_pet["parameters"],
        json!([{ "type": "integer", "format": "int64", "required": true, "in": "path", "name": "pet_id" }])
    );
    assert_eq!(
        get_pet["responses"]["404"],
        json!({ "description": "Pet not found", "schema": { "$ref": "#/definitions/ApiError" } })
    );

    let create = &doc["paths"]["/pets"]["post"];
    assert_eq!(
        create["parameters"],
        json!([{
            "required": true,
            "in": "body",
            "name": "pet",
            "schema": { "$ref": "#/definitions/PetCreation" }
        }])
    );
    assert_eq!(create["security"], json!([{ "appToken": [] }]));
    assert_eq!(create["responses"]["201"], json!({ "description": "Created" }));
}

#[tokio::test]
async fn definitions_and_security() {
    let doc = spec().await;

    let definitions = doc["definitions"].as_object().unwrap();
    for name in ["Pet", "Owner", "Toy", "Material", "Cat", "Dog", "PetCreation", "ApiError"] {
        assert!(definitions.contains_key(name), "{name} missing");
    }
    assert_eq!(
        doc["securityDefinitions"]["appToken"],
        json!({ "type": "apiKey", "name": "X-API-TOKEN", "in": "header" })
    );
}

#[test]
fn bundled_settings_parse() {
    let settings = Settings::from_yaml_str(include_str!("../application.yaml")).unwrap();
    let config = DocConfig::from_settings(&settings).unwrap();
    assert_eq!(config.title, "Pet Store");
    assert_eq!(settings.get::<u16>("app.port").unwrap(), 8080);
    assert_eq!(
        config.info()["license"],
        json!({ "name": "Apache 2.0", "url": "https://www.apache.org/licenses/LICENSE-2.0" })
    );
    assert!(config.security_definitions.contains_key("appToken"));
}

// ── Handlers ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_then_fetch_a_pet() {
    let router = app();

    let req = Request::builder()
        .method("POST")
        .uri("/pets")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "name": "Rex",
                "ownerEmail": "ann@example.com",
                "kind": { "species": "dog", "trained": true }
            })
            .to_string(),
        ))
        .unwrap();
    let (status, created) = send(router.clone(), req).await;
    assert_eq!(status, http::StatusCode::CREATED);
    assert_eq!(created["id"], 1);
    assert_eq!(created["owner"]["email"], "ann@example.com");

    let (status, pet) = get(router.clone(), "/pets/1").await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(pet["name"], "Rex");
    assert_eq!(pet["kind"]["species"], "dog");

    let (status, error) = get(router, "/pets/2").await;
    assert_eq!(status, http::StatusCode::NOT_FOUND);
    assert_eq!(error["message"], "no pet with id 2");
}

#[tokio::test]
async fn health_is_served_but_not_documented() {
    let router = app();
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = router.oneshot(req).await.unwrap();
    assert_eq!(response.status(), http::StatusCode::OK);

    let doc = spec().await;
    assert!(doc["paths"].get("/health").is_none());
}
