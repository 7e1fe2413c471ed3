use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use crate::spec_cell::SpecCell;

/// Path the document is served at, below `prefix`.
pub fn spec_path(prefix: &str) -> String {
    format!("{}/spec.json", prefix.trim_end_matches('/'))
}

/// Build an `axum::Router` serving `<prefix>/spec.json` from `cell`.
///
/// Requests that arrive before the document is published wait for it.
pub fn openapi_routes<S>(prefix: &str, cell: SpecCell) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route(
        &spec_path(prefix),
        get(move || {
            let cell = cell.clone();
            async move { serve_spec(&cell).await }
        }),
    )
}

async fn serve_spec(cell: &SpecCell) -> Response {
    match cell.wait().await {
        Some(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        None => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}
