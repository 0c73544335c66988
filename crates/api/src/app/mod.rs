//! HTTP API application wiring (Axum glue around the dispatch core).
//!
//! Structure:
//! - `services.rs`: infrastructure wiring (storage handle + services)
//! - `request.rs`: the normalized `{method, path, body}` → `{status, body}` contract
//! - `routes/`: the route table and per-domain dispatchers
//! - `errors.rs`: consistent error responses
//!
//! The axum layer is deliberately thin: it normalizes every inbound HTTP
//! request into the triple, hands it to [`routes::dispatch`], and stamps
//! transport concerns (status, CORS headers) onto the way out.

use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::OriginalUri,
    http::{HeaderValue, StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use tower::ServiceBuilder;

pub mod errors;
pub mod request;
pub mod routes;
pub mod services;

use request::{Method, Request, Response};

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app() -> Router {
    let services = Arc::new(services::build_services());

    Router::new()
        .route("/health", get(health))
        .fallback(forward)
        .layer(Extension(services))
        .layer(ServiceBuilder::new())
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

/// Normalize an HTTP request into the dispatch triple and render the result.
async fn forward(
    Extension(services): Extension<Arc<services::AppServices>>,
    method: axum::http::Method,
    OriginalUri(uri): OriginalUri,
    body: String,
) -> axum::response::Response {
    // Verbs outside the dispatch vocabulary (HEAD, TRACE, ...) still go
    // through path matching first: an unknown path stays a 404.
    let Some(method) = Method::parse(method.as_str()) else {
        let res = if routes::covers(uri.path()) {
            errors::method_not_allowed()
        } else {
            errors::route_not_found()
        };
        return render(res);
    };

    let body = if body.is_empty() { None } else { Some(body) };
    let req = Request::new(method, uri.path(), body);
    render(routes::dispatch(&services, &req))
}

fn render(res: Response) -> axum::response::Response {
    let status = StatusCode::from_u16(res.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut http_res = if status == StatusCode::NO_CONTENT {
        status.into_response()
    } else {
        (status, Json(res.body)).into_response()
    };

    let headers = http_res.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET,POST,PUT,PATCH,DELETE,OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type,Authorization"),
    );
    http_res
}
