//! Stock ledger routes.

use serde_json::{Value as JsonValue, json};

use stockroom_ledger::Direction;
use stockroom_storage::record_to_json;

use crate::app::errors;
use crate::app::request::{Method, Request, Response};
use crate::app::services::AppServices;

pub fn dispatch(services: &AppServices, req: &Request) -> Response {
    match (req.method, req.path.as_str()) {
        (Method::Post, "/stock/in") => match req.json_body() {
            Ok(body) => apply_delta(services, &body, Direction::In),
            Err(res) => res,
        },
        (Method::Post, "/stock/out") => match req.json_body() {
            Ok(body) => apply_delta(services, &body, Direction::Out),
            Err(res) => res,
        },
        (Method::Get, path) if path.starts_with("/stock/movements/") => {
            // strip_prefix cannot fail under the guard above.
            let sku = path.strip_prefix("/stock/movements/").unwrap_or_default();
            movements(services, sku)
        }
        (_, "/stock/in" | "/stock/out") => errors::method_not_allowed(),
        (_, path) if path.starts_with("/stock/movements/") => errors::method_not_allowed(),
        _ => errors::route_not_found(),
    }
}

fn apply_delta(services: &AppServices, body: &JsonValue, direction: Direction) -> Response {
    let sku = body.get("sku").and_then(JsonValue::as_str).unwrap_or_default();
    // Missing or non-numeric qty coerces to 0 and fails validation below.
    let qty = body
        .get("qty")
        .and_then(|v| stockroom_core::coerce::to_int("qty", v).ok())
        .unwrap_or(0);
    let reason = body.get("reason").and_then(JsonValue::as_str);

    match services.ledger.apply_delta(sku, qty, direction, reason) {
        Ok((item, movement)) => match serde_json::to_value(&movement) {
            Ok(movement_json) => Response::json(
                200,
                json!({"item": record_to_json(&item), "movement": movement_json}),
            ),
            Err(e) => errors::domain_error_to_response(stockroom_core::DomainError::storage(e)),
        },
        Err(e) => errors::domain_error_to_response(e),
    }
}

fn movements(services: &AppServices, sku: &str) -> Response {
    match services.ledger.movements_for_sku(sku) {
        Ok(trail) => match serde_json::to_value(&trail) {
            Ok(json) => Response::json(200, json),
            Err(e) => errors::domain_error_to_response(stockroom_core::DomainError::storage(e)),
        },
        Err(e) => errors::domain_error_to_response(e),
    }
}
