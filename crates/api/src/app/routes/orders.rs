//! Order routes.

use serde_json::Value as JsonValue;

use stockroom_storage::record_to_json;

use crate::app::errors;
use crate::app::request::{Method, Request, Response};
use crate::app::services::AppServices;

pub fn dispatch(services: &AppServices, req: &Request) -> Response {
    if let Some(id) = req.path.strip_prefix("/orders/") {
        return match req.method {
            Method::Get => get_order(services, id),
            Method::Patch => match req.json_body() {
                Ok(body) => patch_order(services, id, &body),
                Err(res) => res,
            },
            _ => errors::method_not_allowed(),
        };
    }

    match req.method {
        Method::Get => list_orders(services),
        Method::Post => match req.json_body() {
            Ok(body) => create_order(services, &body),
            Err(res) => res,
        },
        _ => errors::method_not_allowed(),
    }
}

fn create_order(services: &AppServices, body: &JsonValue) -> Response {
    match services.orders.create(body) {
        Ok(order) => match serde_json::to_value(&order) {
            Ok(json) => Response::json(201, json),
            Err(e) => errors::domain_error_to_response(stockroom_core::DomainError::storage(e)),
        },
        Err(e) => errors::domain_error_to_response(e),
    }
}

fn get_order(services: &AppServices, id: &str) -> Response {
    match services.orders.get(id) {
        Ok(record) => Response::json(200, record_to_json(&record)),
        Err(e) => errors::domain_error_to_response(e),
    }
}

fn list_orders(services: &AppServices) -> Response {
    match services.orders.list() {
        Ok(records) => Response::json(200, JsonValue::Array(records.iter().map(record_to_json).collect())),
        Err(e) => errors::domain_error_to_response(e),
    }
}

fn patch_order(services: &AppServices, id: &str, body: &JsonValue) -> Response {
    match services.orders.patch(id, body) {
        Ok(record) => Response::json(200, record_to_json(&record)),
        Err(e) => errors::domain_error_to_response(e),
    }
}
