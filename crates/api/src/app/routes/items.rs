//! Item catalog routes.

use serde_json::{Value as JsonValue, json};

use stockroom_storage::record_to_json;

use crate::app::errors;
use crate::app::request::{Method, Request, Response};
use crate::app::services::AppServices;

pub fn dispatch(services: &AppServices, req: &Request) -> Response {
    if let Some(sku) = req.path.strip_prefix("/items/") {
        return match req.method {
            Method::Get => get_item(services, sku),
            Method::Put => match req.json_body() {
                Ok(body) => update_item(services, sku, &body),
                Err(res) => res,
            },
            Method::Delete => delete_item(services, sku),
            _ => errors::method_not_allowed(),
        };
    }

    match req.method {
        Method::Get => list_items(services),
        Method::Post => match req.json_body() {
            Ok(body) => create_item(services, &body),
            Err(res) => res,
        },
        _ => errors::method_not_allowed(),
    }
}

fn create_item(services: &AppServices, body: &JsonValue) -> Response {
    match services.catalog.create(body) {
        Ok(record) => Response::json(201, record_to_json(&record)),
        Err(e) => errors::domain_error_to_response(e),
    }
}

fn get_item(services: &AppServices, sku: &str) -> Response {
    match services.catalog.get(sku) {
        Ok(record) => Response::json(200, record_to_json(&record)),
        Err(e) => errors::domain_error_to_response(e),
    }
}

fn list_items(services: &AppServices) -> Response {
    match services.catalog.list() {
        Ok(records) => Response::json(200, JsonValue::Array(records.iter().map(record_to_json).collect())),
        Err(e) => errors::domain_error_to_response(e),
    }
}

fn update_item(services: &AppServices, sku: &str, body: &JsonValue) -> Response {
    match services.catalog.update(sku, body) {
        Ok(record) => Response::json(200, record_to_json(&record)),
        Err(e) => errors::domain_error_to_response(e),
    }
}

fn delete_item(services: &AppServices, sku: &str) -> Response {
    match services.catalog.delete(sku) {
        Ok(()) => Response::json(204, json!({})),
        Err(e) => errors::domain_error_to_response(e),
    }
}
