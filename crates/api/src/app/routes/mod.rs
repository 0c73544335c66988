//! Route table: normalized request triple → service operation.
//!
//! | Method | Path                   | Operation                |
//! |--------|------------------------|--------------------------|
//! | GET    | /items                 | catalog list             |
//! | POST   | /items                 | catalog create           |
//! | GET    | /items/{sku}           | catalog get              |
//! | PUT    | /items/{sku}           | catalog update           |
//! | DELETE | /items/{sku}           | catalog delete           |
//! | GET    | /orders                | orders list              |
//! | POST   | /orders                | orders create            |
//! | GET    | /orders/{id}           | orders get               |
//! | PATCH  | /orders/{id}           | orders patch             |
//! | POST   | /stock/in              | ledger apply_delta(IN)   |
//! | POST   | /stock/out             | ledger apply_delta(OUT)  |
//! | GET    | /stock/movements/{sku} | ledger movement trail    |

use serde_json::json;

use crate::app::errors;
use crate::app::request::{Method, Request, Response};
use crate::app::services::AppServices;

pub mod items;
pub mod orders;
pub mod stock;

/// Whether a path falls under the route table at all, for any verb. Lets the
/// transport layer answer 404 before worrying about the method.
pub fn covers(path: &str) -> bool {
    under(path, "/items") || under(path, "/orders") || under(path, "/stock")
}

fn under(path: &str, root: &str) -> bool {
    path == root || (path.starts_with(root) && path.as_bytes().get(root.len()) == Some(&b'/'))
}

/// Dispatch one normalized request against the service bundle.
pub fn dispatch(services: &AppServices, req: &Request) -> Response {
    // CORS preflight short-circuits before any routing.
    if req.method == Method::Options {
        return Response::json(200, json!({}));
    }

    if under(&req.path, "/items") {
        return items::dispatch(services, req);
    }
    if under(&req.path, "/orders") {
        return orders::dispatch(services, req);
    }
    if under(&req.path, "/stock") {
        return stock::dispatch(services, req);
    }

    errors::route_not_found()
}
