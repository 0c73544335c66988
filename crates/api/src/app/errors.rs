//! Consistent error responses.

use stockroom_core::DomainError;

use crate::app::request::Response;

/// Translate a domain failure into a transport status + `{"error": ...}`
/// body. Backend faults map to 5xx so callers never mistake them for a
/// business-rule rejection.
pub fn domain_error_to_response(err: DomainError) -> Response {
    let status = match &err {
        DomainError::Validation(_) => 400,
        DomainError::NotFound(_) => 404,
        DomainError::AlreadyExists(_) | DomainError::InsufficientStock { .. } => 409,
        DomainError::Storage(msg) => {
            tracing::error!(%msg, "storage backend failure");
            return Response::error(500, "Internal error");
        }
    };
    Response::error(status, err.to_string())
}

pub fn method_not_allowed() -> Response {
    Response::error(405, "Method not allowed")
}

pub fn route_not_found() -> Response {
    Response::error(404, "Not found")
}
