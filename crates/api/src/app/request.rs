//! The core request/response contract.
//!
//! The services consume a normalized `{method, path, body}` triple and
//! produce a status code plus a JSON-serializable body. Everything
//! HTTP-specific (headers, framing, CORS) stays in the axum glue.

use serde_json::{Value as JsonValue, json};

/// Normalized HTTP-like verb.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl Method {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "PATCH" => Some(Self::Patch),
            "DELETE" => Some(Self::Delete),
            "OPTIONS" => Some(Self::Options),
            _ => None,
        }
    }
}

/// A normalized inbound request.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub body: Option<String>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>, body: Option<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body,
        }
    }

    /// Parse the body as JSON, treating an absent body as `{}` the way the
    /// routes expect. Malformed JSON is a validation failure.
    pub fn json_body(&self) -> Result<JsonValue, Response> {
        let text = self.body.as_deref().unwrap_or("{}");
        serde_json::from_str(text)
            .map_err(|_| Response::error(400, "Invalid JSON body"))
    }
}

/// A structured result ready for transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: JsonValue,
}

impl Response {
    pub fn json(status: u16, body: JsonValue) -> Self {
        Self { status, body }
    }

    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({"error": message.into()}),
        }
    }
}
