//! REST-shaped request handlers.
//!
//! Handlers take already-routed arguments (path segments, query strings and
//! the raw request body) and return an `ApiResponse` carrying the status code
//! and the JSON envelope. Routing, authentication and transport belong to
//! whatever hosts these handlers.

pub mod collections;
pub mod fields;
pub mod items;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use crate::pagination::{Page, Paged, DEFAULT_LIMIT, DEFAULT_PAGE};

pub const ADMIN_REQUIRED: &str = "Admin access required";
pub const INVALID_PAYLOAD: &str = "Invalid request payload";

/// The caller as resolved by the authorization layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Caller {
    pub privileged: bool,
}

impl Caller {
    pub fn admin() -> Self {
        Self { privileged: true }
    }

    pub fn user() -> Self {
        Self { privileged: false }
    }
}

/// Status code plus JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    fn envelope(status: u16, data: impl Serialize, meta: Option<Value>) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => {
                let mut body = json!({ "data": data });
                if let Some(meta) = meta {
                    body["meta"] = meta;
                }
                Self { status, body }
            }
            Err(e) => {
                warn!(error = %e, "failed to serialize response");
                Self::error(500, "Failed to serialize response")
            }
        }
    }

    /// `200 {"data": ...}`
    pub fn ok(data: impl Serialize) -> Self {
        Self::envelope(200, data, None)
    }

    /// `201 {"data": ...}`
    pub fn created(data: impl Serialize) -> Self {
        Self::envelope(201, data, None)
    }

    /// `200 {"data": [...], "meta": {"page", "limit", "total"}}`
    pub fn paged<T: Serialize>(paged: Paged<T>) -> Self {
        let meta = json!(paged.meta);
        Self::envelope(200, paged.items, Some(meta))
    }

    /// `200 {"message": ...}`
    pub fn message(message: &str) -> Self {
        Self {
            status: 200,
            body: json!({ "message": message }),
        }
    }

    pub fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: json!({ "error": message }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP status for an engine error.
pub fn status_for(err: &EngineError) -> u16 {
    match err {
        EngineError::Validation(_) | EngineError::Constraint { .. } => 400,
        EngineError::NotFound(_) => 404,
        EngineError::Conflict(_) => 409,
        EngineError::Internal { .. } => 500,
    }
}

impl From<EngineError> for ApiResponse {
    fn from(err: EngineError) -> Self {
        let status = status_for(&err);
        debug!(status, category = err.category(), error = %err, "request failed");
        Self::error(status, &err.to_string())
    }
}

/// Turn an engine result into a response, using `ok` for the success case.
pub(crate) fn respond<T>(result: EngineResult<T>, ok: impl FnOnce(T) -> ApiResponse) -> ApiResponse {
    match result {
        Ok(value) => ok(value),
        Err(err) => err.into(),
    }
}

/// Writes are limited to privileged callers.
pub(crate) fn require_privileged(caller: Caller) -> Result<(), ApiResponse> {
    if caller.privileged {
        Ok(())
    } else {
        Err(ApiResponse::error(403, ADMIN_REQUIRED))
    }
}

pub(crate) fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiResponse> {
    serde_json::from_str(body).map_err(|e| {
        warn!(error = %e, "invalid request payload");
        ApiResponse::error(400, INVALID_PAYLOAD)
    })
}

/// `page` and `limit` query parameters.
pub struct PageQuery;

impl PageQuery {
    /// Missing, non-numeric or out-of-range values fall back to the defaults.
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Page {
        let page = page
            .and_then(|p| p.trim().parse::<i64>().ok())
            .unwrap_or(DEFAULT_PAGE);
        let limit = limit
            .and_then(|l| l.trim().parse::<i64>().ok())
            .unwrap_or(DEFAULT_LIMIT);
        Page::new(page, limit)
    }
}
