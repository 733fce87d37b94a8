//! Fallback response builder
//!
//! Guarantees a dispatch always ends in a well-formed JSON error when no
//! module produced a response:
//!
//! - a recorded filter failure → that filter's status and message
//! - nothing recorded → 400 `action not found`
//! - a failing or panicking handler → 500 naming the module

use serde_json::{json, Value};

use crate::http::Response;
use crate::module::ModuleError;
use crate::router::filters::{FailedFilter, FilterManager};

pub const NOT_FOUND_MESSAGE: &str = "action not found";
pub const NOT_FOUND_STATUS: u16 = 400;
pub const HANDLER_FAILURE_STATUS: u16 = 500;

/// Return `response` unchanged, or synthesize one from the filter state
pub fn build_safe_response(response: Option<Response>, filters: &dyn FilterManager) -> Response {
    if let Some(response) = response {
        return response;
    }

    match filters.failed_filter() {
        Some(filter) if filters.have_errors() => filter_failure(&filter),
        _ => not_found(),
    }
}

/// 400 response for a request no module handled
pub fn not_found() -> Response {
    error_response(
        NOT_FOUND_STATUS,
        NOT_FOUND_MESSAGE.to_string(),
        json!(NOT_FOUND_STATUS.to_string()),
    )
}

/// Response carrying a failed filter's status and message
pub fn filter_failure(filter: &FailedFilter) -> Response {
    error_response(
        filter.status,
        format!("[{}] {}", filter.name, filter.message),
        json!(filter.status),
    )
}

/// 500 response for a module whose handler failed
pub fn handler_failure(module: &str, error: &ModuleError) -> Response {
    error_response(
        HANDLER_FAILURE_STATUS,
        format!("[{}] {}", module, error),
        json!(HANDLER_FAILURE_STATUS.to_string()),
    )
}

fn error_response(status: u16, message: String, code: Value) -> Response {
    Response::json(
        status,
        &json!({
            "error": {
                "message": message,
                "code": code,
            }
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{CONTENT_TYPE, JSON_CONTENT_TYPE};
    use crate::router::filters::FilterLog;
    use crate::router::FilterManager;

    #[test]
    fn test_existing_response_untouched() {
        let original = Response::new(204).with_body("x");
        let safe = build_safe_response(Some(original.clone()), &FilterLog::new());
        assert_eq!(safe, original);
        assert!(safe.header(CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_not_found_shape() {
        let response = build_safe_response(None, &FilterLog::new());
        assert_eq!(response.status(), 400);
        assert_eq!(response.header("Content-Type"), Some(JSON_CONTENT_TYPE));
        assert_eq!(
            response.body_json().unwrap(),
            json!({"error": {"message": "action not found", "code": "400"}})
        );
    }

    #[test]
    fn test_filter_failure_shape() {
        let mut filters = FilterLog::new();
        filters.record_failure(FailedFilter::new("Auth", "missing token", 401));
        let response = build_safe_response(None, &filters);
        assert_eq!(response.status(), 401);
        let body = response.body_json().unwrap();
        assert_eq!(body["error"]["message"], "[Auth] missing token");
        assert_eq!(body["error"]["code"], 401);
        assert!(response.body_text().contains("[Auth] missing token"));
    }

    #[test]
    fn test_handler_failure_shape() {
        let response =
            handler_failure("shop", &ModuleError::HandlerFailed("db down".to_string()));
        assert_eq!(response.status(), 500);
        let body = response.body_json().unwrap();
        assert_eq!(body["error"]["code"], "500");
        assert_eq!(body["error"]["message"], "[shop] Handler failed: db down");
    }
}
