//! HTTP response assertions.

use axum::http::StatusCode;
use axum_test::TestResponse;
use serde_json::Value;

/// Asserts the status and the error message, and returns the error entry.
pub fn assert_error(response: &TestResponse, status: StatusCode, message: &str) -> Value {
    response.assert_status(status);
    let body: Value = response.json();
    let errors = body["errors"]
        .as_array()
        .unwrap_or_else(|| panic!("expected an errors array, got {body}"));
    assert_eq!(errors.len(), 1, "expected one error, got {body}");
    assert_eq!(errors[0]["message"], message, "unexpected message in {body}");
    errors[0].clone()
}

/// Asserts an access denial with the generic forbidden status.
pub fn assert_forbidden(response: &TestResponse, message: &str) -> Value {
    assert_error(response, StatusCode::FORBIDDEN, message)
}

/// Asserts the configuration-fault response, which carries no diagnostics.
pub fn assert_configuration_fault(response: &TestResponse) {
    let entry = assert_error(
        response,
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error: Invalid permission configuration",
    );
    assert_eq!(
        entry.as_object().map(|fields| fields.len()),
        Some(1),
        "fault body leaks details: {entry}"
    );
}
