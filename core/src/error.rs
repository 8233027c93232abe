//! Error types for the service API client.
//!
//! # Design
//! Validation failures are unit variants so callers can branch on identity
//! with `matches!` instead of inspecting message text. They are produced by
//! the `build_*` methods before any request exists.
//!
//! Remote failures are passed through as-is. The API answers 400 rather than
//! 404 for unknown services and failed searches, and no status code is
//! translated into a "not found" kind here; use [`ApiError::status`] to
//! inspect it.

use thiserror::Error;

/// Errors returned by `ServiceClient` and `Client` operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The `id` input field was empty.
    #[error("missing required field 'ID'")]
    MissingId,

    /// The `service_id` input field was empty.
    #[error("missing required field 'ServiceID'")]
    MissingServiceId,

    /// The `name` input field was empty.
    #[error("missing required field 'Name'")]
    MissingName,

    /// An update carried neither `name` nor `comment`.
    #[error("missing at least one of the optional fields 'Name' or 'Comment'")]
    MissingOptionalNameComment,

    /// An update set `name` to the empty string.
    #[error("field 'Name' must not be empty when set")]
    MissingNameValue,

    /// The request succeeded but the status envelope did not report "ok".
    #[error("unexpected 'not ok' response from the API")]
    NotOk,

    /// The server returned a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The request never produced a response (connection, TLS, timeout).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),
}

impl ApiError {
    /// True for errors raised locally before any network I/O.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ApiError::MissingId
                | ApiError::MissingServiceId
                | ApiError::MissingName
                | ApiError::MissingOptionalNameComment
                | ApiError::MissingNameValue
        )
    }

    /// HTTP status of a non-2xx response, if this error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_classified() {
        assert!(ApiError::MissingId.is_validation());
        assert!(ApiError::MissingNameValue.is_validation());
        assert!(!ApiError::NotOk.is_validation());
        assert!(!ApiError::Transport("refused".to_string()).is_validation());
    }

    #[test]
    fn status_is_exposed_for_http_errors_only() {
        let err = ApiError::HttpError {
            status: 400,
            body: r#"{"msg":"Record not found"}"#.to_string(),
        };
        assert_eq!(err.status(), Some(400));
        assert_eq!(ApiError::NotOk.status(), None);
    }

    #[test]
    fn display_includes_status_and_body() {
        let err = ApiError::HttpError {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500: boom");
    }
}
