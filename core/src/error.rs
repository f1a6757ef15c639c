//! Error types for the Pushbullet client.
//!
//! # Design
//! Every failure is returned to the caller; nothing is retried. Local
//! validation failures (`MissingParameter`, `InvalidParameter`) are raised
//! before a request is built, so they never cost a round trip. Any non-2xx
//! status from the service lands in `ServiceError` with the literal status
//! code and a coarse classification.

use std::fmt;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Coarse classification of a non-success HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    InternalServerError,
    /// Any status outside the ones above (429, 503, unexpected 3xx, ...).
    Other,
}

impl ServiceErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            500 => Self::InternalServerError,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for ServiceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::BadRequest => "Bad Request",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not Found",
            Self::InternalServerError => "Internal Server Error",
            Self::Other => "Unexpected Status",
        };
        f.write_str(text)
    }
}

/// Errors returned by `PushClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required input field was not supplied. Detected before any request.
    #[error("{operation}: missing required parameter `{field}`")]
    MissingParameter {
        operation: &'static str,
        field: &'static str,
    },

    /// A supplied input value cannot be sent (e.g. a non-finite timestamp).
    #[error("{operation}: invalid parameter `{field}`: {reason}")]
    InvalidParameter {
        operation: &'static str,
        field: &'static str,
        reason: String,
    },

    /// The HTTP call itself could not be completed.
    #[error("transport failure: {0}")]
    TransportFailure(String),

    /// The remote service (or storage backend) answered with a non-success status.
    #[error("HTTP {status}: {kind}")]
    ServiceError { status: u16, kind: ServiceErrorKind },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The local file for an upload could not be read.
    #[error("cannot read {path}: {message}")]
    Io { path: String, message: String },

    /// Client construction failed (bad API root, missing token, ...).
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ApiError {
    pub(crate) fn service(status: u16) -> Self {
        ApiError::ServiceError {
            status,
            kind: ServiceErrorKind::from_status(status),
        }
    }

    /// HTTP status carried by a `ServiceError`, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::ServiceError { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ApiError::ServiceError {
                kind: ServiceErrorKind::NotFound,
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_statuses() {
        assert_eq!(ServiceErrorKind::from_status(400), ServiceErrorKind::BadRequest);
        assert_eq!(ServiceErrorKind::from_status(401), ServiceErrorKind::Unauthorized);
        assert_eq!(ServiceErrorKind::from_status(403), ServiceErrorKind::Forbidden);
        assert_eq!(ServiceErrorKind::from_status(404), ServiceErrorKind::NotFound);
        assert_eq!(
            ServiceErrorKind::from_status(500),
            ServiceErrorKind::InternalServerError
        );
    }

    #[test]
    fn unlisted_statuses_are_other() {
        assert_eq!(ServiceErrorKind::from_status(429), ServiceErrorKind::Other);
        assert_eq!(ServiceErrorKind::from_status(503), ServiceErrorKind::Other);
    }

    #[test]
    fn missing_parameter_names_operation_and_field() {
        let err = ApiError::MissingParameter {
            operation: "create_contact",
            field: "email",
        };
        assert_eq!(
            err.to_string(),
            "create_contact: missing required parameter `email`"
        );
    }

    #[test]
    fn invalid_parameter_carries_reason() {
        let err = ApiError::InvalidParameter {
            operation: "list_pushes_modified_after",
            field: "modified_after",
            reason: "NaN is not a finite number".into(),
        };
        assert_eq!(
            err.to_string(),
            "list_pushes_modified_after: invalid parameter `modified_after`: NaN is not a finite number"
        );
        assert_eq!(err.status(), None);
    }

    #[test]
    fn service_error_display_and_helpers() {
        let err = ApiError::service(404);
        assert_eq!(err.to_string(), "HTTP 404: Not Found");
        assert_eq!(err.status(), Some(404));
        assert!(err.is_not_found());
        assert!(!ApiError::service(400).is_not_found());
        assert_eq!(ApiError::TransportFailure("x".into()).status(), None);
    }
}
