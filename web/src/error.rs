//! Error types for web handlers.
//!
//! [`AppError`] is the single error type handlers return. Service errors
//! convert into it with `?`, which fixes the status code and the client
//! message in one place.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use only4kiddos_booking::BookingError;
use only4kiddos_ledger::LedgerError;
use serde::Serialize;
use std::fmt;

/// Message shown for every server-side failure.
const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Application error type for web handlers.
///
/// Implements [`IntoResponse`] so handlers can return
/// `Result<Json<T>, AppError>` directly.
///
/// # Examples
///
/// ```
/// use axum::http::StatusCode;
/// use only4kiddos_web::AppError;
///
/// let err = AppError::conflict("Not enough spots left");
/// assert_eq!(err.status(), StatusCode::CONFLICT);
/// assert_eq!(err.to_string(), "[CONFLICT] Not enough spots left");
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: String) -> Self {
        Self {
            status,
            message,
            code,
            source: None,
        }
    }

    /// Attach the underlying error for logging.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// HTTP status of this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Client-facing error code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Client-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message.into(), "BAD_REQUEST".to_string())
    }

    /// Create a 401 Unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message.into(), "UNAUTHORIZED".to_string())
    }

    /// Create a 403 Forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message.into(), "FORBIDDEN".to_string())
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(resource: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("{resource} with id {id} not found"),
            "NOT_FOUND".to_string(),
        )
    }

    /// Create a 409 Conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message.into(), "CONFLICT".to_string())
    }

    /// Create a 422 Unprocessable Entity error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            message.into(),
            "VALIDATION_ERROR".to_string(),
        )
    }

    /// Create a 429 Too Many Requests error.
    #[must_use]
    pub fn too_many_requests(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::TOO_MANY_REQUESTS,
            message.into(),
            "RATE_LIMITED".to_string(),
        )
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR".to_string(),
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Error code (for client error handling).
    code: String,
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            match &self.source {
                Some(source) => tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    error = %source,
                    "Internal server error"
                ),
                None => tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "Internal server error"
                ),
            }
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(INTERNAL_MESSAGE).with_source(err)
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotFound { event_id } => Self::not_found("Event", event_id),
            LedgerError::InsufficientCapacity { .. } => Self::conflict("Not enough spots left"),
            LedgerError::InvalidQuantity | LedgerError::InvalidCapacity => {
                Self::validation(err.to_string())
            }
            LedgerError::AlreadyExists { .. } => Self::conflict(err.to_string()),
            LedgerError::OverRelease { .. } | LedgerError::Store(_) => {
                Self::internal(INTERNAL_MESSAGE).with_source(err)
            }
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Ledger(err) => err.into(),
            BookingError::Validation(err) => Self::validation(err.to_string()),
            BookingError::EventNotFound(id) => Self::not_found("Event", id),
            BookingError::ChildNotFound(id) => Self::not_found("Child", id),
            BookingError::BookingNotFound(id) => Self::not_found("Booking", id),
            BookingError::ChildNotOwned | BookingError::Forbidden { .. } => {
                Self::forbidden(err.to_string())
            }
            BookingError::AlreadyCancelled => Self::conflict(err.to_string()),
            BookingError::PriceOverflow | BookingError::Repository(_) => {
                Self::internal(INTERNAL_MESSAGE).with_source(err)
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => Self::validation(err.body_text()),
            other => Self::bad_request(other.body_text()),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use only4kiddos_core::{BookingId, EventId, ValidationError};

    #[test]
    fn test_error_display() {
        let err = AppError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "[BAD_REQUEST] Invalid input");
    }

    #[test]
    fn test_not_found() {
        let id = BookingId::new();
        let err = AppError::from(BookingError::BookingNotFound(id));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), format!("Booking with id {id} not found"));
    }

    #[test]
    fn insufficient_capacity_is_a_conflict() {
        let err = AppError::from(BookingError::Ledger(LedgerError::InsufficientCapacity {
            event_id: EventId::new(),
            requested: 3,
            available: 1,
        }));
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.message(), "Not enough spots left");
    }

    #[test]
    fn defects_hide_details() {
        let err = AppError::from(LedgerError::OverRelease {
            event_id: EventId::new(),
            requested: 2,
            available: 20,
            capacity: 20,
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), INTERNAL_MESSAGE);

        let err = AppError::from(BookingError::Repository("disk full".to_string()));
        assert_eq!(err.message(), INTERNAL_MESSAGE);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn service_errors_map_to_client_statuses() {
        assert_eq!(
            AppError::from(BookingError::AlreadyCancelled).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(BookingError::forbidden("cancel this booking")).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::from(BookingError::ChildNotOwned).status(),
            StatusCode::FORBIDDEN
        );
        let err = AppError::from(BookingError::Validation(ValidationError::NoChildren));
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}
