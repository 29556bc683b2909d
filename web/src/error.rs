//! Error type for web handlers.
//!
//! [`AppError`] turns domain errors into `{code, message}` JSON responses.
//! Server errors are logged with their source; client errors are not.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use booking_auth::AuthError;
use booking_core::admin::AdminError;
use booking_core::catalog::CatalogError;
use booking_core::store::StoreError;
use serde::Serialize;
use std::fmt;

/// Application error type for web handlers.
///
/// ```ignore
/// async fn handler() -> Result<Json<Data>, AppError> {
///     let entry = catalog.service_type(id).await?
///         .ok_or_else(|| AppError::not_found("Service type", id))?;
///     Ok(Json(entry))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    code: &'static str,
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>, code: &'static str) -> Self {
        Self {
            status,
            message: message.into(),
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

    /// 400 Bad Request.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, "BAD_REQUEST")
    }

    /// 401 Unauthorized.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message, "UNAUTHORIZED")
    }

    /// 404 Not Found.
    #[must_use]
    pub fn not_found(resource: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("{resource} with id {id} not found"),
            "NOT_FOUND",
        )
    }

    /// 409 Conflict.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message, "CONFLICT")
    }

    /// 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message, "INTERNAL_SERVER_ERROR")
    }

    /// 503 Service Unavailable.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message, "SERVICE_UNAVAILABLE")
    }

    /// HTTP status this error maps to.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
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

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: &'a str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            match &self.source {
                Some(source) => tracing::error!(
                    status = %self.status,
                    code = self.code,
                    message = %self.message,
                    error = %source,
                    "request failed"
                ),
                None => tracing::error!(
                    status = %self.status,
                    code = self.code,
                    message = %self.message,
                    "request failed"
                ),
            }
        }

        let body = ErrorBody {
            code: self.code,
            message: &self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::DuplicateName(name) => {
                Self::conflict(format!("An entry named {name:?} already exists"))
            }
            CatalogError::Storage(_) => {
                Self::internal("An internal error occurred").with_source(err)
            }
        }
    }
}

impl From<AdminError> for AppError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::InvalidStatus => Self::bad_request("Invalid status"),
            AdminError::NotFound => {
                Self::new(StatusCode::NOT_FOUND, "Reservation not found", "NOT_FOUND")
            }
            AdminError::Store(e) => e.into(),
            AdminError::Catalog(e) => e.into(),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => {
                Self::bad_request("Username and password are required")
            }
            AuthError::InvalidCredentials => Self::unauthorized("Invalid credentials"),
            AuthError::Unauthorized => Self::unauthorized("Unauthorized"),
            AuthError::NotConfigured => Self::unavailable("Admin login is not configured"),
            AuthError::Storage(_) => Self::internal("An internal error occurred").with_source(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code() {
        let err = AppError::bad_request("Invalid status");
        assert_eq!(err.to_string(), "[BAD_REQUEST] Invalid status");
    }

    #[test]
    fn duplicate_catalog_name_is_conflict() {
        let err = AppError::from(CatalogError::DuplicateName("Luxury SUV".to_string()));
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn store_failure_is_internal_and_keeps_source() {
        let err = AppError::from(StoreError::Database("connection reset".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(std::error::Error::source(&err).is_some());
        assert!(!err.to_string().contains("connection reset"));
    }

    #[test]
    fn admin_errors_map_to_client_statuses() {
        assert_eq!(AppError::from(AdminError::InvalidStatus).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::from(AdminError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn auth_errors_map_to_statuses() {
        assert_eq!(AppError::from(AuthError::Unauthorized).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::from(AuthError::MissingCredentials).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(AuthError::NotConfigured).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
