use crate::applications::repository::RepositoryError;
use crate::applications::tracker::TrackerError;
use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

/// Top-level error surfaced at the HTTP boundary.
///
/// Clients always receive a `{code, message}` body; the `code` strings are
/// machine-stable and the message never leaks internals.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Forbidden(String),
    Unauthenticated(String),
    InvalidState(String),
    Validation(String),
    Conflict(String),
    Persistence(String),
    Config(ConfigError),
    Telemetry(TelemetryError),
    Catalog(CatalogError),
    Io(std::io::Error),
    Server(axum::Error),
}

impl AppError {
    /// Machine-stable reason code included in every error body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "not_found",
            AppError::Forbidden(_) => "forbidden",
            AppError::Unauthenticated(_) => "unauthenticated",
            AppError::InvalidState(_) => "invalid_state_transition",
            AppError::Validation(_) => "validation_error",
            AppError::Conflict(_) => "conflict",
            AppError::Persistence(_) => "persistence_error",
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Catalog(_)
            | AppError::Io(_)
            | AppError::Server(_) => "internal_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::InvalidState(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Persistence(_)
            | AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Catalog(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg)
            | AppError::Forbidden(msg)
            | AppError::Unauthenticated(msg)
            | AppError::InvalidState(msg)
            | AppError::Validation(msg)
            | AppError::Conflict(msg) => write!(f, "{msg}"),
            AppError::Persistence(msg) => write!(f, "storage failure: {msg}"),
            AppError::Config(err) => write!(f, "configuration error: {err}"),
            AppError::Telemetry(err) => write!(f, "telemetry error: {err}"),
            AppError::Catalog(err) => write!(f, "catalog error: {err}"),
            AppError::Io(err) => write!(f, "io error: {err}"),
            AppError::Server(err) => write!(f, "server error: {err}"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Catalog(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Internal failures are logged with detail but reported opaquely.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({ "code": self.code(), "message": message }));
        (status, body).into_response()
    }
}

impl From<TrackerError> for AppError {
    fn from(value: TrackerError) -> Self {
        match value {
            TrackerError::UnknownSubsidy(id) => {
                AppError::NotFound(format!("subsidy {id} not found"))
            }
            TrackerError::NotFound(id) => AppError::NotFound(format!("application {id} not found")),
            TrackerError::UnknownDocument {
                application,
                document,
            } => AppError::NotFound(format!(
                "document {document} not found in application {application}"
            )),
            TrackerError::InvalidTransition { from, to } => AppError::InvalidState(format!(
                "cannot transition application from {} to {}",
                from.label(),
                to.label()
            )),
            TrackerError::Validation(msg) => AppError::Validation(msg),
            TrackerError::Repository(err) => err.into(),
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => AppError::NotFound("record not found".to_string()),
            RepositoryError::Conflict => AppError::Conflict("record already exists".to_string()),
            RepositoryError::VersionConflict { expected, found } => AppError::Conflict(format!(
                "application was modified concurrently (expected version {expected}, found {found})"
            )),
            RepositoryError::Unavailable(msg) => AppError::Persistence(msg),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<CatalogError> for AppError {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}
