use crate::admin::{AdminServiceError, ExportError};
use crate::applications::{ApplicationServiceError, RepositoryError, StorageError};
use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Store(RepositoryError),
    Storage(StorageError),
    Export(ExportError),
    Application(ApplicationServiceError),
    Admin(AdminServiceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Store(err) => write!(f, "store error: {}", err),
            AppError::Storage(err) => write!(f, "resume storage error: {}", err),
            AppError::Export(err) => write!(f, "export error: {}", err),
            AppError::Application(err) => write!(f, "application error: {}", err),
            AppError::Admin(err) => write!(f, "admin error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Store(err) => Some(err),
            AppError::Storage(err) => Some(err),
            AppError::Export(err) => Some(err),
            AppError::Application(err) => Some(err),
            AppError::Admin(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Store(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            AppError::Store(RepositoryError::Conflict) => StatusCode::CONFLICT,
            AppError::Store(RepositoryError::Unavailable(_))
            | AppError::Storage(StorageError::Unavailable(_)) => StatusCode::BAD_GATEWAY,
            AppError::Storage(StorageError::InvalidName(_)) => StatusCode::BAD_REQUEST,
            AppError::Storage(StorageError::AlreadyExists(_)) => StatusCode::CONFLICT,
            AppError::Application(ApplicationServiceError::UnknownWizard(_)) => StatusCode::NOT_FOUND,
            AppError::Application(ApplicationServiceError::Validation(_))
            | AppError::Application(ApplicationServiceError::Resume(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Admin(AdminServiceError::Auth(_)) => StatusCode::UNAUTHORIZED,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Export(_)
            | AppError::Application(_)
            | AppError::Admin(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
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

impl From<RepositoryError> for AppError {
    fn from(value: RepositoryError) -> Self {
        Self::Store(value)
    }
}

impl From<StorageError> for AppError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<ExportError> for AppError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

impl From<ApplicationServiceError> for AppError {
    fn from(value: ApplicationServiceError) -> Self {
        Self::Application(value)
    }
}

impl From<AdminServiceError> for AppError {
    fn from(value: AdminServiceError) -> Self {
        Self::Admin(value)
    }
}
