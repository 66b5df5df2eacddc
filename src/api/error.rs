use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ErrorBody;
use crate::clients::ProviderError;
use crate::domain::QueryError;
use crate::services::catalog::{CatalogError, ProviderFailure};
use crate::services::{EpisodeError, LibraryError};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    ExternalApiError { service: String, message: String },

    /// Primary provider failed and the caller opted out of fallback.
    ServiceUnavailable(String),

    /// Every provider failed; each cause is reported.
    AllProvidersFailed(Vec<ProviderFailure>),

    ValidationError(String),

    Conflict(String),

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            ApiError::ExternalApiError { message, .. } => write!(f, "{}", message),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            ApiError::AllProvidersFailed(failures) => {
                write!(f, "{}", all_failed_message(failures))
            }
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

fn all_failed_message(failures: &[ProviderFailure]) -> String {
    let names: Vec<&str> = failures.iter().map(|f| f.service.as_str()).collect();
    match names.as_slice() {
        [a, b] => format!("Both {a} and {b} APIs are unavailable"),
        _ => "All metadata providers are unavailable".to_string(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorBody::new(msg)),
            ApiError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new("A database error occurred"),
                )
            }
            ApiError::ExternalApiError { service, message } => {
                tracing::warn!(service = %service, "{}", message);
                (StatusCode::BAD_GATEWAY, ErrorBody::new(message))
            }
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, ErrorBody::new(msg))
            }
            ApiError::AllProvidersFailed(failures) => {
                tracing::error!(?failures, "All metadata providers failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: all_failed_message(&failures),
                        details: Some(failures),
                    },
                )
            }
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, ErrorBody::new(msg)),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, ErrorBody::new(msg)),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new("An internal error occurred"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(format!("{err:#}"))
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        ApiError::ValidationError(err.to_string())
    }
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            other => ApiError::ExternalApiError {
                service: other.service().to_string(),
                message: other.to_string(),
            },
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::InvalidRequest(e) => e.into(),
            CatalogError::NotFound(msg) => ApiError::NotFound(msg),
            CatalogError::Unavailable(failure) => ApiError::ExternalApiError {
                service: failure.service,
                message: failure.message,
            },
            CatalogError::FallbackDisabled(failure) => {
                tracing::warn!(service = %failure.service, error = %failure.message, "Fallback disabled");
                ApiError::ServiceUnavailable(format!(
                    "{} API unavailable and fallback is disabled",
                    failure.service
                ))
            }
            CatalogError::AllProvidersFailed(failures) => ApiError::AllProvidersFailed(failures),
        }
    }
}

impl From<LibraryError> for ApiError {
    fn from(err: LibraryError) -> Self {
        match err {
            LibraryError::NotFound(msg) => ApiError::NotFound(msg),
            LibraryError::Validation(msg) => ApiError::ValidationError(msg),
            LibraryError::Conflict(msg) => ApiError::Conflict(msg),
            LibraryError::Database(msg) => ApiError::DatabaseError(msg),
        }
    }
}

impl From<EpisodeError> for ApiError {
    fn from(err: EpisodeError) -> Self {
        match err {
            EpisodeError::NotFound(msg) => ApiError::NotFound(msg),
            EpisodeError::Validation(msg) => ApiError::ValidationError(msg),
            EpisodeError::Database(msg) => ApiError::DatabaseError(msg),
        }
    }
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::InternalError(msg.into())
    }
}
