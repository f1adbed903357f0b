//! Typed errors and HTTP mapping.

use crate::response::{failure, validation_failure};
use crate::service::ValidationErrors;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrmError {
    #[error("invalid entity: {0}")]
    InvalidEntity(String),
    #[error("no filter defined: refusing to update or delete without a condition")]
    MissingFilter,
    #[error("nothing to update: no fillable fields in data")]
    NothingToUpdate,
    #[error("between requires exactly two values, got {0}")]
    InvalidRange(usize),
    #[error("unsupported operator: {0}")]
    InvalidOperator(String),
    #[error("unsupported sort direction: {0}")]
    InvalidDirection(String),
    #[error("unsupported database url: {0}")]
    UnsupportedDatabase(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Orm(#[from] OrmError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Validation(ValidationErrors),
    #[error("{0}")]
    Failed(String),
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(errors) => validation_failure(&errors).into_response(),
            AppError::Failed(message) => failure(&message).into_response(),
            other => {
                tracing::error!(error = %other, "request failed");
                failure("Internal server error").into_response()
            }
        }
    }
}

/// Convert a storage result into the endpoint's failure message, logging the cause.
pub trait OrFail<T> {
    fn or_fail(self, message: &str) -> Result<T, AppError>;
}

impl<T> OrFail<T> for Result<T, OrmError> {
    fn or_fail(self, message: &str) -> Result<T, AppError> {
        self.map_err(|e| {
            tracing::error!(error = %e, "{}", message);
            AppError::Failed(message.to_string())
        })
    }
}
