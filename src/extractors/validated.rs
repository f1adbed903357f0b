//! Extract a JSON body and run it through a `FormRequest` before the handler sees it.

use crate::error::AppError;
use crate::service::{validate, FormRequest};
use crate::sql::{row_from_json, Row};
use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};
use std::marker::PhantomData;

/// Validated and sanitized input for `R`. A failing body never reaches the handler:
/// the request is answered with the 422 validation envelope instead.
pub struct Validated<R> {
    data: Map<String, Value>,
    _request: PhantomData<fn() -> R>,
}

impl<R> Validated<R> {
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.data
    }

    /// Validated fields as a storage row.
    pub fn row(&self) -> Row {
        row_from_json(&self.data)
    }
}

#[async_trait]
impl<S, R> FromRequest<S> for Validated<R>
where
    S: Send + Sync,
    R: FormRequest,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;
        // anything but a JSON object validates as an empty input
        let input = match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        match validate::<R>(&input) {
            Ok(data) => Ok(Validated {
                data,
                _request: PhantomData,
            }),
            Err(errors) => {
                tracing::debug!(fields = errors.len(), "request validation failed");
                Err(AppError::Validation(errors).into_response())
            }
        }
    }
}
