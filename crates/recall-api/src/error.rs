//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use recall_core::{Error as CoreError, SessionError};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn card_not_found(id: &str) -> Self { ApiError::NotFound(format!("card {id:?} not found")) }
}

impl From<CoreError> for ApiError {
  fn from(e: CoreError) -> Self {
    match e {
      CoreError::CardNotFound(id) => ApiError::card_not_found(&id),
      CoreError::InvalidQuality(_)
      | CoreError::UnsupportedVersion(_)
      | CoreError::InvalidSnapshot(_)
      | CoreError::Serialization(_) => ApiError::BadRequest(e.to_string()),
    }
  }
}

impl<E> From<SessionError<E>> for ApiError
where
  E: std::error::Error + Send + Sync + 'static,
{
  fn from(e: SessionError<E>) -> Self {
    match e {
      SessionError::Engine(e) => e.into(),
      SessionError::Storage(e) => ApiError::Store(Box::new(e)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn core_errors_map_to_client_statuses() {
    let status = |e: CoreError| ApiError::from(e).into_response().status();
    assert_eq!(status(CoreError::CardNotFound("x".into())), StatusCode::NOT_FOUND);
    assert_eq!(status(CoreError::InvalidQuality(9)), StatusCode::BAD_REQUEST);
    assert_eq!(status(CoreError::UnsupportedVersion(2)), StatusCode::BAD_REQUEST);
  }

  #[test]
  fn storage_errors_are_server_errors() {
    let err: SessionError<std::io::Error> = SessionError::Storage(std::io::Error::other("disk"));
    assert_eq!(ApiError::from(err).into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
  }
}
