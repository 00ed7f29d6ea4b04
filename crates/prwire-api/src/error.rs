//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error renders as `{"error": <message>, "kind": <code>}`.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Update(#[from] prwire_updater::Error),

  #[error("render error: {0}")]
  Markup(#[from] prwire_markup::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  pub fn status(&self) -> StatusCode {
    use prwire_updater::Error as U;
    match self {
      ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::NotFound(_) | ApiError::Update(U::NotFound(_)) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) | ApiError::Update(U::InvalidVersion(_)) => StatusCode::BAD_REQUEST,
      ApiError::Update(U::Network(_)) => StatusCode::BAD_GATEWAY,
      ApiError::Update(U::Archive(_)) => StatusCode::UNPROCESSABLE_ENTITY,
      ApiError::Update(U::Filesystem { .. } | U::RollbackFailed { .. } | U::Task(_))
      | ApiError::Markup(_)
      | ApiError::Store(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  /// Machine-readable error code.
  pub fn kind(&self) -> &'static str {
    use prwire_updater::Error as U;
    match self {
      ApiError::Unauthorized => "unauthorized",
      ApiError::NotFound(_) | ApiError::Update(U::NotFound(_)) => "not_found",
      ApiError::BadRequest(_) | ApiError::Update(U::InvalidVersion(_)) => "bad_request",
      ApiError::Update(U::Network(_)) => "network",
      ApiError::Update(U::Archive(_)) => "archive",
      ApiError::Update(U::Filesystem { .. }) => "filesystem",
      ApiError::Update(U::RollbackFailed { .. }) => "rollback_failed",
      ApiError::Update(U::Task(_)) => "task",
      ApiError::Markup(_) => "markup",
      ApiError::Store(_) => "store",
    }
  }
}

impl From<prwire_core::Error> for ApiError {
  fn from(e: prwire_core::Error) -> Self {
    use prwire_core::Error as C;
    match e {
      C::NotFound(what) => ApiError::NotFound(what),
      C::Serialization(e) => ApiError::store(e),
      C::Store(e) => ApiError::Store(e),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(kind = self.kind(), error = %self, "request failed");
    }
    let body = Json(json!({ "error": self.to_string(), "kind": self.kind() }));
    let mut res = (status, body).into_response();
    if matches!(self, ApiError::Unauthorized) {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"prwire\""),
      );
    }
    res
  }
}
