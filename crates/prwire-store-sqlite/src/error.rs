//! Error type for `prwire-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A column held a value outside its domain.
  #[error("cannot decode {column}: {value:?}")]
  Decode { column: &'static str, value: String },

  #[error("item not found: {0}")]
  ItemNotFound(i64),

  #[error("category not found: {0}")]
  CategoryNotFound(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
