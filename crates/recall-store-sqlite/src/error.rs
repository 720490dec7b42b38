//! Error type for `recall-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] recall_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown card state: {0:?}")]
  UnknownState(String),

  #[error("column {column} holds out-of-range value {value}")]
  OutOfRange { column: &'static str, value: i64 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
