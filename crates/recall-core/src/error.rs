//! Error types for `recall-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("quality {0} is outside the accepted range 0..=5")]
  InvalidQuality(i64),

  #[error("card not found: {0}")]
  CardNotFound(String),

  #[error("unsupported snapshot version: {0}")]
  UnsupportedVersion(u32),

  #[error("invalid snapshot: {0}")]
  InvalidSnapshot(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
