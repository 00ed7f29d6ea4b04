//! Error type for `prwire-updater`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("network error: {0}")]
  Network(#[from] reqwest::Error),

  #[error("archive error: {0}")]
  Archive(String),

  #[error("{op} failed for {}: {source}", path.display())]
  Filesystem {
    op:     &'static str,
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The install directory is gone and the backup could not be restored.
  #[error(
    "rollback failed, manual intervention required: backup at {}, install path {}: {source}",
    backup.display(),
    install.display()
  )]
  RollbackFailed {
    backup:  PathBuf,
    install: PathBuf,
    #[source]
    source:  std::io::Error,
  },

  #[error("not found: {0}")]
  NotFound(String),

  #[error("invalid version: {0:?}")]
  InvalidVersion(String),

  #[error("updater task failed: {0}")]
  Task(#[from] tokio::task::JoinError),
}

impl Error {
  /// Adapter for `map_err` on filesystem calls.
  pub(crate) fn fs(op: &'static str, path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
    let path = path.into();
    move |source| Error::Filesystem { op, path, source }
  }
}

impl From<zip::result::ZipError> for Error {
  fn from(e: zip::result::ZipError) -> Self { Error::Archive(e.to_string()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
