//! Version headers and ordering.

use std::{cmp::Ordering, path::Path, sync::LazyLock};

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;

static VERSION_LINE: LazyLock<Result<Regex, regex::Error>> =
  LazyLock::new(|| Regex::new(r"(?mi)^[\s*]*Version:\s*(.+)$"));

/// The value of the first `Version:` line in a plugin header.
pub fn parse_header(text: &str) -> Option<String> {
  let re = match LazyLock::force(&VERSION_LINE) {
    Ok(re) => re,
    Err(e) => {
      tracing::error!(error = %e, "version pattern failed to compile");
      return None;
    }
  };
  let value = re.captures(text)?.get(1)?.as_str().trim();
  (!value.is_empty()).then(|| value.to_owned())
}

/// Numeric components of `v`, or `None` if any component is not a number.
pub fn parse_version(v: &str) -> Option<Vec<u64>> {
  let v = v.trim();
  let v = v.strip_prefix(['v', 'V']).unwrap_or(v);
  if v.is_empty() {
    return None;
  }
  v.split('.').map(|part| part.parse::<u64>().ok()).collect()
}

/// Compare two versions, padding the shorter one with zeros.
pub fn compare(a: &str, b: &str) -> Option<Ordering> {
  let a = parse_version(a)?;
  let b = parse_version(b)?;
  let len = a.len().max(b.len());
  fn at(v: &[u64], i: usize) -> u64 { v.get(i).copied().unwrap_or(0) }
  Some(
    (0..len)
      .map(|i| at(&a, i).cmp(&at(&b, i)))
      .find(|o| o.is_ne())
      .unwrap_or(Ordering::Equal),
  )
}

/// `Some(true)` when `remote` is strictly newer than `installed`.
pub fn is_newer(remote: &str, installed: &str) -> Option<bool> {
  compare(remote, installed).map(Ordering::is_gt)
}

/// Read the version header of the installed plugin.
pub async fn read_installed(header: &Path) -> Option<String> {
  match tokio::fs::read_to_string(header).await {
    Ok(text) => parse_header(&text),
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
      tracing::debug!(path = %header.display(), "no installed header");
      None
    }
    Err(e) => {
      tracing::warn!(path = %header.display(), error = %e, "cannot read installed header");
      None
    }
  }
}

/// The remote side of a version check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "version", rename_all = "lowercase")]
pub enum RemoteVersion {
  Known(String),
  /// The remote could not be reached or had no version header.
  Unknown,
}

impl RemoteVersion {
  pub fn known(&self) -> Option<&str> {
    match self {
      RemoteVersion::Known(v) => Some(v),
      RemoteVersion::Unknown => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionCheck {
  pub installed:        Option<String>,
  pub remote:           RemoteVersion,
  pub update_available: bool,
  pub checked_at:       DateTime<Utc>,
}

impl VersionCheck {
  pub(crate) fn new(installed: Option<String>, remote: RemoteVersion, checked_at: DateTime<Utc>) -> Self {
    let update_available = match (installed.as_deref(), remote.known()) {
      (Some(i), Some(r)) => is_newer(r, i).unwrap_or(false),
      _ => false,
    };
    Self { installed, remote, update_available, checked_at }
  }
}
