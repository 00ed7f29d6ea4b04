//! Where the plugin lives and where its releases come from.

use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

/// Install layout and remote source for the self-updater.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
  pub folder_name:   String,
  #[serde(default = "default_header_file")]
  pub header_file:   String,
  pub plugins_dir:   PathBuf,
  pub downloads_dir: PathBuf,
  /// `owner/name` of the source repository.
  pub repo:          String,
  #[serde(default = "default_branch")]
  pub branch:        String,
  #[serde(default = "default_api_base")]
  pub api_base:      String,
  #[serde(default = "default_raw_base")]
  pub raw_base:      String,
  #[serde(default = "default_archive_base")]
  pub archive_base:  String,

  #[serde(default = "default_version_cache_ttl")]
  pub version_cache_ttl_secs: u64,
  #[serde(default = "default_download_timeout")]
  pub download_timeout_secs:  u64,
  #[serde(default = "default_request_timeout")]
  pub request_timeout_secs:   u64,
}

fn default_header_file() -> String { "initialization.php".into() }
fn default_branch() -> String { "main".into() }
fn default_api_base() -> String { "https://api.github.com".into() }
fn default_raw_base() -> String { "https://raw.githubusercontent.com".into() }
fn default_archive_base() -> String { "https://github.com".into() }
fn default_version_cache_ttl() -> u64 { 30 * 60 }
fn default_download_timeout() -> u64 { 300 }
fn default_request_timeout() -> u64 { 15 }

impl PluginConfig {
  pub fn install_dir(&self) -> PathBuf { self.plugins_dir.join(&self.folder_name) }

  pub fn header_path(&self) -> PathBuf { self.install_dir().join(&self.header_file) }

  /// Raw header file on the tracked branch.
  pub fn remote_header_url(&self) -> String {
    format!(
      "{}/{}/{}/{}",
      self.raw_base.trim_end_matches('/'),
      self.repo,
      self.branch,
      self.header_file
    )
  }

  /// Zip archive of the tracked branch.
  pub fn branch_archive_url(&self) -> String {
    format!("{}/{}/archive/{}.zip", self.archive_base.trim_end_matches('/'), self.repo, self.branch)
  }

  pub fn tags_url(&self) -> String {
    format!("{}/repos/{}/tags", self.api_base.trim_end_matches('/'), self.repo)
  }

  pub fn version_cache_ttl(&self) -> Duration { Duration::from_secs(self.version_cache_ttl_secs) }
  pub fn download_timeout(&self) -> Duration { Duration::from_secs(self.download_timeout_secs) }
  pub fn request_timeout(&self) -> Duration { Duration::from_secs(self.request_timeout_secs) }
}
