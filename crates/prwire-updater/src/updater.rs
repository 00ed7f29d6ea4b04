//! The self-updater: version checks, in-place updates and archive exports.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use chrono::Utc;
use serde::Serialize;
use strum::Display;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
  Error, Result,
  archive::{self, ExportedArchive},
  cache::VersionCache,
  config::PluginConfig,
  fs::{Filesystem, StdFilesystem},
  source::{RemoteSource, Tag},
  version::{self, RemoteVersion, VersionCheck},
};

// ─── Activation ──────────────────────────────────────────────────────────────

/// Hook run once a new version is in place.
pub trait Activator: Send + Sync {
  fn activate(&self, install_dir: &Path) -> std::io::Result<()>;
}

/// Does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopActivator;

impl Activator for NoopActivator {
  fn activate(&self, _: &Path) -> std::io::Result<()> { Ok(()) }
}

// ─── Phases ──────────────────────────────────────────────────────────────────

/// Steps of an in-place update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UpdatePhase {
  Idle,
  Downloading,
  Extracting,
  Validating,
  Swapping,
  RollingBack,
  Cleaning,
  Done,
}

impl UpdatePhase {
  /// Whether `next` may directly follow `self`.
  pub fn precedes(self, next: UpdatePhase) -> bool {
    use UpdatePhase::*;
    matches!(
      (self, next),
      (Idle, Downloading)
        | (Downloading, Extracting)
        | (Extracting, Validating)
        | (Validating, Swapping)
        | (Swapping, Cleaning)
        | (Swapping, RollingBack)
        | (Cleaning, Done)
    )
  }
}

/// Records and logs phase transitions.
struct PhaseLog {
  phases: Vec<UpdatePhase>,
}

impl PhaseLog {
  fn start() -> Self { Self { phases: vec![UpdatePhase::Idle] } }

  fn current(&self) -> UpdatePhase { self.phases.last().copied().unwrap_or(UpdatePhase::Idle) }

  fn enter(&mut self, next: UpdatePhase) {
    debug_assert!(self.current().precedes(next), "{} -> {next}", self.current());
    tracing::info!(from = %self.current(), to = %next, "update phase");
    self.phases.push(next);
  }
}

/// Outcome of a successful in-place update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateReport {
  pub previous_version: Option<String>,
  pub new_version:      Option<String>,
  pub phases:           Vec<UpdatePhase>,
  /// False when the activation hook failed; the new files are in place
  /// either way.
  pub activated:        bool,
}

// ─── Updater ─────────────────────────────────────────────────────────────────

/// Prefix of the scratch directories created under `plugins_dir`.
pub const SCRATCH_PREFIX: &str = ".prwire-update-";

pub struct Updater {
  config:    PluginConfig,
  source:    RemoteSource,
  cache:     VersionCache,
  fs:        Arc<dyn Filesystem>,
  activator: Arc<dyn Activator>,
  /// Held for the whole of any operation that writes to disk.
  op_lock:   Mutex<()>,
}

impl Updater {
  pub fn new(config: PluginConfig) -> Result<Self> {
    Ok(Self {
      source: RemoteSource::new(&config)?,
      cache: VersionCache::new(config.version_cache_ttl()),
      fs: Arc::new(StdFilesystem),
      activator: Arc::new(NoopActivator),
      op_lock: Mutex::new(()),
      config,
    })
  }

  pub fn with_filesystem(mut self, fs: Arc<dyn Filesystem>) -> Self {
    self.fs = fs;
    self
  }

  pub fn with_activator(mut self, activator: Arc<dyn Activator>) -> Self {
    self.activator = activator;
    self
  }

  pub fn config(&self) -> &PluginConfig { &self.config }

  pub async fn installed_version(&self) -> Option<String> {
    version::read_installed(&self.config.header_path()).await
  }

  // ── Version check ─────────────────────────────────────────────────────────

  /// Compare the installed version with the tracked branch. Cached remote
  /// lookups are reused unless `force` is set.
  pub async fn check_version(&self, force: bool) -> VersionCheck {
    let installed = self.installed_version().await;

    let cached = if force { None } else { self.cache.get().await };
    let remote = match cached {
      Some(remote) => remote,
      None => {
        let remote = self.fetch_remote_version().await;
        self.cache.put(remote.clone()).await;
        remote
      }
    };

    let check = VersionCheck::new(installed, remote, Utc::now());
    tracing::debug!(
      installed = ?check.installed,
      remote = ?check.remote,
      update_available = check.update_available,
      force,
      "version check"
    );
    check
  }

  async fn fetch_remote_version(&self) -> RemoteVersion {
    let url = self.config.remote_header_url();
    match self.source.fetch_text(&url).await {
      Ok(text) => match version::parse_header(&text) {
        Some(v) => RemoteVersion::Known(v),
        None => {
          tracing::warn!(%url, "remote header has no version line");
          RemoteVersion::Unknown
        }
      },
      Err(e) => {
        tracing::warn!(%url, error = %e, "remote version lookup failed");
        RemoteVersion::Unknown
      }
    }
  }

  // ── Tags ──────────────────────────────────────────────────────────────────

  /// Published tags, preceded by the tracked branch head.
  pub async fn list_tags(&self) -> Result<Vec<Tag>> {
    let mut tags = vec![Tag {
      name:        format!("{} (latest)", self.config.branch),
      archive_url: self.config.branch_archive_url(),
    }];
    tags.extend(self.source.fetch_tags(&self.config.tags_url()).await?);
    Ok(tags)
  }

  // ── Apply update ──────────────────────────────────────────────────────────

  /// Replace the installed plugin with the head of the tracked branch.
  ///
  /// The install directory is moved aside before the new one is moved in,
  /// and moved back if that second rename fails. With no existing install
  /// the new version is simply moved into place.
  pub async fn apply_update(&self) -> Result<UpdateReport> {
    let _guard = self.op_lock.lock().await;
    let install_dir = self.config.install_dir();
    let previous_version = self.installed_version().await;
    let mut log = PhaseLog::start();

    let scratch = self.create_scratch().await?;
    let staged = self.stage(&mut log, &self.config.branch_archive_url(), scratch.path()).await?;

    log.enter(UpdatePhase::Swapping);
    let backup = if install_dir.is_dir() {
      let backup = self
        .config
        .plugins_dir
        .join(format!("{}-backup-{}", self.config.folder_name, Utc::now().timestamp()));
      if let Err(source) = self.fs.rename(&install_dir, &backup) {
        return Err(Error::Filesystem { op: "move install aside", path: install_dir, source });
      }
      Some(backup)
    } else {
      tracing::info!(install = %install_dir.display(), "no existing install; installing fresh");
      None
    };

    if let Err(source) = self.fs.rename(&staged, &install_dir) {
      if let Some(backup) = backup {
        log.enter(UpdatePhase::RollingBack);
        tracing::warn!(error = %source, backup = %backup.display(), "swap failed; restoring backup");
        if let Err(restore) = self.fs.rename(&backup, &install_dir) {
          let staged_at = scratch.keep();
          tracing::error!(
            error = %restore,
            backup = %backup.display(),
            install = %install_dir.display(),
            scratch = %staged_at.display(),
            "backup restore failed"
          );
          return Err(Error::RollbackFailed { backup, install: install_dir, source: restore });
        }
      }
      return Err(Error::Filesystem { op: "move new version in", path: install_dir, source });
    }

    log.enter(UpdatePhase::Cleaning);
    drop(scratch);
    if let Some(backup) = &backup {
      self.remove_quietly(backup);
    }

    let activated = match self.activator.activate(&install_dir) {
      Ok(()) => true,
      Err(e) => {
        tracing::warn!(error = %e, "activation hook failed");
        false
      }
    };
    self.cache.invalidate().await;

    log.enter(UpdatePhase::Done);
    let new_version = self.installed_version().await;
    tracing::info!(from = ?previous_version, to = ?new_version, "plugin updated");

    Ok(UpdateReport { previous_version, new_version, phases: log.phases, activated })
  }

  /// [`Updater::apply_update`] on its own task. The update runs to the end
  /// even if the caller stops waiting for it.
  pub async fn apply_update_detached(self: Arc<Self>) -> Result<UpdateReport> {
    tokio::spawn(async move { self.apply_update().await }).await?
  }

  // ── Archives ──────────────────────────────────────────────────────────────

  /// Fetch the archive of a tagged version and repackage it with the
  /// plugin folder name at its root. The install directory is not touched.
  pub async fn download_version(&self, version: &str, archive_url: &str) -> Result<ExportedArchive> {
    let label = archive::sanitize_version(version)?;
    let _guard = self.op_lock.lock().await;
    let filename = format!("{}-{label}.zip", self.config.folder_name);

    let scratch = self.create_scratch().await?;
    let mut log = PhaseLog::start();
    let root = self.stage(&mut log, archive_url, scratch.path()).await?;
    let exported = self.write_archive(root, filename).await?;
    drop(scratch);

    tracing::info!(%version, path = %exported.path.display(), "version archived");
    Ok(exported)
  }

  /// [`Updater::download_version`] on its own task.
  pub async fn download_version_detached(
    self: Arc<Self>,
    version: String,
    archive_url: String,
  ) -> Result<ExportedArchive> {
    tokio::spawn(async move { self.download_version(&version, &archive_url).await }).await?
  }

  /// Zip the live install directory.
  pub async fn export_current(&self) -> Result<ExportedArchive> {
    let _guard = self.op_lock.lock().await;
    let install_dir = self.config.install_dir();
    if !install_dir.is_dir() {
      return Err(Error::NotFound(format!("install directory {}", install_dir.display())));
    }
    let installed = self
      .installed_version()
      .await
      .ok_or_else(|| Error::NotFound(format!("version header {}", self.config.header_path().display())))?;
    let filename = format!("{}-v{}.zip", self.config.folder_name, archive::sanitize_version(&installed)?);

    let exported = self.write_archive(install_dir, filename).await?;
    tracing::info!(version = %installed, path = %exported.path.display(), "install exported");
    Ok(exported)
  }

  // ── Helpers ───────────────────────────────────────────────────────────────

  async fn create_scratch(&self) -> Result<Scratch> {
    let path = self.config.plugins_dir.join(format!("{SCRATCH_PREFIX}{}", Uuid::new_v4()));
    tokio::fs::create_dir(&path)
      .await
      .map_err(Error::fs("create scratch dir", &path))?;
    Ok(Scratch { path, fs: self.fs.clone(), keep: false })
  }

  /// Download, extract and validate an archive inside `scratch`, returning
  /// the extracted root directory.
  async fn stage(&self, log: &mut PhaseLog, url: &str, scratch: &Path) -> Result<PathBuf> {
    log.enter(UpdatePhase::Downloading);
    let archive_path = scratch.join("archive.zip");
    let bytes = self.source.download(url, &archive_path).await?;
    tracing::debug!(%url, bytes, "archive downloaded");

    log.enter(UpdatePhase::Extracting);
    let extract_dir = scratch.join("extract");
    let dest = extract_dir.clone();
    blocking(move || archive::extract(&archive_path, &dest)).await?;

    log.enter(UpdatePhase::Validating);
    let root = archive::single_root(&extract_dir)?;
    if !root.join(&self.config.header_file).is_file() {
      return Err(Error::Archive(format!(
        "archive root {} has no {}",
        root.display(),
        self.config.header_file
      )));
    }
    Ok(root)
  }

  async fn write_archive(&self, src: PathBuf, filename: String) -> Result<ExportedArchive> {
    let downloads = self.config.downloads_dir.clone();
    tokio::fs::create_dir_all(&downloads)
      .await
      .map_err(Error::fs("create downloads dir", &downloads))?;

    let path = downloads.join(&filename);
    let prefix = self.config.folder_name.clone();
    let dest = path.clone();
    let sha256 = blocking(move || {
      archive::pack_dir(&src, &prefix, &dest)?;
      archive::sha256_file(&dest)
    })
    .await?;

    Ok(ExportedArchive { path, filename, sha256 })
  }

  fn remove_quietly(&self, path: &Path) {
    if let Err(e) = self.fs.remove_dir_all(path) {
      tracing::warn!(path = %path.display(), error = %e, "cleanup failed");
    }
  }
}

// ─── Scratch ─────────────────────────────────────────────────────────────────

/// A scratch directory under `plugins_dir`, removed when dropped.
///
/// Dropping covers every exit, including a caller abandoning the future
/// mid-download.
struct Scratch {
  path: PathBuf,
  fs:   Arc<dyn Filesystem>,
  keep: bool,
}

impl Scratch {
  fn path(&self) -> &Path { &self.path }

  /// Leave the directory on disk and return its path.
  fn keep(mut self) -> PathBuf {
    self.keep = true;
    std::mem::take(&mut self.path)
  }
}

impl Drop for Scratch {
  fn drop(&mut self) {
    if self.keep {
      return;
    }
    if let Err(e) = self.fs.remove_dir_all(&self.path) {
      tracing::warn!(path = %self.path.display(), error = %e, "scratch cleanup failed");
    }
  }
}

async fn blocking<T, F>(f: F) -> Result<T>
where
  F: FnOnce() -> Result<T> + Send + 'static,
  T: Send + 'static,
{
  tokio::task::spawn_blocking(f)
    .await
    .map_err(|e| Error::Archive(format!("archive task failed: {e}")))?
}
