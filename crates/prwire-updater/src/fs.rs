//! Directory operations used by the swap.

use std::{io, path::Path};

/// Renames and removals performed while swapping the install directory.
pub trait Filesystem: Send + Sync {
  fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
  fn remove_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFilesystem;

impl Filesystem for StdFilesystem {
  fn rename(&self, from: &Path, to: &Path) -> io::Result<()> { std::fs::rename(from, to) }

  fn remove_dir_all(&self, path: &Path) -> io::Result<()> { std::fs::remove_dir_all(path) }
}
