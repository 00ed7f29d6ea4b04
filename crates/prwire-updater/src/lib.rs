//! Self-updater for an installed plugin tracked against a GitHub repository.
//!
//! [`Updater`] compares the installed version header with the tracked branch,
//! swaps in a fresh copy of the branch with rollback on failure, and packages
//! either the live install or a tagged release as a zip.

mod archive;
mod cache;
mod source;

pub mod config;
pub mod error;
pub mod fs;
pub mod updater;
pub mod version;

pub use archive::ExportedArchive;
pub use config::PluginConfig;
pub use error::{Error, Result};
pub use source::Tag;
pub use updater::{Activator, NoopActivator, UpdatePhase, UpdateReport, Updater};
pub use version::{RemoteVersion, VersionCheck};
