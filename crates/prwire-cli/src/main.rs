//! `prwire` — command-line client for the prwire admin API.
//!
//! # Usage
//!
//! ```
//! prwire --url http://localhost:8080 --user admin --password secret settings show
//! prwire --config ~/.config/prwire/config.toml version --force
//! ```

mod client;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use prwire_core::{
  setting::{ItemOverridesInput, SeoSettingsInput},
  status::{FollowStatus, ItemOverride, SitemapStatus},
};
use serde::Deserialize;
use serde_json::Value;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 330;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "prwire", about = "Manage press-release SEO settings and plugin updates")]
struct Args {
  /// Path to a TOML config file (url, username, password).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the prwire server (default: http://localhost:8080).
  #[arg(long, env = "PRWIRE_URL")]
  url: Option<String>,

  /// API username.
  #[arg(long, env = "PRWIRE_USER")]
  user: Option<String>,

  /// API password (plaintext).
  #[arg(long, env = "PRWIRE_PASSWORD")]
  password: Option<String>,

  /// Request timeout in seconds.
  #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
  timeout: u64,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Search categories by name (at least two characters).
  Categories { query: String },

  /// Create the press-release category if it is missing.
  PressReleaseCategory,

  /// Show or replace the SEO settings.
  #[command(subcommand)]
  Settings(SettingsCommand),

  /// Show the effective follow and sitemap values for an item.
  Report { item_id: i64 },

  /// Set per-item overrides (`inherit` clears one).
  Override {
    item_id: i64,
    #[arg(long)]
    follow:  Option<ItemOverride<FollowStatus>>,
    #[arg(long)]
    sitemap: Option<ItemOverride<SitemapStatus>>,
  },

  /// List or toggle snippets.
  #[command(subcommand)]
  Snippets(SnippetsCommand),

  /// Show the page-cache exclusion list.
  CacheExclusions,

  /// Compare the installed plugin version with the remote one.
  Version {
    /// Bypass the cached remote version.
    #[arg(long)]
    force: bool,
  },

  /// Download the latest branch build and swap it in.
  Update,

  /// Zip the current install into the downloads directory.
  Export,

  /// List the remote tags available for download.
  Tags,

  /// Download a tagged version into the downloads directory.
  Download { version: String, archive_url: String },
}

#[derive(Subcommand, Debug)]
enum SettingsCommand {
  Show,
  /// Save settings from a JSON file (`-` reads stdin).
  Save { file: PathBuf },
}

#[derive(Subcommand, Debug)]
enum SnippetsCommand {
  List,
  Enable { id: String },
  Disable { id: String },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:      String,
  #[serde(default)]
  username: String,
  #[serde(default)]
  password: String,
}

/// CLI flags override the config file, which overrides defaults.
fn api_config(args: &Args, file: ConfigFile) -> ApiConfig {
  let pick = |flag: &Option<String>, from_file: String| {
    flag.clone().or_else(|| (!from_file.is_empty()).then_some(from_file))
  };
  ApiConfig {
    base_url: pick(&args.url, file.url).unwrap_or_else(|| DEFAULT_URL.to_string()),
    username: pick(&args.user, file.username).unwrap_or_default(),
    password: pick(&args.password, file.password).unwrap_or_default(),
  }
}

fn read_settings(path: &PathBuf) -> Result<SeoSettingsInput> {
  let raw = if path.as_os_str() == "-" {
    std::io::read_to_string(std::io::stdin()).context("reading settings from stdin")?
  } else {
    std::fs::read_to_string(path)
      .with_context(|| format!("reading settings file {}", path.display()))?
  };
  serde_json::from_str(&raw).context("parsing settings JSON")
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  let config = api_config(&args, file_cfg);
  tracing::debug!(url = %config.base_url, "connecting");
  let client = ApiClient::new(config, Duration::from_secs(args.timeout))?;

  let out = run(&client, args.command).await?;
  println!("{}", serde_json::to_string_pretty(&out)?);
  Ok(())
}

async fn run(client: &ApiClient, command: Command) -> Result<Value> {
  match command {
    Command::Categories { query } => client.search_categories(&query).await,
    Command::PressReleaseCategory => client.create_press_release_category().await,
    Command::Settings(SettingsCommand::Show) => client.settings().await,
    Command::Settings(SettingsCommand::Save { file }) => {
      client.save_settings(&read_settings(&file)?).await
    }
    Command::Report { item_id } => client.report(item_id).await,
    Command::Override { item_id, follow, sitemap } => {
      anyhow::ensure!(follow.is_some() || sitemap.is_some(), "pass --follow or --sitemap");
      client.set_overrides(item_id, &ItemOverridesInput { follow, sitemap }).await
    }
    Command::Snippets(SnippetsCommand::List) => client.snippets().await,
    Command::Snippets(SnippetsCommand::Enable { id }) => client.toggle_snippet(&id, true).await,
    Command::Snippets(SnippetsCommand::Disable { id }) => client.toggle_snippet(&id, false).await,
    Command::CacheExclusions => client.cache_exclusions().await,
    Command::Version { force } => client.version(force).await,
    Command::Update => client.update().await,
    Command::Export => client.export().await,
    Command::Tags => client.tags().await,
    Command::Download { version, archive_url } => client.download(&version, &archive_url).await,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(argv: &[&str]) -> Args { Args::try_parse_from(argv).unwrap() }

  #[test]
  fn flags_beat_file_beats_defaults() {
    let file = ConfigFile {
      url:      "http://file:1".into(),
      username: "file-user".into(),
      password: String::new(),
    };
    let args = parse(&["prwire", "--user", "flag-user", "tags"]);
    let cfg = api_config(&args, file);
    assert_eq!(cfg.base_url, "http://file:1");
    assert_eq!(cfg.username, "flag-user");
    assert_eq!(cfg.password, "");

    let cfg = api_config(&parse(&["prwire", "tags"]), ConfigFile::default());
    assert_eq!(cfg.base_url, DEFAULT_URL);
  }

  #[test]
  fn category_command_is_kebab_case() {
    let args = parse(&["prwire", "press-release-category"]);
    assert!(matches!(args.command, Command::PressReleaseCategory));
  }

  #[test]
  fn override_values_parse_including_inherit() {
    let args = parse(&["prwire", "override", "7", "--follow", "nofollow", "--sitemap", "inherit"]);
    let Command::Override { item_id, follow, sitemap } = args.command else {
      panic!("expected override, got {:?}", args.command);
    };
    assert_eq!(item_id, 7);
    assert_eq!(follow, Some(ItemOverride::Set(FollowStatus::Nofollow)));
    assert_eq!(sitemap, Some(ItemOverride::Inherit));
  }
}
