//! HTTP surface for prwire.
//!
//! Exposes an axum [`Router`] backed by any [`SiteStore`]: Basic-auth admin
//! endpoints under `/api` and the public item, sitemap, feed and archive
//! pages.
//!
//! | Method | Path                            | Handler                                  |
//! |--------|---------------------------------|------------------------------------------|
//! | `GET`  | `/api/categories/search`        | [`admin::search_categories`]             |
//! | `POST` | `/api/categories/press-release` | [`admin::create_press_release_category`] |
//! | `POST` | `/api/items`                    | [`admin::create_item`]                   |
//! | `GET`  | `/api/settings/seo`             | [`admin::get_settings`]                  |
//! | `PUT`  | `/api/settings/seo`             | [`admin::put_settings`]                  |
//! | `GET`  | `/api/items/{id}/seo`           | [`admin::item_report`]                   |
//! | `PUT`  | `/api/items/{id}/seo`           | [`admin::put_item_overrides`]            |
//! | `GET`  | `/api/snippets`                 | [`admin::list_snippets`]                 |
//! | `PUT`  | `/api/snippets/{id}`            | [`admin::toggle_snippet`]                |
//! | `GET`  | `/api/cache/exclusions`         | [`admin::cache_exclusions`]              |
//! | `GET`  | `/api/plugin/version`           | [`plugin::version`]                      |
//! | `POST` | `/api/plugin/update`            | [`plugin::update`]                       |
//! | `POST` | `/api/plugin/export`            | [`plugin::export`]                       |
//! | `GET`  | `/api/plugin/tags`              | [`plugin::tags`]                         |
//! | `POST` | `/api/plugin/versions`          | [`plugin::download_version`]             |
//! | `GET`  | `/items/{id}`                   | [`public::item`]                         |
//! | `GET`  | `/sitemap.xml`                  | [`public::sitemap`]                      |
//! | `GET`  | `/feed`                         | [`public::feed`]                         |
//! | `GET`  | `/category/{slug}`              | [`public::category`]                     |
//! | `GET`  | `/author/{slug}`                | [`public::author`]                       |

pub mod admin;
pub mod auth;
pub mod error;
pub mod plugin;
pub mod public;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post, put},
};
use prwire_core::store::SiteStore;
use prwire_markup::LinkEngine;
use prwire_updater::{PluginConfig, Updater};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::AuthConfig;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `PRWIRE_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  /// Public base URL used in sitemap and feed links.
  pub site_url:           String,
  #[serde(default = "default_site_title")]
  pub site_title:         String,
  pub store_path:         PathBuf,
  pub auth_username:      String,
  pub auth_password_hash: String,
  #[serde(default)]
  pub link_engine:        LinkEngine,
  pub plugin:             PluginConfig,
}

fn default_site_title() -> String { "Press Releases".into() }

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: SiteStore> {
  pub store:   Arc<S>,
  pub updater: Arc<Updater>,
  pub config:  Arc<ServerConfig>,
  pub auth:    Arc<AuthConfig>,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: SiteStore + Clone + 'static,
{
  Router::new()
    // Admin: settings and reports
    .route("/api/categories/search", get(admin::search_categories::<S>))
    .route(
      "/api/categories/press-release",
      post(admin::create_press_release_category::<S>),
    )
    .route("/api/items", post(admin::create_item::<S>))
    .route("/api/settings/seo", get(admin::get_settings::<S>).put(admin::put_settings::<S>))
    .route(
      "/api/items/{id}/seo",
      get(admin::item_report::<S>).put(admin::put_item_overrides::<S>),
    )
    .route("/api/snippets", get(admin::list_snippets::<S>))
    .route("/api/snippets/{id}", put(admin::toggle_snippet::<S>))
    .route("/api/cache/exclusions", get(admin::cache_exclusions::<S>))
    // Admin: self-updater
    .route("/api/plugin/version", get(plugin::version::<S>))
    .route("/api/plugin/update", post(plugin::update::<S>))
    .route("/api/plugin/export", post(plugin::export::<S>))
    .route("/api/plugin/tags", get(plugin::tags::<S>))
    .route("/api/plugin/versions", post(plugin::download_version::<S>))
    // Public
    .route("/items/{id}", get(public::item::<S>))
    .route("/sitemap.xml", get(public::sitemap::<S>))
    .route("/feed", get(public::feed::<S>))
    .route("/category/{slug}", get(public::category::<S>))
    .route("/author/{slug}", get(public::author::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
