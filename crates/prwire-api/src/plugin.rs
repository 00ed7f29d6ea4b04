//! Admin handlers for the self-updater.

use axum::{
  Json,
  extract::{Query, State},
};
use prwire_core::store::SiteStore;
use prwire_updater::{ExportedArchive, Tag, UpdateReport, VersionCheck};
use serde::Deserialize;

use crate::{AppState, auth::Authenticated, error::ApiError};

#[derive(Debug, Default, Deserialize)]
pub struct VersionParams {
  #[serde(default)]
  pub force: bool,
}

/// `GET /api/plugin/version[?force=true]`
pub async fn version<S>(
  _: Authenticated,
  State(state): State<AppState<S>>,
  Query(params): Query<VersionParams>,
) -> Json<VersionCheck>
where
  S: SiteStore + Clone + 'static,
{
  Json(state.updater.check_version(params.force).await)
}

/// `POST /api/plugin/update`
pub async fn update<S>(
  _: Authenticated,
  State(state): State<AppState<S>>,
) -> Result<Json<UpdateReport>, ApiError>
where
  S: SiteStore + Clone + 'static,
{
  Ok(Json(state.updater.clone().apply_update_detached().await?))
}

/// `POST /api/plugin/export`
pub async fn export<S>(
  _: Authenticated,
  State(state): State<AppState<S>>,
) -> Result<Json<ExportedArchive>, ApiError>
where
  S: SiteStore + Clone + 'static,
{
  Ok(Json(state.updater.export_current().await?))
}

/// `GET /api/plugin/tags`
pub async fn tags<S>(
  _: Authenticated,
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Tag>>, ApiError>
where
  S: SiteStore + Clone + 'static,
{
  Ok(Json(state.updater.list_tags().await?))
}

#[derive(Debug, Deserialize)]
pub struct DownloadBody {
  pub version:     String,
  pub archive_url: String,
}

/// `POST /api/plugin/versions` — body: `{"version":"v1.2","archive_url":"…"}`
pub async fn download_version<S>(
  _: Authenticated,
  State(state): State<AppState<S>>,
  Json(body): Json<DownloadBody>,
) -> Result<Json<ExportedArchive>, ApiError>
where
  S: SiteStore + Clone + 'static,
{
  if body.version.trim().is_empty() || body.archive_url.trim().is_empty() {
    return Err(ApiError::BadRequest("missing version or archive_url".into()));
  }
  let exported = state
    .updater
    .clone()
    .download_version_detached(body.version.trim().to_owned(), body.archive_url.trim().to_owned())
    .await?;
  Ok(Json(exported))
}
