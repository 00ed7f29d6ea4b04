//! Admin handlers for SEO settings, reports and snippets.
//!
//! Every handler takes [`Authenticated`] first so a bad or missing
//! `Authorization` header is rejected before the body is read.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
};
use prwire_core::{
  content::{self, EnsuredCategory, NewItemInput},
  rankmath::{self, RankMathInfo},
  resolve::{self, SeoReport},
  setting::{self, ItemOverridesInput, SaveOutcome, SeoSettings, SeoSettingsInput},
  snippets::{self, SnippetState},
  store::{Category, Item, SiteStore},
};
use serde::{Deserialize, Serialize};

use crate::{AppState, auth::Authenticated, error::ApiError};

/// Queries shorter than this return no results.
pub const MIN_QUERY_CHARS: usize = 2;
pub const MAX_SEARCH_RESULTS: usize = 20;

/// Body of every write endpoint: `{"status":"saved"|"unchanged"}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SaveResponse {
  pub status: SaveOutcome,
}

impl From<SaveOutcome> for SaveResponse {
  fn from(status: SaveOutcome) -> Self { Self { status } }
}

// ─── Category search ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  #[serde(default)]
  pub q: String,
}

/// `GET /api/categories/search?q=<fragment>`
pub async fn search_categories<S>(
  _: Authenticated,
  State(state): State<AppState<S>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Category>>, ApiError>
where
  S: SiteStore + Clone + 'static,
{
  let q = params.q.trim();
  if q.chars().count() < MIN_QUERY_CHARS {
    return Ok(Json(Vec::new()));
  }
  let hits = state
    .store
    .search_categories(q, MAX_SEARCH_RESULTS)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(hits))
}

/// `POST /api/categories/press-release`
///
/// Answers `{"status":"unchanged",...}` when the category already exists.
pub async fn create_press_release_category<S>(
  _: Authenticated,
  State(state): State<AppState<S>>,
) -> Result<Json<EnsuredCategory>, ApiError>
where
  S: SiteStore + Clone + 'static,
{
  Ok(Json(content::ensure_press_release_category(state.store.as_ref()).await?))
}

// ─── Settings ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SettingsView {
  #[serde(flatten)]
  pub settings:  SeoSettings,
  pub rank_math: RankMathInfo,
}

/// `GET /api/settings/seo`
pub async fn get_settings<S>(
  _: Authenticated,
  State(state): State<AppState<S>>,
) -> Json<SettingsView>
where
  S: SiteStore + Clone + 'static,
{
  let store = state.store.as_ref();
  Json(SettingsView {
    settings:  setting::load_settings(store).await,
    rank_math: rankmath::rankmath_info(store, &state.config.site_url).await,
  })
}

/// `PUT /api/settings/seo`
pub async fn put_settings<S>(
  _: Authenticated,
  State(state): State<AppState<S>>,
  Json(input): Json<SeoSettingsInput>,
) -> Result<Json<SaveResponse>, ApiError>
where
  S: SiteStore + Clone + 'static,
{
  let outcome = setting::save_settings(state.store.as_ref(), &input).await?;
  Ok(Json(outcome.into()))
}

// ─── Items ───────────────────────────────────────────────────────────────────

/// `POST /api/items`
pub async fn create_item<S>(
  _: Authenticated,
  State(state): State<AppState<S>>,
  Json(input): Json<NewItemInput>,
) -> Result<(StatusCode, Json<Item>), ApiError>
where
  S: SiteStore + Clone + 'static,
{
  if input.title.trim().is_empty() || input.post_type.trim().is_empty() {
    return Err(ApiError::BadRequest("missing title or post_type".into()));
  }
  let item = content::create_item(state.store.as_ref(), input).await?;
  Ok((StatusCode::CREATED, Json(item)))
}

/// `GET /api/items/{id}/seo`
pub async fn item_report<S>(
  _: Authenticated,
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<SeoReport>, ApiError>
where
  S: SiteStore + Clone + 'static,
{
  state
    .store
    .get_item(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("item {id}")))?;
  Ok(Json(resolve::seo_report(state.store.as_ref(), id).await))
}

/// `PUT /api/items/{id}/seo`
pub async fn put_item_overrides<S>(
  _: Authenticated,
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  Json(input): Json<ItemOverridesInput>,
) -> Result<Json<SaveResponse>, ApiError>
where
  S: SiteStore + Clone + 'static,
{
  let outcome = setting::save_item_overrides(state.store.as_ref(), id, &input).await?;
  Ok(Json(outcome.into()))
}

// ─── Snippets ────────────────────────────────────────────────────────────────

/// `GET /api/snippets`
pub async fn list_snippets<S>(
  _: Authenticated,
  State(state): State<AppState<S>>,
) -> Json<Vec<SnippetState>>
where
  S: SiteStore + Clone + 'static,
{
  Json(snippets::list(state.store.as_ref()).await)
}

#[derive(Debug, Deserialize)]
pub struct ToggleBody {
  pub enabled: bool,
}

/// `PUT /api/snippets/{id}` — body: `{"enabled":true}`
pub async fn toggle_snippet<S>(
  _: Authenticated,
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  Json(body): Json<ToggleBody>,
) -> Result<Json<SaveResponse>, ApiError>
where
  S: SiteStore + Clone + 'static,
{
  let outcome = snippets::toggle_snippet(state.store.as_ref(), &id, body.enabled).await?;
  Ok(Json(outcome.into()))
}

/// `GET /api/cache/exclusions`
pub async fn cache_exclusions<S>(
  _: Authenticated,
  State(state): State<AppState<S>>,
) -> Json<Vec<String>>
where
  S: SiteStore + Clone + 'static,
{
  Json(snippets::cache_exclusions(state.store.as_ref()).await)
}
