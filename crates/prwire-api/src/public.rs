//! Public pages: rendered items, the sitemap, the feed, and category and
//! author archives.

use axum::{
  Json,
  extract::{Path, State},
  http::{HeaderName, HeaderValue, header},
  response::{Html, IntoResponse, Response},
};
use prwire_core::{
  links,
  sitemap,
  snippets::{self, AuthorArchive, CategoryArchive},
  store::SiteStore,
};
use prwire_markup::feed::Channel;

use crate::{AppState, error::ApiError};

const XML: &str = "application/xml; charset=utf-8";
const RSS: &str = "application/rss+xml; charset=utf-8";

/// `GET /items/{id}` — the item body with its anchors' `rel` rewritten.
pub async fn item<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Html<String>, ApiError>
where
  S: SiteStore + Clone + 'static,
{
  let item = state
    .store
    .get_item(id)
    .await
    .map_err(ApiError::store)?
    .filter(|i| i.is_published())
    .ok_or_else(|| ApiError::NotFound(format!("item {id}")))?;

  let body = match links::follow_for(state.store.as_ref(), &item).await {
    Some(resolution) => {
      prwire_markup::links::apply_follow(&item.content, resolution.value, state.config.link_engine)
    }
    None => item.content,
  };
  Ok(Html(body))
}

/// `GET /sitemap.xml`
pub async fn sitemap<S>(State(state): State<AppState<S>>) -> Result<Response, ApiError>
where
  S: SiteStore + Clone + 'static,
{
  let entries = sitemap::sitemap_entries(state.store.as_ref(), &state.config.site_url).await?;
  let xml = prwire_markup::sitemap::render(&entries)?;
  Ok(([(header::CONTENT_TYPE, XML)], xml).into_response())
}

/// `GET /feed` — every published press release, never filtered by the
/// sitemap settings.
pub async fn feed<S>(State(state): State<AppState<S>>) -> Result<Response, ApiError>
where
  S: SiteStore + Clone + 'static,
{
  let store = state.store.as_ref();
  let entries = sitemap::feed_entries(store, &state.config.site_url).await?;
  let channel = Channel {
    title:       state.config.site_title.clone(),
    link:        state.config.site_url.clone(),
    description: format!("{} press releases", state.config.site_title),
  };
  let xml = prwire_markup::feed::render(&channel, &entries)?;

  let mut res = ([(header::CONTENT_TYPE, RSS)], xml).into_response();
  if snippets::is_enabled(store, snippets::DISABLE_RSS_CACHING).await {
    let headers = res.headers_mut();
    for &(name, value) in snippets::NOCACHE_HEADERS {
      headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
  }
  Ok(res)
}

/// `GET /category/{slug}`
pub async fn category<S>(
  State(state): State<AppState<S>>,
  Path(slug): Path<String>,
) -> Result<Json<CategoryArchive>, ApiError>
where
  S: SiteStore + Clone + 'static,
{
  Ok(Json(snippets::category_archive(state.store.as_ref(), &slug).await?))
}

/// `GET /author/{slug}`
pub async fn author<S>(
  State(state): State<AppState<S>>,
  Path(slug): Path<String>,
) -> Result<Json<AuthorArchive>, ApiError>
where
  S: SiteStore + Clone + 'static,
{
  Ok(Json(snippets::author_archive(state.store.as_ref(), &slug).await?))
}
