//! Keeping RankMath's own sitemap toggle for press releases in step with the
//! global sitemap status.
//!
//! RankMath counts as active when its `rank_math_modules` option exists.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
  Result,
  options::{self, keys},
  status::SitemapStatus,
  store::SiteStore,
};

/// Key inside `rank-math-options-sitemap` for the press-release post type.
pub const PRESS_RELEASE_SITEMAP_KEY: &str = "pt_press-release_sitemap";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CptInSitemap {
  Yes,
  No,
  Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankMathInfo {
  pub active:         bool,
  /// The `sitemap` module is listed in `rank_math_modules`.
  pub module_active:  bool,
  pub cpt_in_sitemap: CptInSitemap,
  pub sitemap_url:    String,
}

async fn modules<S: SiteStore>(store: &S) -> Option<Value> {
  options::get::<S, Value>(store, keys::RANK_MATH_MODULES)
    .await
    .unwrap_or_else(|e| {
      tracing::warn!(error = %e, "rank math modules unreadable");
      None
    })
}

pub async fn is_active<S: SiteStore>(store: &S) -> bool { modules(store).await.is_some() }

async fn sitemap_options<S: SiteStore>(store: &S) -> Map<String, Value> {
  match options::get_or(store, keys::RANK_MATH_SITEMAP, Value::Null).await {
    Value::Object(map) => map,
    _ => Map::new(),
  }
}

/// Write `pt_press-release_sitemap = on|off` when RankMath is active,
/// preserving every other key in its sitemap options. Returns whether a
/// write happened.
pub async fn sync_sitemap_setting<S: SiteStore>(
  store: &S,
  status: SitemapStatus,
) -> Result<bool> {
  if !is_active(store).await {
    return Ok(false);
  }

  let flag = match status {
    SitemapStatus::Include => "on",
    SitemapStatus::Exclude => "off",
  };
  let mut opts = sitemap_options(store).await;
  opts.insert(PRESS_RELEASE_SITEMAP_KEY.to_owned(), Value::from(flag));
  options::set(store, keys::RANK_MATH_SITEMAP, &opts).await?;

  tracing::info!(flag, "rank math press-release sitemap synced");
  Ok(true)
}

/// What the dashboard shows about RankMath.
pub async fn rankmath_info<S: SiteStore>(store: &S, site_url: &str) -> RankMathInfo {
  let modules = modules(store).await;
  let module_active = modules
    .as_ref()
    .and_then(Value::as_array)
    .is_some_and(|m| m.iter().any(|v| v == "sitemap"));

  let cpt_in_sitemap = match sitemap_options(store).await.get(PRESS_RELEASE_SITEMAP_KEY) {
    Some(v) if v == "on" => CptInSitemap::Yes,
    Some(_) => CptInSitemap::No,
    None => CptInSitemap::Unknown,
  };

  RankMathInfo {
    active: modules.is_some(),
    module_active,
    cpt_in_sitemap,
    sitemap_url: format!("{}/press-release-sitemap.xml", site_url.trim_end_matches('/')),
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::memory::MemoryStore;

  #[tokio::test]
  async fn inactive_rank_math_is_left_alone() {
    let store = MemoryStore::default();
    assert!(!sync_sitemap_setting(&store, SitemapStatus::Exclude).await.unwrap());
    assert!(store.get_option(keys::RANK_MATH_SITEMAP).await.unwrap().is_none());

    let info = rankmath_info(&store, "https://x/").await;
    assert!(!info.active);
    assert_eq!(info.cpt_in_sitemap, CptInSitemap::Unknown);
    assert_eq!(info.sitemap_url, "https://x/press-release-sitemap.xml");
  }

  #[tokio::test]
  async fn sync_preserves_other_keys() {
    let store = MemoryStore::default();
    store.set_option(keys::RANK_MATH_MODULES, json!(["sitemap", "seo-analysis"])).await.unwrap();
    store
      .set_option(keys::RANK_MATH_SITEMAP, json!({"items_per_page": 200}))
      .await
      .unwrap();

    assert!(sync_sitemap_setting(&store, SitemapStatus::Exclude).await.unwrap());
    let stored = store.get_option(keys::RANK_MATH_SITEMAP).await.unwrap().unwrap();
    assert_eq!(stored, json!({"items_per_page": 200, "pt_press-release_sitemap": "off"}));

    let info = rankmath_info(&store, "https://x").await;
    assert!(info.active && info.module_active);
    assert_eq!(info.cpt_in_sitemap, CptInSitemap::No);
  }
}
