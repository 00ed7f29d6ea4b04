//! First-run option seeding.

use crate::{
  Result,
  options::{self, keys},
  setting::{Follow, Setting, Sitemap},
  snippets,
  store::SiteStore,
};

const SEEDED: &str = "yes";

/// Seed plugin options.
///
/// The first run enables [`snippets::DISABLE_RSS_CACHING`], writes both SEO
/// globals, and marks `defaults_set`. Later runs only fill in SEO globals
/// that are missing.
pub async fn seed_defaults<S: SiteStore>(store: &S) -> Result<()> {
  let seeded = options::get_or::<S, Option<String>>(store, keys::DEFAULTS_SET, None).await;

  if seeded.as_deref() != Some(SEEDED) {
    options::set(store, snippets::DISABLE_RSS_CACHING, &true).await?;
    options::set(store, Follow::GLOBAL_KEY, &Follow::DEFAULT).await?;
    options::set(store, Sitemap::GLOBAL_KEY, &Sitemap::DEFAULT).await?;
    options::set(store, keys::DEFAULTS_SET, SEEDED).await?;
    tracing::info!("default options seeded");
    return Ok(());
  }

  if options::get::<S, serde_json::Value>(store, Follow::GLOBAL_KEY).await?.is_none() {
    options::set(store, Follow::GLOBAL_KEY, &Follow::DEFAULT).await?;
  }
  if options::get::<S, serde_json::Value>(store, Sitemap::GLOBAL_KEY).await?.is_none() {
    options::set(store, Sitemap::GLOBAL_KEY, &Sitemap::DEFAULT).await?;
  }
  Ok(())
}
