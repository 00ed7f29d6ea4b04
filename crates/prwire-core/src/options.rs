//! Typed access to the plugin-wide option table.
//!
//! Options are JSON values keyed by name. [`get_or`] never fails: a missing,
//! unreadable, or mistyped option yields the supplied default.

use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, Result, store::SiteStore};

/// Option and metadata key names.
pub mod keys {
  pub const FOLLOW_STATUS: &str = "seo_follow_status";
  pub const SITEMAP_STATUS: &str = "seo_sitemap_status";
  pub const CAT_FOLLOW_OVERRIDES: &str = "seo_cat_follow_overrides";
  pub const CAT_SITEMAP_OVERRIDES: &str = "seo_cat_sitemap_overrides";

  pub const META_FOLLOW_OVERRIDE: &str = "seo_follow_override";
  pub const META_SITEMAP_OVERRIDE: &str = "seo_sitemap_override";

  pub const DEFAULTS_SET: &str = "defaults_set";

  pub const RANK_MATH_MODULES: &str = "rank_math_modules";
  pub const RANK_MATH_SITEMAP: &str = "rank-math-options-sitemap";

  /// Page-cache exclusion list maintained by the cache plugin.
  pub const CACHE_EXCLUDES: &str = "litespeed_cache_exclude";
}

/// Read and decode an option, distinguishing "absent" from errors.
pub async fn get<S, T>(store: &S, key: &str) -> Result<Option<T>>
where
  S: SiteStore,
  T: DeserializeOwned,
{
  let raw = store.get_option(key).await.map_err(Error::store)?;
  raw.map(serde_json::from_value).transpose().map_err(Error::from)
}

/// Read an option, falling back to `default` on absence or any failure.
pub async fn get_or<S, T>(store: &S, key: &str, default: T) -> T
where
  S: SiteStore,
  T: DeserializeOwned,
{
  match get(store, key).await {
    Ok(Some(v)) => v,
    Ok(None) => default,
    Err(e) => {
      tracing::warn!(key, error = %e, "unreadable option; using default");
      default
    }
  }
}

/// Encode and write an option.
pub async fn set<S, T>(store: &S, key: &str, value: &T) -> Result<()>
where
  S: SiteStore,
  T: Serialize + ?Sized,
{
  let json = serde_json::to_value(value)?;
  store.set_option(key, json).await.map_err(Error::store)
}
