//! Override settings: the [`Setting`] descriptor for each setting category,
//! category override lists, and loading/saving the full SEO settings set.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
  Error, Result,
  options::{self, keys},
  rankmath,
  status::{FollowStatus, ItemOverride, SitemapStatus},
  store::SiteStore,
};

// ─── Setting descriptor ──────────────────────────────────────────────────────

/// Describes one setting category: where each tier is stored and which
/// values it may take.
pub trait Setting: Send + Sync + 'static {
  type Value: Copy
    + Eq
    + fmt::Debug
    + fmt::Display
    + FromStr
    + AsRef<str>
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static;

  /// Human-readable name used in logs.
  const NAME: &'static str;
  /// Option holding the global value.
  const GLOBAL_KEY: &'static str;
  /// Option holding the ordered category override list.
  const CATEGORY_KEY: &'static str;
  /// Item metadata key holding the per-item override.
  const META_KEY: &'static str;
  /// Global value when the option has never been written.
  const DEFAULT: Self::Value;
  /// Values a category override may carry. The first one replaces anything
  /// outside this set when saving.
  const CATEGORY_VALUES: &'static [Self::Value];
}

/// The follow-status setting category.
pub struct Follow;

impl Setting for Follow {
  type Value = FollowStatus;

  const NAME: &'static str = "follow";
  const GLOBAL_KEY: &'static str = keys::FOLLOW_STATUS;
  const CATEGORY_KEY: &'static str = keys::CAT_FOLLOW_OVERRIDES;
  const META_KEY: &'static str = keys::META_FOLLOW_OVERRIDE;
  const DEFAULT: FollowStatus = FollowStatus::Dofollow;
  const CATEGORY_VALUES: &'static [FollowStatus] =
    &[FollowStatus::Dofollow, FollowStatus::Nofollow];
}

/// The sitemap-inclusion setting category.
pub struct Sitemap;

impl Setting for Sitemap {
  type Value = SitemapStatus;

  const NAME: &'static str = "sitemap";
  const GLOBAL_KEY: &'static str = keys::SITEMAP_STATUS;
  const CATEGORY_KEY: &'static str = keys::CAT_SITEMAP_OVERRIDES;
  const META_KEY: &'static str = keys::META_SITEMAP_OVERRIDE;
  const DEFAULT: SitemapStatus = SitemapStatus::Include;
  const CATEGORY_VALUES: &'static [SitemapStatus] =
    &[SitemapStatus::Include, SitemapStatus::Exclude];
}

// ─── Category overrides ──────────────────────────────────────────────────────

/// A category-level override as persisted: `{id, slug, name, status}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryOverride<V> {
  pub id:     i64,
  pub slug:   String,
  pub name:   String,
  pub status: V,
}

/// An unsanitised category override as submitted by a caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryOverrideInput {
  pub id:     i64,
  pub slug:   String,
  pub name:   String,
  pub status: String,
}

impl CategoryOverrideInput {
  /// Normalise into a stored override: negative ids are made positive,
  /// text is trimmed, and a status outside [`Setting::CATEGORY_VALUES`]
  /// becomes the first allowed value.
  pub fn sanitize<K: Setting>(&self) -> CategoryOverride<K::Value> {
    let fallback = K::CATEGORY_VALUES[0];
    let status = self
      .status
      .trim()
      .parse::<K::Value>()
      .ok()
      .filter(|v| K::CATEGORY_VALUES.contains(v))
      .unwrap_or(fallback);

    CategoryOverride {
      id: self.id.saturating_abs(),
      slug: self.slug.trim().to_owned(),
      name: self.name.trim().to_owned(),
      status,
    }
  }
}

/// Read the stored category override list for `K`, in stored order.
pub async fn category_overrides<K, S>(store: &S) -> Vec<CategoryOverride<K::Value>>
where
  K: Setting,
  S: SiteStore,
{
  options::get_or(store, K::CATEGORY_KEY, Vec::new()).await
}

/// Read the global value for `K`.
pub async fn global_value<K, S>(store: &S) -> K::Value
where
  K: Setting,
  S: SiteStore,
{
  options::get_or(store, K::GLOBAL_KEY, K::DEFAULT).await
}

// ─── Full settings ───────────────────────────────────────────────────────────

/// Both setting categories: globals plus category override lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoSettings {
  pub follow_status:    FollowStatus,
  pub sitemap_status:   SitemapStatus,
  pub category_follow:  Vec<CategoryOverride<FollowStatus>>,
  pub category_sitemap: Vec<CategoryOverride<SitemapStatus>>,
}

/// Settings as submitted for saving; category lists are sanitised first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeoSettingsInput {
  #[serde(default = "default_follow")]
  pub follow_status:    FollowStatus,
  #[serde(default = "default_sitemap")]
  pub sitemap_status:   SitemapStatus,
  #[serde(default)]
  pub category_follow:  Vec<CategoryOverrideInput>,
  #[serde(default)]
  pub category_sitemap: Vec<CategoryOverrideInput>,
}

fn default_follow() -> FollowStatus { Follow::DEFAULT }

fn default_sitemap() -> SitemapStatus { Sitemap::DEFAULT }

impl SeoSettingsInput {
  pub fn sanitize(&self) -> SeoSettings {
    SeoSettings {
      follow_status:    self.follow_status,
      sitemap_status:   self.sitemap_status,
      category_follow:  self
        .category_follow
        .iter()
        .map(CategoryOverrideInput::sanitize::<Follow>)
        .collect(),
      category_sitemap: self
        .category_sitemap
        .iter()
        .map(CategoryOverrideInput::sanitize::<Sitemap>)
        .collect(),
    }
  }
}

/// Result of a write that may turn out to be a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveOutcome {
  Saved,
  /// The requested values equal the stored ones; nothing was written.
  Unchanged,
}

/// Load the current settings for both categories.
pub async fn load_settings<S: SiteStore>(store: &S) -> SeoSettings {
  SeoSettings {
    follow_status:    global_value::<Follow, _>(store).await,
    sitemap_status:   global_value::<Sitemap, _>(store).await,
    category_follow:  category_overrides::<Follow, _>(store).await,
    category_sitemap: category_overrides::<Sitemap, _>(store).await,
  }
}

/// Sanitise and persist settings for both categories.
///
/// Returns [`SaveOutcome::Unchanged`] without writing if the sanitised input
/// equals what is stored. After a write, RankMath's sitemap toggle for press
/// releases is synchronised with the new global sitemap status.
pub async fn save_settings<S: SiteStore>(
  store: &S,
  input: &SeoSettingsInput,
) -> Result<SaveOutcome> {
  let next = input.sanitize();
  let current = load_settings(store).await;
  // RankMath may have been activated since the last save, so it is synced
  // either way.
  let outcome = if next == current {
    tracing::debug!("seo settings unchanged");
    SaveOutcome::Unchanged
  } else {
    options::set(store, Follow::GLOBAL_KEY, &next.follow_status).await?;
    options::set(store, Follow::CATEGORY_KEY, &next.category_follow).await?;
    options::set(store, Sitemap::GLOBAL_KEY, &next.sitemap_status).await?;
    options::set(store, Sitemap::CATEGORY_KEY, &next.category_sitemap).await?;

    tracing::info!(
      follow = %next.follow_status,
      sitemap = %next.sitemap_status,
      category_follow = next.category_follow.len(),
      category_sitemap = next.category_sitemap.len(),
      "seo settings saved"
    );
    SaveOutcome::Saved
  };

  rankmath::sync_sitemap_setting(store, next.sitemap_status).await?;
  Ok(outcome)
}

// ─── Item overrides ──────────────────────────────────────────────────────────

/// Per-item override changes. Absent fields are left as stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemOverridesInput {
  pub follow:  Option<ItemOverride<FollowStatus>>,
  pub sitemap: Option<ItemOverride<SitemapStatus>>,
}

async fn write_item_override<K, S>(
  store: &S,
  item_id: i64,
  next: ItemOverride<K::Value>,
) -> Result<bool>
where
  K: Setting,
  S: SiteStore,
{
  let raw = store.get_item_meta(item_id, K::META_KEY).await.map_err(Error::store)?;
  if ItemOverride::<K::Value>::parse(raw.as_deref()) == next {
    return Ok(false);
  }
  store
    .set_item_meta(item_id, K::META_KEY, next.as_meta().to_owned())
    .await
    .map_err(Error::store)?;
  tracing::info!(item_id, setting = K::NAME, value = next.as_meta(), "item override set");
  Ok(true)
}

/// Write the per-item overrides present in `input`.
pub async fn save_item_overrides<S: SiteStore>(
  store: &S,
  item_id: i64,
  input: &ItemOverridesInput,
) -> Result<SaveOutcome> {
  store
    .get_item(item_id)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::NotFound(format!("item {item_id}")))?;

  let mut changed = false;
  if let Some(next) = input.follow {
    changed |= write_item_override::<Follow, S>(store, item_id, next).await?;
  }
  if let Some(next) = input.sitemap {
    changed |= write_item_override::<Sitemap, S>(store, item_id, next).await?;
  }
  Ok(if changed { SaveOutcome::Saved } else { SaveOutcome::Unchanged })
}
