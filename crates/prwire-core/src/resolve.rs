//! Three-tier override resolution: item override → category override →
//! global setting.
//!
//! Resolution is an ordered chain of [`TierStrategy`] values; each looks at a
//! [`ResolveInputs`] snapshot and either answers or passes. The global tier
//! always answers, so [`resolve`] is total.

use serde::Serialize;
use strum::{AsRefStr, Display};

use crate::{
  setting::{self, CategoryOverride, Follow, Setting, Sitemap},
  status::{FollowStatus, ItemOverride, SitemapStatus},
  store::SiteStore,
};

// ─── Types ───────────────────────────────────────────────────────────────────

/// Which tier produced an effective value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
pub enum Tier {
  #[serde(rename = "item override")]
  #[strum(serialize = "item override")]
  Item,
  #[serde(rename = "category override")]
  #[strum(serialize = "category override")]
  Category,
  #[serde(rename = "global setting")]
  #[strum(serialize = "global setting")]
  Global,
}

/// An effective value and the tier it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution<V> {
  pub value: V,
  pub tier:  Tier,
}

/// Everything the chain needs, read in one go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveInputs<V> {
  pub item_override:      ItemOverride<V>,
  pub category_overrides: Vec<CategoryOverride<V>>,
  pub item_categories:    Vec<i64>,
  pub global:             V,
}

impl<V: Copy> ResolveInputs<V> {
  /// The first stored category override whose id is one of the item's
  /// categories.
  pub fn matching_category(&self) -> Option<&CategoryOverride<V>> {
    self
      .category_overrides
      .iter()
      .find(|o| self.item_categories.contains(&o.id))
  }
}

impl<V> ResolveInputs<V>
where
  V: Copy + std::str::FromStr + serde::de::DeserializeOwned,
{
  /// Read the three tiers for `item_id` from the store.
  ///
  /// Never fails: a tier that cannot be read is logged and treated as
  /// absent.
  pub async fn load<K, S>(store: &S, item_id: i64) -> Self
  where
    K: Setting<Value = V>,
    S: SiteStore,
  {
    let raw = match store.get_item_meta(item_id, K::META_KEY).await {
      Ok(raw) => raw,
      Err(e) => {
        tracing::warn!(item_id, setting = K::NAME, error = %e, "item override unreadable");
        None
      }
    };

    let item_categories = match store.item_categories(item_id).await {
      Ok(ids) => ids,
      Err(e) => {
        tracing::warn!(item_id, setting = K::NAME, error = %e, "item categories unreadable");
        Vec::new()
      }
    };

    Self {
      item_override: ItemOverride::parse(raw.as_deref()),
      category_overrides: setting::category_overrides::<K, S>(store).await,
      item_categories,
      global: setting::global_value::<K, S>(store).await,
    }
  }
}

// ─── Strategies ──────────────────────────────────────────────────────────────

/// One link of the resolution chain.
pub trait TierStrategy<V> {
  fn tier(&self) -> Tier;

  fn pick(&self, inputs: &ResolveInputs<V>) -> Option<V>;
}

pub struct ItemTier;

impl<V: Copy> TierStrategy<V> for ItemTier {
  fn tier(&self) -> Tier { Tier::Item }

  fn pick(&self, inputs: &ResolveInputs<V>) -> Option<V> {
    inputs.item_override.value().copied()
  }
}

pub struct CategoryTier;

impl<V: Copy> TierStrategy<V> for CategoryTier {
  fn tier(&self) -> Tier { Tier::Category }

  fn pick(&self, inputs: &ResolveInputs<V>) -> Option<V> {
    inputs.matching_category().map(|o| o.status)
  }
}

pub struct GlobalTier;

impl<V: Copy> TierStrategy<V> for GlobalTier {
  fn tier(&self) -> Tier { Tier::Global }

  fn pick(&self, inputs: &ResolveInputs<V>) -> Option<V> { Some(inputs.global) }
}

// ─── Resolution ──────────────────────────────────────────────────────────────

/// Run the standard chain over a snapshot.
pub fn resolve_inputs<V: Copy>(inputs: &ResolveInputs<V>) -> Resolution<V> {
  let chain: [&dyn TierStrategy<V>; 3] = [&ItemTier, &CategoryTier, &GlobalTier];
  chain
    .iter()
    .find_map(|s| s.pick(inputs).map(|value| Resolution { value, tier: s.tier() }))
    .unwrap_or(Resolution { value: inputs.global, tier: Tier::Global })
}

/// Resolve setting `K` for an item, reading every tier fresh.
pub async fn resolve<K, S>(store: &S, item_id: i64) -> Resolution<K::Value>
where
  K: Setting,
  S: SiteStore,
{
  let inputs = ResolveInputs::load::<K, S>(store, item_id).await;
  let resolution = resolve_inputs(&inputs);
  tracing::debug!(
    item_id,
    setting = K::NAME,
    value = %resolution.value,
    tier = %resolution.tier,
    "resolved"
  );
  resolution
}

// ─── Report ──────────────────────────────────────────────────────────────────

/// One setting category's view of an item.
#[derive(Debug, Clone, Serialize)]
pub struct SettingReport<V> {
  pub effective:        Resolution<V>,
  /// The raw per-item value (`inherit` when unset).
  pub item_override:    ItemOverride<V>,
  /// The category override that would apply if the item tier passed.
  pub matched_category: Option<CategoryOverride<V>>,
}

/// Both setting categories for one item.
#[derive(Debug, Clone, Serialize)]
pub struct SeoReport {
  pub item_id:    i64,
  pub categories: Vec<i64>,
  pub follow:     SettingReport<FollowStatus>,
  pub sitemap:    SettingReport<SitemapStatus>,
}

fn report_for<V: Copy>(inputs: ResolveInputs<V>) -> SettingReport<V> {
  SettingReport {
    effective:        resolve_inputs(&inputs),
    matched_category: inputs.matching_category().cloned(),
    item_override:    inputs.item_override,
  }
}

/// Effective follow and sitemap values for an item, with the inputs that
/// produced them.
pub async fn seo_report<S: SiteStore>(store: &S, item_id: i64) -> SeoReport {
  let follow = ResolveInputs::load::<Follow, S>(store, item_id).await;
  let sitemap = ResolveInputs::load::<Sitemap, S>(store, item_id).await;
  SeoReport {
    item_id,
    categories: follow.item_categories.clone(),
    follow: report_for(follow),
    sitemap: report_for(sitemap),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    memory::MemoryStore,
    options,
    store::{NewCategory, NewItem},
  };

  fn cat<V>(id: i64, status: V) -> CategoryOverride<V> {
    CategoryOverride { id, slug: format!("c{id}"), name: format!("C{id}"), status }
  }

  fn inputs(
    item: ItemOverride<FollowStatus>,
    overrides: Vec<CategoryOverride<FollowStatus>>,
    memberships: Vec<i64>,
    global: FollowStatus,
  ) -> ResolveInputs<FollowStatus> {
    ResolveInputs {
      item_override: item,
      category_overrides: overrides,
      item_categories: memberships,
      global,
    }
  }

  // ── Pure chain ────────────────────────────────────────────────────────

  #[test]
  fn exhaustive_tier_priority() {
    let item_choices = [
      ItemOverride::Inherit,
      ItemOverride::Set(FollowStatus::Nofollow),
      ItemOverride::Set(FollowStatus::Default),
    ];
    let globals = [FollowStatus::Dofollow, FollowStatus::Nofollow, FollowStatus::Default];

    for item in item_choices {
      for has_category in [false, true] {
        for global in globals {
          let overrides = vec![cat(1, FollowStatus::Dofollow)];
          let memberships = if has_category { vec![1] } else { vec![2] };
          let got = resolve_inputs(&inputs(item, overrides, memberships, global));

          let expected = match (item, has_category) {
            (ItemOverride::Set(v), _) => Resolution { value: v, tier: Tier::Item },
            (ItemOverride::Inherit, true) => {
              Resolution { value: FollowStatus::Dofollow, tier: Tier::Category }
            }
            (ItemOverride::Inherit, false) => Resolution { value: global, tier: Tier::Global },
          };
          assert_eq!(got, expected, "item={item:?} cat={has_category} global={global}");
        }
      }
    }
  }

  #[test]
  fn first_stored_category_wins() {
    let overrides = vec![
      cat(7, FollowStatus::Nofollow),
      cat(3, FollowStatus::Dofollow),
    ];
    let got = resolve_inputs(&inputs(
      ItemOverride::Inherit,
      overrides,
      vec![3, 7],
      FollowStatus::Default,
    ));
    assert_eq!(got.value, FollowStatus::Nofollow);
    assert_eq!(got.tier, Tier::Category);
  }

  #[test]
  fn tier_labels() {
    assert_eq!(Tier::Item.to_string(), "item override");
    assert_eq!(Tier::Category.to_string(), "category override");
    assert_eq!(
      serde_json::to_string(&Tier::Global).unwrap(),
      "\"global setting\""
    );
  }

  // ── Store-backed ──────────────────────────────────────────────────────

  #[tokio::test]
  async fn resolves_against_store_and_sees_changes() {
    let store = MemoryStore::default();
    let news = store.add_category(NewCategory::named("News")).await.unwrap();
    let item = store.add_item(NewItem::press_release("A", "<p/>")).await.unwrap();

    let r = resolve::<Sitemap, _>(&store, item.item_id).await;
    assert_eq!(r, Resolution { value: SitemapStatus::Include, tier: Tier::Global });

    options::set(&store, Sitemap::CATEGORY_KEY, &vec![cat(news.term_id, SitemapStatus::Exclude)])
      .await
      .unwrap();
    store.set_item_categories(item.item_id, vec![news.term_id]).await.unwrap();
    let r = resolve::<Sitemap, _>(&store, item.item_id).await;
    assert_eq!(r.tier, Tier::Category);
    assert_eq!(r.value, SitemapStatus::Exclude);

    store
      .set_item_meta(item.item_id, Sitemap::META_KEY, "include".into())
      .await
      .unwrap();
    let r = resolve::<Sitemap, _>(&store, item.item_id).await;
    assert_eq!(r, Resolution { value: SitemapStatus::Include, tier: Tier::Item });

    // Unchanged data gives the same answer.
    assert_eq!(resolve::<Sitemap, _>(&store, item.item_id).await, r);
  }

  #[tokio::test]
  async fn inherit_meta_falls_through() {
    let store = MemoryStore::default();
    let item = store.add_item(NewItem::press_release("A", "")).await.unwrap();
    options::set(&store, Follow::GLOBAL_KEY, &FollowStatus::Nofollow).await.unwrap();
    store
      .set_item_meta(item.item_id, Follow::META_KEY, "inherit".into())
      .await
      .unwrap();

    let r = resolve::<Follow, _>(&store, item.item_id).await;
    assert_eq!(r, Resolution { value: FollowStatus::Nofollow, tier: Tier::Global });
  }

  #[tokio::test]
  async fn corrupt_category_list_is_ignored() {
    let store = MemoryStore::default();
    let item = store.add_item(NewItem::press_release("A", "")).await.unwrap();
    store
      .set_option(Follow::CATEGORY_KEY, serde_json::json!("not a list"))
      .await
      .unwrap();

    let r = resolve::<Follow, _>(&store, item.item_id).await;
    assert_eq!(r.tier, Tier::Global);
    assert_eq!(r.value, FollowStatus::Dofollow);
  }

  #[tokio::test]
  async fn report_lists_both_settings() {
    let store = MemoryStore::default();
    let news = store.add_category(NewCategory::named("News")).await.unwrap();
    let item = store.add_item(NewItem::press_release("A", "")).await.unwrap();
    store.set_item_categories(item.item_id, vec![news.term_id]).await.unwrap();
    options::set(&store, Follow::CATEGORY_KEY, &vec![cat(news.term_id, FollowStatus::Nofollow)])
      .await
      .unwrap();
    store
      .set_item_meta(item.item_id, Sitemap::META_KEY, "exclude".into())
      .await
      .unwrap();

    let report = seo_report(&store, item.item_id).await;
    assert_eq!(report.categories, vec![news.term_id]);
    assert_eq!(report.follow.effective.tier, Tier::Category);
    assert_eq!(report.follow.matched_category.as_ref().map(|c| c.id), Some(news.term_id));
    assert_eq!(report.sitemap.effective.value, SitemapStatus::Exclude);
    assert_eq!(report.sitemap.item_override, ItemOverride::Set(SitemapStatus::Exclude));
  }
}
