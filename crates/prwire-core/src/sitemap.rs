//! Entry selection for the generated sitemap and the RSS feed.
//!
//! Press releases whose resolved sitemap status is `exclude` are left out
//! of the sitemap. The feed never consults the resolver.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
  Error, Result,
  resolve,
  setting::Sitemap,
  status::SitemapStatus,
  store::{Item, PRESS_RELEASE, SiteStore},
};

/// One `<url>` of the sitemap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SitemapEntry {
  pub item_id: i64,
  pub loc:     String,
  pub lastmod: DateTime<Utc>,
}

/// One `<item>` of the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedEntry {
  pub item_id:     i64,
  pub title:       String,
  pub link:        String,
  pub pub_date:    DateTime<Utc>,
  pub description: String,
}

/// Public URL of an item.
pub fn item_url(site_url: &str, item: &Item) -> String {
  format!("{}/items/{}", site_url.trim_end_matches('/'), item.item_id)
}

async fn published<S: SiteStore>(store: &S) -> Result<Vec<Item>> {
  let items = store.list_items(None).await.map_err(Error::store)?;
  Ok(items.into_iter().filter(Item::is_published).collect())
}

/// Whether `item` belongs in the sitemap. Only press releases are filtered.
pub async fn in_sitemap<S: SiteStore>(store: &S, item: &Item) -> bool {
  if !item.is_press_release() {
    return true;
  }
  let r = resolve::resolve::<Sitemap, S>(store, item.item_id).await;
  if r.value == SitemapStatus::Exclude {
    tracing::debug!(item_id = item.item_id, tier = %r.tier, "omitted from sitemap");
    return false;
  }
  true
}

/// Sitemap entries for every published item, minus excluded press releases.
pub async fn sitemap_entries<S: SiteStore>(store: &S, site_url: &str) -> Result<Vec<SitemapEntry>> {
  let mut entries = Vec::new();
  for item in published(store).await? {
    if in_sitemap(store, &item).await {
      entries.push(SitemapEntry {
        item_id: item.item_id,
        loc:     item_url(site_url, &item),
        lastmod: item.modified_at,
      });
    }
  }
  Ok(entries)
}

/// Feed entries for every published press release. Sitemap exclusions do
/// not apply.
pub async fn feed_entries<S: SiteStore>(store: &S, site_url: &str) -> Result<Vec<FeedEntry>> {
  let releases = store.list_items(Some(PRESS_RELEASE)).await.map_err(Error::store)?;
  Ok(
    releases
      .into_iter()
      .filter(Item::is_published)
      .map(|item| FeedEntry {
        item_id:     item.item_id,
        link:        item_url(site_url, &item),
        title:       item.title,
        pub_date:    item.published_at,
        description: item.content,
      })
      .collect(),
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    memory::MemoryStore,
    options,
    setting::{CategoryOverride, Setting},
    store::{ItemStatus, NewCategory, NewItem},
  };

  #[tokio::test]
  async fn excluded_item_is_still_in_feed() {
    let store = MemoryStore::default();
    let kept = store.add_item(NewItem::press_release("Kept", "")).await.unwrap();
    let hidden = store.add_item(NewItem::press_release("Hidden", "")).await.unwrap();
    store
      .set_item_meta(hidden.item_id, Sitemap::META_KEY, "exclude".into())
      .await
      .unwrap();

    let sitemap: Vec<i64> = sitemap_entries(&store, "https://example.com")
      .await
      .unwrap()
      .iter()
      .map(|e| e.item_id)
      .collect();
    assert_eq!(sitemap, vec![kept.item_id]);

    let feed: Vec<i64> = feed_entries(&store, "https://example.com")
      .await
      .unwrap()
      .iter()
      .map(|e| e.item_id)
      .collect();
    assert!(feed.contains(&hidden.item_id));
    assert!(feed.contains(&kept.item_id));
  }

  #[tokio::test]
  async fn feed_lists_press_releases_only() {
    let store = MemoryStore::default();
    let post = store.add_item(NewItem::post("Post", "")).await.unwrap();
    let release = store.add_item(NewItem::press_release("Release", "")).await.unwrap();

    let feed: Vec<i64> = feed_entries(&store, "https://example.com")
      .await
      .unwrap()
      .iter()
      .map(|e| e.item_id)
      .collect();
    assert_eq!(feed, vec![release.item_id]);
    assert!(!feed.contains(&post.item_id));
  }

  #[tokio::test]
  async fn item_exclude_beats_include_everywhere_else() {
    let store = MemoryStore::default();
    let news = store.add_category(NewCategory::named("News")).await.unwrap();
    let item = store.add_item(NewItem::press_release("A", "")).await.unwrap();
    store.set_item_categories(item.item_id, vec![news.term_id]).await.unwrap();
    options::set(&store, Sitemap::GLOBAL_KEY, &SitemapStatus::Include).await.unwrap();
    options::set(
      &store,
      Sitemap::CATEGORY_KEY,
      &vec![CategoryOverride {
        id:     news.term_id,
        slug:   news.slug.clone(),
        name:   news.name.clone(),
        status: SitemapStatus::Include,
      }],
    )
    .await
    .unwrap();
    store
      .set_item_meta(item.item_id, Sitemap::META_KEY, "exclude".into())
      .await
      .unwrap();

    assert!(sitemap_entries(&store, "https://x").await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn ordinary_posts_ignore_global_exclude() {
    let store = MemoryStore::default();
    let post = store.add_item(NewItem::post("P", "")).await.unwrap();
    store.add_item(NewItem::press_release("R", "")).await.unwrap();
    options::set(&store, Sitemap::GLOBAL_KEY, &SitemapStatus::Exclude).await.unwrap();

    let entries = sitemap_entries(&store, "https://example.com/").await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].loc, format!("https://example.com/items/{}", post.item_id));
  }

  #[tokio::test]
  async fn drafts_are_never_listed() {
    let store = MemoryStore::default();
    let mut draft = NewItem::press_release("D", "");
    draft.status = ItemStatus::Draft;
    store.add_item(draft).await.unwrap();

    assert!(sitemap_entries(&store, "https://x").await.unwrap().is_empty());
    assert!(feed_entries(&store, "https://x").await.unwrap().is_empty());
  }
}
