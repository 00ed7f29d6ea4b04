//! Toggleable site behaviours.
//!
//! Each snippet's enabled state is a boolean option keyed by the snippet id.

use serde::Serialize;

use crate::{
  Error, Result,
  options::{self, keys},
  setting::SaveOutcome,
  store::{Category, Item, POST, PRESS_RELEASE, SiteStore},
};

pub const DISABLE_RSS_CACHING: &str = "disable_rss_caching";
pub const CATEGORY_ARCHIVES: &str = "add_press_release_to_category_archives";
pub const AUTHOR_ARCHIVES: &str = "add_press_release_to_author_page";
pub const NEW_POST_CATEGORY: &str = "enable_press_release_category_on_new_post";

/// A registered snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Snippet {
  pub id:          &'static str,
  pub name:        &'static str,
  pub description: &'static str,
  pub category:    &'static str,
}

pub const REGISTRY: &[Snippet] = &[
  Snippet {
    id:          CATEGORY_ARCHIVES,
    name:        "Add Press Release to Category Archives",
    description: "Include press-release items in category archive listings.",
    category:    "display",
  },
  Snippet {
    id:          AUTHOR_ARCHIVES,
    name:        "Add Press Release to Author Page",
    description: "Include press-release items on author archive pages.",
    category:    "display",
  },
  Snippet {
    id:          NEW_POST_CATEGORY,
    name:        "Enable Press Release Category on New Post",
    description: "Assign the press-release category to newly created press releases.",
    category:    "automation",
  },
  Snippet {
    id:          DISABLE_RSS_CACHING,
    name:        "Disable RSS Feed Caching",
    description: "Send no-cache headers on the feed so caches always serve fresh data.",
    category:    "performance",
  },
];

pub fn find(id: &str) -> Option<&'static Snippet> { REGISTRY.iter().find(|s| s.id == id) }

#[derive(Debug, Clone, Serialize)]
pub struct SnippetState {
  #[serde(flatten)]
  pub snippet: Snippet,
  pub enabled: bool,
}

pub async fn is_enabled<S: SiteStore>(store: &S, id: &str) -> bool {
  options::get_or(store, id, false).await
}

pub async fn list<S: SiteStore>(store: &S) -> Vec<SnippetState> {
  let mut out = Vec::with_capacity(REGISTRY.len());
  for snippet in REGISTRY {
    out.push(SnippetState { snippet: *snippet, enabled: is_enabled(store, snippet.id).await });
  }
  out
}

/// Enable or disable a snippet by id.
pub async fn toggle_snippet<S: SiteStore>(
  store: &S,
  id: &str,
  enable: bool,
) -> Result<SaveOutcome> {
  let snippet = find(id).ok_or_else(|| Error::NotFound(format!("snippet {id}")))?;
  if is_enabled(store, snippet.id).await == enable {
    return Ok(SaveOutcome::Unchanged);
  }
  options::set(store, snippet.id, &enable).await?;
  tracing::info!(snippet = snippet.id, enable, "snippet toggled");
  Ok(SaveOutcome::Saved)
}

// ─── Category archives ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct CategoryArchive {
  pub category: Category,
  pub items:    Vec<Item>,
}

/// Published items in the category with the given slug. Press releases are
/// listed only while the archive snippet is enabled.
pub async fn category_archive<S: SiteStore>(store: &S, slug: &str) -> Result<CategoryArchive> {
  let category = store
    .get_category_by_slug(slug)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::NotFound(format!("category {slug}")))?;

  let types: &[&str] = if is_enabled(store, CATEGORY_ARCHIVES).await {
    &[POST, PRESS_RELEASE]
  } else {
    &[POST]
  };

  let items = store
    .items_in_category(category.term_id, types)
    .await
    .map_err(Error::store)?
    .into_iter()
    .filter(Item::is_published)
    .collect();

  Ok(CategoryArchive { category, items })
}

// ─── Author archives ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct AuthorArchive {
  pub author: String,
  pub items:  Vec<Item>,
}

/// Published items by the author with the given slug. Press releases are
/// listed only while [`AUTHOR_ARCHIVES`] is enabled. An author with no items
/// of either type is not found.
pub async fn author_archive<S: SiteStore>(store: &S, author: &str) -> Result<AuthorArchive> {
  let all = store
    .items_by_author(author, &[POST, PRESS_RELEASE])
    .await
    .map_err(Error::store)?;
  if all.is_empty() {
    return Err(Error::NotFound(format!("author {author}")));
  }

  let with_releases = is_enabled(store, AUTHOR_ARCHIVES).await;
  let items = all
    .into_iter()
    .filter(|i| with_releases || !i.is_press_release())
    .filter(Item::is_published)
    .collect();

  Ok(AuthorArchive { author: author.to_owned(), items })
}

// ─── Feed caching ────────────────────────────────────────────────────────────

/// Response headers sent on the feed while [`DISABLE_RSS_CACHING`] is on.
pub const NOCACHE_HEADERS: &[(&str, &str)] = &[
  ("cache-control", "no-cache, no-store, must-revalidate, max-age=0"),
  ("pragma", "no-cache"),
  ("expires", "Wed, 11 Jan 1984 05:00:00 GMT"),
  ("x-accel-expires", "0"),
  ("x-litespeed-cache-control", "no-cache"),
  ("surrogate-control", "no-store"),
];

const FEED_EXCLUSIONS: &[&str] = &[
  "/feed",
  "/feed/",
  "/feed/*",
  "*/feed",
  "*/feed/",
  "/rss",
  "/rss/",
  "/atom",
  "/atom/",
  "/rdf",
  "/rdf/",
  "/internal-rss",
  "/internal-rss/",
];

/// Extend a page-cache exclusion list with the feed paths, keeping the
/// existing entries first and dropping duplicates.
pub fn litespeed_exclusions(existing: &[String]) -> Vec<String> {
  let mut out: Vec<String> = Vec::with_capacity(existing.len() + FEED_EXCLUSIONS.len());
  for path in existing.iter().map(String::as_str).chain(FEED_EXCLUSIONS.iter().copied()) {
    if !out.iter().any(|p| p == path) {
      out.push(path.to_owned());
    }
  }
  out
}

/// The effective page-cache exclusion list: the stored list, extended with
/// the feed paths while [`DISABLE_RSS_CACHING`] is on.
pub async fn cache_exclusions<S: SiteStore>(store: &S) -> Vec<String> {
  let existing: Vec<String> = options::get_or(store, keys::CACHE_EXCLUDES, Vec::new()).await;
  if is_enabled(store, DISABLE_RSS_CACHING).await {
    litespeed_exclusions(&existing)
  } else {
    existing
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{memory::MemoryStore, store::{NewCategory, NewItem}};

  #[tokio::test]
  async fn toggle_reports_unchanged_and_unknown() {
    let store = MemoryStore::default();
    assert_eq!(
      toggle_snippet(&store, DISABLE_RSS_CACHING, true).await.unwrap(),
      SaveOutcome::Saved
    );
    assert_eq!(
      toggle_snippet(&store, DISABLE_RSS_CACHING, true).await.unwrap(),
      SaveOutcome::Unchanged
    );
    assert!(is_enabled(&store, DISABLE_RSS_CACHING).await);

    let err = toggle_snippet(&store, "nope", true).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
  }

  #[tokio::test]
  async fn list_covers_registry() {
    let store = MemoryStore::default();
    let states = list(&store).await;
    assert_eq!(states.len(), REGISTRY.len());
    assert!(states.iter().all(|s| !s.enabled));
  }

  #[tokio::test]
  async fn archive_includes_press_releases_only_when_enabled() {
    let store = MemoryStore::default();
    let news = store.add_category(NewCategory::named("News")).await.unwrap();
    let post = store.add_item(NewItem::post("P", "")).await.unwrap();
    let pr = store.add_item(NewItem::press_release("R", "")).await.unwrap();
    store.set_item_categories(post.item_id, vec![news.term_id]).await.unwrap();
    store.set_item_categories(pr.item_id, vec![news.term_id]).await.unwrap();

    let ids = |a: CategoryArchive| a.items.iter().map(|i| i.item_id).collect::<Vec<_>>();

    assert_eq!(ids(category_archive(&store, "news").await.unwrap()), vec![post.item_id]);

    toggle_snippet(&store, CATEGORY_ARCHIVES, true).await.unwrap();
    assert_eq!(
      ids(category_archive(&store, "news").await.unwrap()),
      vec![pr.item_id, post.item_id]
    );

    assert!(matches!(
      category_archive(&store, "missing").await,
      Err(Error::NotFound(_))
    ));
  }

  #[tokio::test]
  async fn author_page_includes_press_releases_only_when_enabled() {
    let store = MemoryStore::default();
    let post = store.add_item(NewItem::post("P", "").by("jane")).await.unwrap();
    let pr = store.add_item(NewItem::press_release("R", "").by("jane")).await.unwrap();
    store.add_item(NewItem::post("Elsewhere", "").by("sam")).await.unwrap();

    let ids = |a: AuthorArchive| a.items.iter().map(|i| i.item_id).collect::<Vec<_>>();

    assert_eq!(ids(author_archive(&store, "jane").await.unwrap()), vec![post.item_id]);

    toggle_snippet(&store, AUTHOR_ARCHIVES, true).await.unwrap();
    assert_eq!(
      ids(author_archive(&store, "jane").await.unwrap()),
      vec![pr.item_id, post.item_id]
    );

    assert!(matches!(
      author_archive(&store, "nobody").await,
      Err(Error::NotFound(_))
    ));
  }

  #[tokio::test]
  async fn author_with_only_releases_has_an_empty_page() {
    let store = MemoryStore::default();
    store.add_item(NewItem::press_release("R", "").by("wire")).await.unwrap();

    let archive = author_archive(&store, "wire").await.unwrap();
    assert_eq!(archive.author, "wire");
    assert!(archive.items.is_empty());
  }

  #[test]
  fn exclusions_are_deduplicated() {
    let out = litespeed_exclusions(&["/cart".to_owned(), "/feed".to_owned()]);
    assert_eq!(out[0], "/cart");
    assert_eq!(out.iter().filter(|p| *p == "/feed").count(), 1);
    assert!(out.iter().any(|p| p == "/internal-rss/"));
  }

  #[tokio::test]
  async fn feed_paths_are_excluded_only_while_enabled() {
    let store = MemoryStore::default();
    options::set(&store, keys::CACHE_EXCLUDES, &vec!["/cart"]).await.unwrap();
    assert_eq!(cache_exclusions(&store).await, vec!["/cart"]);

    toggle_snippet(&store, DISABLE_RSS_CACHING, true).await.unwrap();
    let out = cache_exclusions(&store).await;
    assert_eq!(out[0], "/cart");
    assert!(out.iter().any(|p| p == "/feed/*"));
  }
}
