//! The `SiteStore` trait and the content types it persists.
//!
//! The trait is implemented by storage backends (e.g. `prwire-store-sqlite`).
//! Higher layers (`prwire-api`, the resolver, the sitemap builder) depend on
//! this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Post type of press releases.
pub const PRESS_RELEASE: &str = "press-release";
/// Post type of ordinary posts.
pub const POST: &str = "post";

// ─── Content types ───────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ItemStatus {
  Publish,
  Draft,
}

/// A content item (post or press release).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
  pub item_id:      i64,
  pub post_type:    String,
  pub title:        String,
  pub slug:         String,
  /// Rendered HTML body.
  pub content:      String,
  pub status:       ItemStatus,
  /// Author slug; empty when the item has no author.
  pub author:       String,
  pub published_at: DateTime<Utc>,
  pub modified_at:  DateTime<Utc>,
}

impl Item {
  pub fn is_press_release(&self) -> bool { self.post_type == PRESS_RELEASE }

  pub fn is_published(&self) -> bool { self.status == ItemStatus::Publish }
}

/// Input for [`SiteStore::add_item`]; timestamps are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItem {
  pub post_type: String,
  pub title:     String,
  pub slug:      String,
  pub content:   String,
  pub status:    ItemStatus,
  #[serde(default)]
  pub author:    String,
}

impl NewItem {
  /// A published press release with the given title and body.
  pub fn press_release(title: impl Into<String>, content: impl Into<String>) -> Self {
    let title = title.into();
    let slug = slugify(&title);
    Self {
      post_type: PRESS_RELEASE.to_owned(),
      title,
      slug,
      content: content.into(),
      status: ItemStatus::Publish,
      author: String::new(),
    }
  }

  /// A published ordinary post.
  pub fn post(title: impl Into<String>, content: impl Into<String>) -> Self {
    Self { post_type: POST.to_owned(), ..Self::press_release(title, content) }
  }

  /// Attribute the item to the author with the given slug.
  pub fn by(mut self, author: impl Into<String>) -> Self {
    self.author = author.into();
    self
  }
}

/// A category term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
  pub term_id: i64,
  pub slug:    String,
  pub name:    String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategory {
  pub slug: String,
  pub name: String,
}

impl NewCategory {
  pub fn named(name: impl Into<String>) -> Self {
    let name = name.into();
    Self { slug: slugify(&name), name }
  }
}

/// Lowercase, ASCII-alphanumeric words joined by `-`.
pub fn slugify(s: &str) -> String {
  s.split(|c: char| !c.is_ascii_alphanumeric())
    .filter(|w| !w.is_empty())
    .map(str::to_ascii_lowercase)
    .collect::<Vec<_>>()
    .join("-")
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a prwire site backend: the plugin-wide option table,
/// content items, category terms and per-item metadata.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait SiteStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Options ───────────────────────────────────────────────────────────

  /// Read a named option. Returns `None` if it has never been set.
  fn get_option<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<serde_json::Value>, Self::Error>> + Send + 'a;

  /// Create or replace a named option.
  fn set_option<'a>(
    &'a self,
    name: &'a str,
    value: serde_json::Value,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Categories ────────────────────────────────────────────────────────

  fn add_category(
    &self,
    input: NewCategory,
  ) -> impl Future<Output = Result<Category, Self::Error>> + Send + '_;

  fn get_category_by_slug<'a>(
    &'a self,
    slug: &'a str,
  ) -> impl Future<Output = Result<Option<Category>, Self::Error>> + Send + 'a;

  /// Categories whose name contains `fragment` (case-insensitive), ordered
  /// by name, at most `limit` of them.
  fn search_categories<'a>(
    &'a self,
    fragment: &'a str,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Category>, Self::Error>> + Send + 'a;

  // ── Items ─────────────────────────────────────────────────────────────

  fn add_item(
    &self,
    input: NewItem,
  ) -> impl Future<Output = Result<Item, Self::Error>> + Send + '_;

  /// Retrieve an item by id. Returns `None` if not found.
  fn get_item(
    &self,
    item_id: i64,
  ) -> impl Future<Output = Result<Option<Item>, Self::Error>> + Send + '_;

  /// List items, newest first, optionally restricted to one post type.
  fn list_items<'a>(
    &'a self,
    post_type: Option<&'a str>,
  ) -> impl Future<Output = Result<Vec<Item>, Self::Error>> + Send + 'a;

  /// Items assigned to `term_id` whose post type is one of `post_types`,
  /// newest first.
  fn items_in_category<'a>(
    &'a self,
    term_id: i64,
    post_types: &'a [&'a str],
  ) -> impl Future<Output = Result<Vec<Item>, Self::Error>> + Send + 'a;

  /// Items by the author with slug `author` whose post type is one of
  /// `post_types`, newest first.
  fn items_by_author<'a>(
    &'a self,
    author: &'a str,
    post_types: &'a [&'a str],
  ) -> impl Future<Output = Result<Vec<Item>, Self::Error>> + Send + 'a;

  /// Category ids the item belongs to.
  fn item_categories(
    &self,
    item_id: i64,
  ) -> impl Future<Output = Result<Vec<i64>, Self::Error>> + Send + '_;

  /// Replace the item's category memberships.
  fn set_item_categories(
    &self,
    item_id: i64,
    term_ids: Vec<i64>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Item metadata ─────────────────────────────────────────────────────

  fn get_item_meta<'a>(
    &'a self,
    item_id: i64,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  fn set_item_meta<'a>(
    &'a self,
    item_id: i64,
    key: &'a str,
    value: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn slugify_collapses_punctuation() {
    assert_eq!(slugify("Press Release"), "press-release");
    assert_eq!(slugify("  ACME, Inc. -- Q3 Results! "), "acme-inc-q3-results");
  }

  #[test]
  fn new_post_keeps_title_and_slug() {
    let item = NewItem::post("Hello World", "<p>x</p>");
    assert_eq!(item.post_type, POST);
    assert_eq!(item.slug, "hello-world");
    assert!(item.author.is_empty());
    assert_eq!(item.by("jane-doe").author, "jane-doe");
  }
}
