//! Creating content: new items and the press-release category.

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  setting::SaveOutcome,
  snippets::{self, NEW_POST_CATEGORY},
  store::{Category, Item, ItemStatus, NewCategory, NewItem, PRESS_RELEASE, SiteStore, slugify},
};

/// Slug of the category that marks press releases.
pub const PRESS_RELEASE_CATEGORY: &str = "press-release";
pub const PRESS_RELEASE_CATEGORY_NAME: &str = "Press Release";

// ─── Items ───────────────────────────────────────────────────────────────────

/// An item as submitted for creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItemInput {
  #[serde(default = "default_post_type")]
  pub post_type:  String,
  pub title:      String,
  /// Derived from the title when absent or blank.
  #[serde(default)]
  pub slug:       Option<String>,
  #[serde(default)]
  pub content:    String,
  #[serde(default = "default_status")]
  pub status:     ItemStatus,
  #[serde(default)]
  pub author:     String,
  #[serde(default)]
  pub categories: Vec<i64>,
}

fn default_post_type() -> String { PRESS_RELEASE.to_owned() }

fn default_status() -> ItemStatus { ItemStatus::Publish }

impl NewItemInput {
  fn into_parts(self) -> (NewItem, Vec<i64>) {
    let slug = match self.slug.as_deref().map(slugify) {
      Some(s) if !s.is_empty() => s,
      _ => slugify(&self.title),
    };
    let item = NewItem {
      post_type: self.post_type.trim().to_owned(),
      title: self.title,
      slug,
      content: self.content,
      status: self.status,
      author: slugify(&self.author),
    };
    (item, self.categories)
  }
}

/// Store a new item and its category memberships.
///
/// While [`NEW_POST_CATEGORY`] is enabled, a new press release is also
/// assigned to the press-release category if that category exists.
pub async fn create_item<S: SiteStore>(store: &S, input: NewItemInput) -> Result<Item> {
  let (new_item, mut categories) = input.into_parts();
  let item = store.add_item(new_item).await.map_err(Error::store)?;

  if item.is_press_release() && snippets::is_enabled(store, NEW_POST_CATEGORY).await {
    match store
      .get_category_by_slug(PRESS_RELEASE_CATEGORY)
      .await
      .map_err(Error::store)?
    {
      Some(cat) if !categories.contains(&cat.term_id) => categories.push(cat.term_id),
      Some(_) => {}
      None => tracing::warn!(item_id = item.item_id, "no press-release category to assign"),
    }
  }

  if !categories.is_empty() {
    store
      .set_item_categories(item.item_id, categories)
      .await
      .map_err(Error::store)?;
  }

  tracing::info!(item_id = item.item_id, post_type = %item.post_type, "item created");
  Ok(item)
}

// ─── Press-release category ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnsuredCategory {
  /// `unchanged` when the category already existed.
  pub status:   SaveOutcome,
  pub category: Category,
}

/// Create the press-release category unless it already exists.
pub async fn ensure_press_release_category<S: SiteStore>(store: &S) -> Result<EnsuredCategory> {
  let existing = store
    .get_category_by_slug(PRESS_RELEASE_CATEGORY)
    .await
    .map_err(Error::store)?;
  if let Some(category) = existing {
    tracing::debug!(term_id = category.term_id, "press-release category already exists");
    return Ok(EnsuredCategory { status: SaveOutcome::Unchanged, category });
  }

  let category = store
    .add_category(NewCategory {
      slug: PRESS_RELEASE_CATEGORY.to_owned(),
      name: PRESS_RELEASE_CATEGORY_NAME.to_owned(),
    })
    .await
    .map_err(Error::store)?;
  tracing::info!(term_id = category.term_id, "press-release category created");
  Ok(EnsuredCategory { status: SaveOutcome::Saved, category })
}
