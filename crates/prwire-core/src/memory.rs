//! In-memory `SiteStore` used by this crate's unit tests.

use std::{collections::HashMap, convert::Infallible, sync::Mutex};

use chrono::{Duration, Utc};

use crate::store::{Category, Item, NewCategory, NewItem, SiteStore};

#[derive(Default)]
struct Inner {
  options:     HashMap<String, serde_json::Value>,
  categories:  Vec<Category>,
  items:       Vec<Item>,
  memberships: HashMap<i64, Vec<i64>>,
  meta:        HashMap<(i64, String), String>,
}

#[derive(Default)]
pub struct MemoryStore {
  inner: Mutex<Inner>,
}

impl MemoryStore {
  fn with<T>(&self, f: impl FnOnce(&mut Inner) -> T) -> T {
    let mut guard = self.inner.lock().unwrap_or_else(|p| p.into_inner());
    f(&mut guard)
  }
}

fn newest_first(mut items: Vec<Item>) -> Vec<Item> {
  items.sort_by(|a, b| b.published_at.cmp(&a.published_at).then(b.item_id.cmp(&a.item_id)));
  items
}

impl SiteStore for MemoryStore {
  type Error = Infallible;

  async fn get_option(&self, name: &str) -> Result<Option<serde_json::Value>, Infallible> {
    Ok(self.with(|s| s.options.get(name).cloned()))
  }

  async fn set_option(&self, name: &str, value: serde_json::Value) -> Result<(), Infallible> {
    self.with(|s| s.options.insert(name.to_owned(), value));
    Ok(())
  }

  async fn add_category(&self, input: NewCategory) -> Result<Category, Infallible> {
    Ok(self.with(|s| {
      let cat = Category {
        term_id: s.categories.len() as i64 + 1,
        slug:    input.slug,
        name:    input.name,
      };
      s.categories.push(cat.clone());
      cat
    }))
  }

  async fn get_category_by_slug(&self, slug: &str) -> Result<Option<Category>, Infallible> {
    Ok(self.with(|s| s.categories.iter().find(|c| c.slug == slug).cloned()))
  }

  async fn search_categories(
    &self,
    fragment: &str,
    limit: usize,
  ) -> Result<Vec<Category>, Infallible> {
    let needle = fragment.to_lowercase();
    Ok(self.with(|s| {
      let mut hits: Vec<Category> = s
        .categories
        .iter()
        .filter(|c| c.name.to_lowercase().contains(&needle))
        .cloned()
        .collect();
      hits.sort_by(|a, b| a.name.cmp(&b.name));
      hits.truncate(limit);
      hits
    }))
  }

  async fn add_item(&self, input: NewItem) -> Result<Item, Infallible> {
    Ok(self.with(|s| {
      let item_id = s.items.len() as i64 + 1;
      // Later items sort as newer.
      let at = Utc::now() + Duration::seconds(item_id);
      let item = Item {
        item_id,
        post_type: input.post_type,
        title: input.title,
        slug: input.slug,
        content: input.content,
        status: input.status,
        author: input.author,
        published_at: at,
        modified_at: at,
      };
      s.items.push(item.clone());
      item
    }))
  }

  async fn get_item(&self, item_id: i64) -> Result<Option<Item>, Infallible> {
    Ok(self.with(|s| s.items.iter().find(|i| i.item_id == item_id).cloned()))
  }

  async fn list_items(&self, post_type: Option<&str>) -> Result<Vec<Item>, Infallible> {
    let items = self.with(|s| {
      s.items
        .iter()
        .filter(|i| post_type.is_none_or(|t| i.post_type == t))
        .cloned()
        .collect()
    });
    Ok(newest_first(items))
  }

  async fn items_in_category(
    &self,
    term_id: i64,
    post_types: &[&str],
  ) -> Result<Vec<Item>, Infallible> {
    let items = self.with(|s| {
      s.items
        .iter()
        .filter(|i| post_types.contains(&i.post_type.as_str()))
        .filter(|i| {
          s.memberships
            .get(&i.item_id)
            .is_some_and(|ids| ids.contains(&term_id))
        })
        .cloned()
        .collect()
    });
    Ok(newest_first(items))
  }

  async fn items_by_author(
    &self,
    author: &str,
    post_types: &[&str],
  ) -> Result<Vec<Item>, Infallible> {
    let items = self.with(|s| {
      s.items
        .iter()
        .filter(|i| i.author == author && post_types.contains(&i.post_type.as_str()))
        .cloned()
        .collect()
    });
    Ok(newest_first(items))
  }

  async fn item_categories(&self, item_id: i64) -> Result<Vec<i64>, Infallible> {
    Ok(self.with(|s| s.memberships.get(&item_id).cloned().unwrap_or_default()))
  }

  async fn set_item_categories(&self, item_id: i64, term_ids: Vec<i64>) -> Result<(), Infallible> {
    self.with(|s| s.memberships.insert(item_id, term_ids));
    Ok(())
  }

  async fn get_item_meta(&self, item_id: i64, key: &str) -> Result<Option<String>, Infallible> {
    Ok(self.with(|s| s.meta.get(&(item_id, key.to_owned())).cloned()))
  }

  async fn set_item_meta(&self, item_id: i64, key: &str, value: String) -> Result<(), Infallible> {
    self.with(|s| s.meta.insert((item_id, key.to_owned()), value));
    Ok(())
  }
}
