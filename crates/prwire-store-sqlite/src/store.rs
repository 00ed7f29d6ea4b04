//! [`SqliteStore`] — the SQLite implementation of [`SiteStore`].

use std::path::Path;

use chrono::{SubsecRound as _, Utc};
use rusqlite::OptionalExtension as _;

use prwire_core::store::{Category, Item, NewCategory, NewItem, SiteStore};

use crate::{
  Error, Result,
  encode::{ITEM_COLUMNS, RawItem, decode_json, encode_dt, encode_json, escape_like},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A prwire site store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn item_exists(&self, item_id: i64) -> Result<bool> {
    let exists = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM items WHERE item_id = ?1",
              rusqlite::params![item_id],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(exists)
  }

  async fn missing_category(&self, term_ids: Vec<i64>) -> Result<Option<i64>> {
    let missing = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare("SELECT 1 FROM categories WHERE term_id = ?1")?;
        for id in term_ids {
          if !stmt.exists(rusqlite::params![id])? {
            return Ok(Some(id));
          }
        }
        Ok(None)
      })
      .await?;
    Ok(missing)
  }
}

// ─── SiteStore impl ──────────────────────────────────────────────────────────

impl SiteStore for SqliteStore {
  type Error = Error;

  // ── Options ───────────────────────────────────────────────────────────────

  async fn get_option(&self, name: &str) -> Result<Option<serde_json::Value>> {
    let name = name.to_owned();
    let raw: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT value FROM options WHERE name = ?1",
              rusqlite::params![name],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    raw.as_deref().map(decode_json).transpose()
  }

  async fn set_option(&self, name: &str, value: serde_json::Value) -> Result<()> {
    let key = name.to_owned();
    let value = encode_json(&value);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO options (name, value) VALUES (?1, ?2)
           ON CONFLICT(name) DO UPDATE SET value = excluded.value",
          rusqlite::params![key, value],
        )?;
        Ok(())
      })
      .await?;
    tracing::debug!(option = name, "option written");
    Ok(())
  }

  // ── Categories ────────────────────────────────────────────────────────────

  async fn add_category(&self, input: NewCategory) -> Result<Category> {
    let NewCategory { slug, name } = input;
    let category = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO categories (slug, name) VALUES (?1, ?2)",
          rusqlite::params![slug, name],
        )?;
        Ok(Category { term_id: conn.last_insert_rowid(), slug, name })
      })
      .await?;
    Ok(category)
  }

  async fn get_category_by_slug(&self, slug: &str) -> Result<Option<Category>> {
    let slug = slug.to_owned();
    let category = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT term_id, slug, name FROM categories WHERE slug = ?1",
              rusqlite::params![slug],
              |r| Ok(Category { term_id: r.get(0)?, slug: r.get(1)?, name: r.get(2)? }),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(category)
  }

  async fn search_categories(&self, fragment: &str, limit: usize) -> Result<Vec<Category>> {
    let pattern = format!("%{}%", escape_like(fragment));
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let categories = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT term_id, slug, name FROM categories
           WHERE name LIKE ?1 ESCAPE '\\'
           ORDER BY name, term_id
           LIMIT ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![pattern, limit], |r| {
            Ok(Category { term_id: r.get(0)?, slug: r.get(1)?, name: r.get(2)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(categories)
  }

  // ── Items ─────────────────────────────────────────────────────────────────

  async fn add_item(&self, input: NewItem) -> Result<Item> {
    let now = Utc::now().trunc_subsecs(6);
    let item = Item {
      item_id:      0,
      post_type:    input.post_type,
      title:        input.title,
      slug:         input.slug,
      content:      input.content,
      status:       input.status,
      author:       input.author,
      published_at: now,
      modified_at:  now,
    };

    let post_type = item.post_type.clone();
    let title     = item.title.clone();
    let slug      = item.slug.clone();
    let content   = item.content.clone();
    let status    = item.status.as_ref().to_owned();
    let author    = item.author.clone();
    let at        = encode_dt(now);

    let item_id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO items (
             post_type, title, slug, content, status, author, published_at, modified_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
          rusqlite::params![post_type, title, slug, content, status, author, at],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Item { item_id, ..item })
  }

  async fn get_item(&self, item_id: i64) -> Result<Option<Item>> {
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {ITEM_COLUMNS} FROM items WHERE item_id = ?1"),
              rusqlite::params![item_id],
              RawItem::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawItem::into_item).transpose()
  }

  async fn list_items(&self, post_type: Option<&str>) -> Result<Vec<Item>> {
    let post_type = post_type.map(str::to_owned);
    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ITEM_COLUMNS} FROM items
           WHERE ?1 IS NULL OR post_type = ?1
           ORDER BY published_at DESC, item_id DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![post_type], RawItem::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawItem::into_item).collect()
  }

  async fn items_in_category(&self, term_id: i64, post_types: &[&str]) -> Result<Vec<Item>> {
    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ITEM_COLUMNS} FROM items
           WHERE item_id IN (SELECT item_id FROM item_categories WHERE term_id = ?1)
           ORDER BY published_at DESC, item_id DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![term_id], RawItem::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws
      .into_iter()
      .filter(|r| post_types.contains(&r.post_type.as_str()))
      .map(RawItem::into_item)
      .collect()
  }

  async fn items_by_author(&self, author: &str, post_types: &[&str]) -> Result<Vec<Item>> {
    let author = author.to_owned();
    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ITEM_COLUMNS} FROM items
           WHERE author = ?1
           ORDER BY published_at DESC, item_id DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![author], RawItem::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws
      .into_iter()
      .filter(|r| post_types.contains(&r.post_type.as_str()))
      .map(RawItem::into_item)
      .collect()
  }

  async fn item_categories(&self, item_id: i64) -> Result<Vec<i64>> {
    let ids = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT term_id FROM item_categories WHERE item_id = ?1 ORDER BY term_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![item_id], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(ids)
  }

  async fn set_item_categories(&self, item_id: i64, term_ids: Vec<i64>) -> Result<()> {
    if !self.item_exists(item_id).await? {
      return Err(Error::ItemNotFound(item_id));
    }
    if let Some(missing) = self.missing_category(term_ids.clone()).await? {
      return Err(Error::CategoryNotFound(missing));
    }

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM item_categories WHERE item_id = ?1",
          rusqlite::params![item_id],
        )?;
        {
          let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO item_categories (item_id, term_id) VALUES (?1, ?2)",
          )?;
          for term_id in term_ids {
            stmt.execute(rusqlite::params![item_id, term_id])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Item metadata ─────────────────────────────────────────────────────────

  async fn get_item_meta(&self, item_id: i64, key: &str) -> Result<Option<String>> {
    let key = key.to_owned();
    let value = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT meta_value FROM item_meta WHERE item_id = ?1 AND meta_key = ?2",
              rusqlite::params![item_id, key],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(value)
  }

  async fn set_item_meta(&self, item_id: i64, key: &str, value: String) -> Result<()> {
    if !self.item_exists(item_id).await? {
      return Err(Error::ItemNotFound(item_id));
    }
    let key = key.to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO item_meta (item_id, meta_key, meta_value) VALUES (?1, ?2, ?3)
           ON CONFLICT(item_id, meta_key) DO UPDATE SET meta_value = excluded.meta_value",
          rusqlite::params![item_id, key, value],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
