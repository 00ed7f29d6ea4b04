//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are fixed-width RFC 3339 strings so they sort lexically.
//! Option values are compact JSON.

use chrono::{DateTime, SecondsFormat, Utc};
use prwire_core::store::{Item, ItemStatus};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── ItemStatus ──────────────────────────────────────────────────────────────

pub fn decode_status(s: &str) -> Result<ItemStatus> {
  s.parse().map_err(|_| Error::Decode { column: "status", value: s.to_owned() })
}

// ─── JSON ────────────────────────────────────────────────────────────────────

pub fn encode_json(v: &serde_json::Value) -> String { v.to_string() }

pub fn decode_json(s: &str) -> Result<serde_json::Value> { Ok(serde_json::from_str(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawItem::from_row`].
pub const ITEM_COLUMNS: &str =
  "item_id, post_type, title, slug, content, status, author, published_at, modified_at";

/// Raw values read directly from an `items` row.
pub struct RawItem {
  pub item_id:      i64,
  pub post_type:    String,
  pub title:        String,
  pub slug:         String,
  pub content:      String,
  pub status:       String,
  pub author:       String,
  pub published_at: String,
  pub modified_at:  String,
}

impl RawItem {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      item_id:      row.get(0)?,
      post_type:    row.get(1)?,
      title:        row.get(2)?,
      slug:         row.get(3)?,
      content:      row.get(4)?,
      status:       row.get(5)?,
      author:       row.get(6)?,
      published_at: row.get(7)?,
      modified_at:  row.get(8)?,
    })
  }

  pub fn into_item(self) -> Result<Item> {
    Ok(Item {
      item_id:      self.item_id,
      status:       decode_status(&self.status)?,
      published_at: decode_dt(&self.published_at)?,
      modified_at:  decode_dt(&self.modified_at)?,
      post_type:    self.post_type,
      title:        self.title,
      slug:         self.slug,
      content:      self.content,
      author:       self.author,
    })
  }
}

/// Escape `%`, `_` and `\` for a `LIKE … ESCAPE '\'` pattern.
pub fn escape_like(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for c in s.chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out
}
