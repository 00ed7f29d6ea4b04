//! SQL schema for the prwire SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Plugin-wide options. Values are JSON.
CREATE TABLE IF NOT EXISTS options (
    name   TEXT PRIMARY KEY,
    value  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS categories (
    term_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    slug     TEXT NOT NULL UNIQUE,
    name     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS items (
    item_id       INTEGER PRIMARY KEY AUTOINCREMENT,
    post_type     TEXT NOT NULL,   -- 'press-release' | 'post' | ...
    title         TEXT NOT NULL,
    slug          TEXT NOT NULL,
    content       TEXT NOT NULL,
    status        TEXT NOT NULL,   -- 'publish' | 'draft'
    author        TEXT NOT NULL DEFAULT '',  -- author slug
    published_at  TEXT NOT NULL,   -- RFC 3339 UTC, fixed width
    modified_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS item_categories (
    item_id  INTEGER NOT NULL REFERENCES items(item_id),
    term_id  INTEGER NOT NULL REFERENCES categories(term_id),
    PRIMARY KEY (item_id, term_id)
);

-- Per-item metadata; plain text values.
CREATE TABLE IF NOT EXISTS item_meta (
    item_id     INTEGER NOT NULL REFERENCES items(item_id),
    meta_key    TEXT NOT NULL,
    meta_value  TEXT NOT NULL,
    PRIMARY KEY (item_id, meta_key)
);

CREATE INDEX IF NOT EXISTS items_type_idx      ON items(post_type);
CREATE INDEX IF NOT EXISTS items_published_idx ON items(published_at);
CREATE INDEX IF NOT EXISTS items_author_idx    ON items(author);
CREATE INDEX IF NOT EXISTS item_categories_term_idx ON item_categories(term_id);

PRAGMA user_version = 1;
";
