//! Markup codecs for prwire.
//!
//! Anchor `rel` rewriting for press-release content, and XML generation for
//! the sitemap and the RSS feed. Pure synchronous; no HTTP or database
//! dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use prwire_core::status::FollowStatus;
//! use prwire_markup::{LinkEngine, links::apply_follow};
//!
//! let html = r#"<p><a href="https://example.com">x</a></p>"#;
//! let out = apply_follow(html, FollowStatus::Nofollow, LinkEngine::Markup);
//! assert!(out.contains(r#"rel="nofollow""#));
//! ```

pub mod error;
pub mod feed;
pub mod links;
pub mod rel_tokens;
pub mod sitemap;

pub use error::{Error, Result};
pub use links::LinkEngine;
