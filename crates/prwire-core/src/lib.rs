//! Core types and trait definitions for the prwire press-release toolkit.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; storage backends implement
//! [`store::SiteStore`] and everything above that talks to the trait.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod content;
pub mod defaults;
pub mod error;
pub mod links;
#[cfg(test)]
pub(crate) mod memory;
pub mod options;
pub mod rankmath;
pub mod resolve;
pub mod setting;
pub mod sitemap;
pub mod snippets;
pub mod status;
pub mod store;

pub use error::{Error, Result};
