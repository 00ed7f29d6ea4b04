//! Error types for the prwire-markup codecs.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("XML error: {0}")]
  Xml(#[from] quick_xml::Error),

  #[error("malformed attribute: {0}")]
  Attribute(#[from] quick_xml::events::attributes::AttrError),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("output is not UTF-8: {0}")]
  Utf8(#[from] std::string::FromUtf8Error),

  #[error("attribute value is not UTF-8: {0}")]
  Utf8Str(#[from] std::str::Utf8Error),

  #[error("pattern error: {0}")]
  Pattern(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
