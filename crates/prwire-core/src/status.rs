//! Status enums for the two SEO setting categories and the per-item
//! override wrapper.
//!
//! All values are stored as lowercase strings, both in options (JSON) and in
//! item metadata (plain text).

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

// ─── Follow ──────────────────────────────────────────────────────────────────

/// How outbound anchors in press-release content are treated.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FollowStatus {
  /// Strip `nofollow` from every anchor's `rel`.
  #[default]
  Dofollow,
  /// Ensure every anchor's `rel` carries `nofollow`.
  Nofollow,
  /// Leave content untouched.
  Default,
}

// ─── Sitemap ─────────────────────────────────────────────────────────────────

/// Whether an item is listed in the generated sitemap.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SitemapStatus {
  #[default]
  Include,
  Exclude,
}

// ─── Item override ───────────────────────────────────────────────────────────

/// The sentinel stored in item metadata meaning "defer to the next tier".
pub const INHERIT: &str = "inherit";

/// A per-item override: either an explicit value or the inherit sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemOverride<V> {
  #[default]
  Inherit,
  Set(V),
}

impl<V: FromStr> ItemOverride<V> {
  /// Interpret a raw metadata value.
  ///
  /// A missing key, the empty string, `inherit`, and anything that does not
  /// parse as `V` all mean [`ItemOverride::Inherit`].
  pub fn parse(raw: Option<&str>) -> Self {
    match raw.map(str::trim) {
      None | Some("") | Some(INHERIT) => Self::Inherit,
      Some(s) => match s.parse() {
        Ok(v) => Self::Set(v),
        Err(_) => {
          tracing::debug!(value = s, "unrecognised item override; inheriting");
          Self::Inherit
        }
      },
    }
  }
}

/// Strict parse: `inherit` or a valid `V`, anything else is an error.
impl<V: FromStr> FromStr for ItemOverride<V> {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim() {
      INHERIT => Ok(Self::Inherit),
      v => v.parse().map(Self::Set).map_err(|_| format!("unrecognised value `{v}`")),
    }
  }
}

impl<V> ItemOverride<V> {
  pub fn value(&self) -> Option<&V> {
    match self {
      Self::Inherit => None,
      Self::Set(v) => Some(v),
    }
  }
}

impl<V: AsRef<str>> ItemOverride<V> {
  /// The string written to item metadata.
  pub fn as_meta(&self) -> &str {
    match self {
      Self::Inherit => INHERIT,
      Self::Set(v) => v.as_ref(),
    }
  }
}

impl<V: Serialize> Serialize for ItemOverride<V> {
  fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
    match self {
      Self::Inherit => s.serialize_str(INHERIT),
      Self::Set(v) => v.serialize(s),
    }
  }
}

impl<'de, V: FromStr> Deserialize<'de> for ItemOverride<V> {
  fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
    let raw = String::deserialize(d)?;
    Ok(Self::parse(Some(&raw)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn follow_status_round_trips_through_strings() {
    assert_eq!(FollowStatus::Nofollow.to_string(), "nofollow");
    assert_eq!("dofollow".parse::<FollowStatus>().unwrap(), FollowStatus::Dofollow);
    assert_eq!("default".parse::<FollowStatus>().unwrap(), FollowStatus::Default);
    assert!("sponsored".parse::<FollowStatus>().is_err());
  }

  #[test]
  fn sitemap_status_serde_is_lowercase() {
    let json = serde_json::to_string(&SitemapStatus::Exclude).unwrap();
    assert_eq!(json, "\"exclude\"");
  }

  #[test]
  fn inherit_sentinels() {
    assert_eq!(ItemOverride::<FollowStatus>::parse(None), ItemOverride::Inherit);
    assert_eq!(ItemOverride::<FollowStatus>::parse(Some("")), ItemOverride::Inherit);
    assert_eq!(
      ItemOverride::<FollowStatus>::parse(Some("inherit")),
      ItemOverride::Inherit
    );
    assert_eq!(
      ItemOverride::<FollowStatus>::parse(Some("garbage")),
      ItemOverride::Inherit
    );
  }

  #[test]
  fn explicit_override_parses() {
    assert_eq!(
      ItemOverride::<SitemapStatus>::parse(Some(" exclude ")),
      ItemOverride::Set(SitemapStatus::Exclude)
    );
    assert_eq!(
      ItemOverride::Set(FollowStatus::Nofollow).as_meta(),
      "nofollow"
    );
    assert_eq!(ItemOverride::<FollowStatus>::Inherit.as_meta(), "inherit");
  }

  #[test]
  fn strict_parse_rejects_garbage() {
    assert_eq!("inherit".parse::<ItemOverride<FollowStatus>>(), Ok(ItemOverride::Inherit));
    assert_eq!(
      "exclude".parse::<ItemOverride<SitemapStatus>>(),
      Ok(ItemOverride::Set(SitemapStatus::Exclude))
    );
    assert!("garbage".parse::<ItemOverride<FollowStatus>>().is_err());
  }
}
