//! Anchor `rel` rewriting for rendered content.
//!
//! Two engines share [`rel_tokens::rewrite`]:
//!
//! - [`LinkEngine::Markup`] walks a lenient `quick-xml` event stream and
//!   rebuilds each `a` tag whose `rel` changes. Every other event is written
//!   back as read.
//! - [`LinkEngine::Pattern`] scans opening `<a …>` tags with a regex and
//!   edits the attribute text in place.
//!
//! Neither engine surfaces errors: a failure returns the content unchanged.

use std::{borrow::Cow, sync::LazyLock};

use prwire_core::status::FollowStatus;
use quick_xml::{
  Reader, Writer,
  events::{BytesStart, Event, attributes::Attribute},
  name::QName,
};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{Error, Result, rel_tokens};

/// Which anchor rewriter to use.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LinkEngine {
  #[default]
  Markup,
  Pattern,
}

/// Apply `policy` to every anchor in `content`.
///
/// [`FollowStatus::Default`] and content without any `<a` return the input
/// untouched without tokenising it.
pub fn apply_follow(content: &str, policy: FollowStatus, engine: LinkEngine) -> String {
  if policy == FollowStatus::Default || !has_anchor(content) {
    return content.to_owned();
  }

  let rewritten = match engine {
    LinkEngine::Markup => rewrite_markup(content, policy),
    LinkEngine::Pattern => rewrite_pattern(content, policy),
  };

  match rewritten {
    Ok(out) => out,
    Err(e) => {
      tracing::debug!(%engine, %policy, error = %e, "anchor rewrite failed; content left unchanged");
      content.to_owned()
    }
  }
}

fn has_anchor(content: &str) -> bool {
  content
    .as_bytes()
    .windows(2)
    .any(|w| w[0] == b'<' && w[1].eq_ignore_ascii_case(&b'a'))
}

// ─── Markup engine ───────────────────────────────────────────────────────────

fn rewrite_markup(content: &str, policy: FollowStatus) -> Result<String> {
  let mut reader = Reader::from_str(content);
  let config = reader.config_mut();
  config.check_end_names = false;
  config.allow_unmatched_ends = true;

  let mut writer = Writer::new(Vec::with_capacity(content.len() + 32));

  loop {
    match reader.read_event()? {
      Event::Eof => break,
      Event::Start(e) if is_anchor(&e) => {
        let tag = rewrite_anchor(&e, policy)?.unwrap_or(e);
        writer.write_event(Event::Start(tag))?;
      }
      Event::Empty(e) if is_anchor(&e) => {
        let tag = rewrite_anchor(&e, policy)?.unwrap_or(e);
        writer.write_event(Event::Empty(tag))?;
      }
      other => writer.write_event(other)?,
    }
  }

  Ok(String::from_utf8(writer.into_inner())?)
}

fn is_anchor(e: &BytesStart<'_>) -> bool { e.name().as_ref().eq_ignore_ascii_case(b"a") }

/// The rebuilt tag, or `None` when its `rel` is already what `policy`
/// wants.
fn rewrite_anchor<'a>(e: &BytesStart<'a>, policy: FollowStatus) -> Result<Option<BytesStart<'a>>> {
  let mut attrs: Vec<(Vec<u8>, Vec<u8>)> = Vec::new();
  let mut rel_at: Option<usize> = None;

  let mut iter = e.html_attributes();
  iter.with_checks(false);
  for attr in iter {
    let attr = attr?;
    let is_rel = attr.key.as_ref().eq_ignore_ascii_case(b"rel");
    if is_rel && rel_at.is_some() {
      continue;
    }
    if is_rel {
      rel_at = Some(attrs.len());
    }
    attrs.push((attr.key.as_ref().to_vec(), attr.value.into_owned()));
  }

  let existing = rel_at
    .map(|i| std::str::from_utf8(&attrs[i].1))
    .transpose()?;
  if rel_tokens::unchanged(existing, policy) {
    return Ok(None);
  }
  let next = rel_tokens::rewrite(existing, policy);

  let mut tag = e.clone();
  tag.clear_attributes();
  for (i, (key, value)) in attrs.iter().enumerate() {
    if Some(i) == rel_at {
      if let Some(rel) = &next {
        tag.push_attribute(attribute(b"rel", rel.as_bytes()));
      }
      continue;
    }
    tag.push_attribute(attribute(key, value));
  }
  if let (None, Some(rel)) = (rel_at, &next) {
    tag.push_attribute(attribute(b"rel", rel.as_bytes()));
  }

  Ok(Some(tag))
}

/// An attribute whose raw value is safe inside double quotes.
fn attribute<'b>(key: &'b [u8], value: &'b [u8]) -> Attribute<'b> {
  let value = if value.contains(&b'"') {
    let mut v = Vec::with_capacity(value.len() + 8);
    for &b in value {
      if b == b'"' {
        v.extend_from_slice(b"&quot;");
      } else {
        v.push(b);
      }
    }
    Cow::Owned(v)
  } else {
    Cow::Borrowed(value)
  };
  Attribute { key: QName(key), value }
}

// ─── Pattern engine ──────────────────────────────────────────────────────────

static ANCHOR_TAG: LazyLock<Result<Regex, regex::Error>> =
  LazyLock::new(|| Regex::new(r"(?i)<a(?:\s[^>]*)?>"));

static REL_ATTR: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| {
  Regex::new(r#"(?i)\srel\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
});

fn pattern(re: &'static LazyLock<Result<Regex, regex::Error>>) -> Result<&'static Regex> {
  LazyLock::force(re).as_ref().map_err(|e| Error::Pattern(e.to_string()))
}

fn rewrite_pattern(content: &str, policy: FollowStatus) -> Result<String> {
  let anchor = pattern(&ANCHOR_TAG)?;
  let rel = pattern(&REL_ATTR)?;
  let out = anchor.replace_all(content, |caps: &Captures<'_>| {
    rewrite_open_tag(&caps[0], rel, policy)
  });
  Ok(out.into_owned())
}

fn rewrite_open_tag(tag: &str, rel: &Regex, policy: FollowStatus) -> String {
  let found = rel.captures(tag);
  let existing = found
    .as_ref()
    .and_then(|c| c.get(1).or_else(|| c.get(2)).or_else(|| c.get(3)))
    .map(|m| m.as_str());
  if rel_tokens::unchanged(existing, policy) {
    return tag.to_owned();
  }

  let attr = rel_tokens::rewrite(existing, policy)
    .map(|v| format!(r#" rel="{}""#, v.replace('"', "&quot;")))
    .unwrap_or_default();

  match found.as_ref().and_then(|c| c.get(0)) {
    Some(m) => format!("{}{attr}{}", &tag[..m.start()], &tag[m.end()..]),
    None => {
      let end = if tag.ends_with("/>") { tag.len() - 2 } else { tag.len() - 1 };
      format!("{}{attr}{}", &tag[..end], &tag[end..])
    }
  }
}
