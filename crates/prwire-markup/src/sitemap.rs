//! `urlset` sitemap generation.

use chrono::SecondsFormat;
use prwire_core::sitemap::SitemapEntry;
use quick_xml::{
  Writer,
  events::{BytesDecl, BytesEnd, BytesStart, Event},
};

use crate::{Result, feed::text_element};

pub const NS_SITEMAP: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Render `entries` as a sitemap document.
pub fn render(entries: &[SitemapEntry]) -> Result<String> {
  let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
  w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

  let mut urlset = BytesStart::new("urlset");
  urlset.push_attribute(("xmlns", NS_SITEMAP));
  w.write_event(Event::Start(urlset))?;

  for entry in entries {
    w.write_event(Event::Start(BytesStart::new("url")))?;
    text_element(&mut w, "loc", &entry.loc)?;
    text_element(
      &mut w,
      "lastmod",
      &entry.lastmod.to_rfc3339_opts(SecondsFormat::Secs, true),
    )?;
    w.write_event(Event::End(BytesEnd::new("url")))?;
  }

  w.write_event(Event::End(BytesEnd::new("urlset")))?;
  Ok(String::from_utf8(w.into_inner())?)
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Utc};

  use super::*;

  #[test]
  fn renders_escaped_locations() {
    let entries = vec![SitemapEntry {
      item_id: 1,
      loc:     "https://example.com/items/1?a=1&b=2".into(),
      lastmod: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
    }];
    let xml = render(&entries).unwrap();

    assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
    assert!(xml.contains(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#));
    assert!(xml.contains("<loc>https://example.com/items/1?a=1&amp;b=2</loc>"));
    assert!(xml.contains("<lastmod>2024-06-01T12:00:00Z</lastmod>"));
  }

  #[test]
  fn empty_urlset() {
    let xml = render(&[]).unwrap();
    assert!(xml.contains("<urlset"));
    assert!(!xml.contains("<url>"));
  }
}
