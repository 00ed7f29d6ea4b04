//! RSS 2.0 feed generation.

use prwire_core::sitemap::FeedEntry;
use quick_xml::{
  Writer,
  events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use crate::Result;

/// Channel-level metadata.
#[derive(Debug, Clone)]
pub struct Channel {
  pub title:       String,
  pub link:        String,
  pub description: String,
}

pub(crate) fn text_element<W: std::io::Write>(
  w: &mut Writer<W>,
  name: &str,
  text: &str,
) -> Result<()> {
  w.write_event(Event::Start(BytesStart::new(name)))?;
  w.write_event(Event::Text(BytesText::new(text)))?;
  w.write_event(Event::End(BytesEnd::new(name)))?;
  Ok(())
}

/// Render a feed. Entries appear in the order given.
pub fn render(channel: &Channel, entries: &[FeedEntry]) -> Result<String> {
  let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
  w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

  let mut rss = BytesStart::new("rss");
  rss.push_attribute(("version", "2.0"));
  w.write_event(Event::Start(rss))?;
  w.write_event(Event::Start(BytesStart::new("channel")))?;
  text_element(&mut w, "title", &channel.title)?;
  text_element(&mut w, "link", &channel.link)?;
  text_element(&mut w, "description", &channel.description)?;

  for entry in entries {
    w.write_event(Event::Start(BytesStart::new("item")))?;
    text_element(&mut w, "title", &entry.title)?;
    text_element(&mut w, "link", &entry.link)?;
    text_element(&mut w, "guid", &entry.link)?;
    text_element(&mut w, "pubDate", &entry.pub_date.to_rfc2822())?;
    text_element(&mut w, "description", &entry.description)?;
    w.write_event(Event::End(BytesEnd::new("item")))?;
  }

  w.write_event(Event::End(BytesEnd::new("channel")))?;
  w.write_event(Event::End(BytesEnd::new("rss")))?;
  Ok(String::from_utf8(w.into_inner())?)
}
