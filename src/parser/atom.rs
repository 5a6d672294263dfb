//! Public-inbox Atom feed parsing (`?x=A` search results, `t.atom`).
//!
//! Only the fields the series and search views use are read: entry title,
//! first link, updated timestamp and author name. The feed must be
//! well-formed XML with a `<feed>` root; anything else is an error.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{LoreError, Result};
use crate::model::feed::FeedEntry;

/// Parse an Atom document into its entries, in document order.
pub fn parse_feed(xml: &[u8]) -> Result<Vec<FeedEntry>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut saw_root = false;
    let mut current: Option<FeedEntry> = None;
    let mut entries = Vec::new();

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                return Err(LoreError::InvalidFeed(format!(
                    "{e} (at byte {})",
                    reader.buffer_position()
                )))
            }
        };

        match event {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                if stack.is_empty() {
                    check_root(&name)?;
                    saw_root = true;
                }
                if stack.len() == 1 && name == b"entry" {
                    current = Some(FeedEntry::default());
                }
                if name == b"link" {
                    take_link(&e, &stack, current.as_mut())?;
                }
                stack.push(name);
            }
            Event::Empty(e) => {
                let name = e.local_name();
                if stack.is_empty() {
                    check_root(name.as_ref())?;
                    saw_root = true;
                }
                if name.as_ref() == b"link" {
                    take_link(&e, &stack, current.as_mut())?;
                }
            }
            Event::End(_) => {
                let closed = stack.pop();
                if stack.len() == 1 && closed.as_deref() == Some(b"entry".as_slice()) {
                    if let Some(entry) = current.take() {
                        entries.push(entry);
                    }
                }
            }
            Event::Text(t) => {
                let text = t
                    .unescape()
                    .map_err(|e| LoreError::InvalidFeed(e.to_string()))?;
                append_field(&stack, current.as_mut(), &text);
            }
            Event::CData(c) => {
                let text = String::from_utf8_lossy(&c);
                append_field(&stack, current.as_mut(), &text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(LoreError::InvalidFeed(format!(
            "document ends inside <{}>",
            String::from_utf8_lossy(open)
        )));
    }
    if !saw_root {
        return Err(LoreError::InvalidFeed("missing <feed> root element".into()));
    }

    Ok(entries)
}

/// Message id of an archive link: its last non-empty path segment.
///
/// `https://lore.kernel.org/all/20250101.123-1-a@b/` → `20250101.123-1-a@b`
pub fn message_id_from_href(href: &str) -> String {
    href.trim_end_matches('/')
        .rsplit_once('/')
        .map(|(_, last)| last.to_string())
        .unwrap_or_default()
}

fn check_root(name: &[u8]) -> Result<()> {
    if name == b"feed" {
        Ok(())
    } else {
        Err(LoreError::InvalidFeed(format!(
            "unexpected root element <{}>",
            String::from_utf8_lossy(name)
        )))
    }
}

/// Record the first `<link href>` directly inside an entry.
fn take_link(e: &BytesStart<'_>, stack: &[Vec<u8>], entry: Option<&mut FeedEntry>) -> Result<()> {
    let Some(entry) = entry else {
        return Ok(());
    };
    if stack.len() != 2 || !entry.url.is_empty() {
        return Ok(());
    }
    let href = e
        .try_get_attribute("href")
        .map_err(|err| LoreError::InvalidFeed(err.to_string()))?;
    if let Some(attr) = href {
        let value = attr
            .unescape_value()
            .map_err(|err| LoreError::InvalidFeed(err.to_string()))?;
        entry.message_id = message_id_from_href(&value);
        entry.url = value.into_owned();
    }
    Ok(())
}

fn append_field(stack: &[Vec<u8>], entry: Option<&mut FeedEntry>, text: &str) {
    let Some(entry) = entry else {
        return;
    };
    let path: Vec<&[u8]> = stack.iter().skip(2).map(Vec::as_slice).collect();
    let field = match path.as_slice() {
        [b"title"] => &mut entry.title,
        [b"updated"] => &mut entry.updated,
        [b"author", b"name"] => &mut entry.author,
        _ => return,
    };
    field.push_str(text);
}
