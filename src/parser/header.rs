//! RFC 5322 header block handling: unfolding, first-wins lookup and
//! RFC 2047 encoded-word decoding.

use tracing::warn;

/// Ordered, case-insensitive header map.
///
/// Archived messages sometimes repeat a header (resent mail, list software
/// adding a second `Message-ID`); lookups return the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<(String, String)>,
}

impl HeaderMap {
    /// Parse an unfolded header block (everything before the first blank line).
    pub fn parse(block: &str) -> Self {
        Self {
            entries: unfold_headers(block),
        }
    }

    /// First value for `name` (case-insensitive), with encoded-words decoded.
    pub fn get(&self, name: &str) -> Option<String> {
        self.get_raw(name).map(decode_encoded_words)
    }

    /// First value for `name` (case-insensitive), undecoded.
    pub fn get_raw(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// `get` with an empty-string default.
    pub fn get_or_empty(&self, name: &str) -> String {
        self.get(name).unwrap_or_default()
    }
}

/// Split a message into its header block and body at the first blank line.
///
/// A message without a blank line is all headers.
pub fn split_head_body(message: &str) -> (&str, &str) {
    if let Some(pos) = message.find("\r\n\r\n") {
        if message.find("\n\n").map_or(true, |lf| lf > pos) {
            return (&message[..pos], &message[pos + 4..]);
        }
    }
    match message.find("\n\n") {
        Some(pos) => (&message[..pos], &message[pos + 2..]),
        None => (message, ""),
    }
}

/// Header fields as `(lowercase_name, value)`, continuation lines joined
/// onto the field they continue. Lines that are neither are ignored.
fn unfold_headers(block: &str) -> Vec<(String, String)> {
    let mut fields: Vec<(String, String)> = Vec::new();
    for line in block.lines() {
        match line.as_bytes().first() {
            Some(b' ' | b'\t') => {
                if let Some((_, value)) = fields.last_mut() {
                    value.push(' ');
                    value.push_str(line.trim());
                }
            }
            _ => {
                if let Some((name, value)) = line.split_once(':') {
                    fields.push((name.trim().to_ascii_lowercase(), value.trim().to_string()));
                }
            }
        }
    }
    fields
}

/// Decode RFC 2047 encoded-words in a header value.
///
/// Whitespace separating two encoded words is dropped (RFC 2047 §6.2).
/// Anything that does not decode is kept as written.
pub fn decode_encoded_words(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    let mut follows_word = false;

    while let Some((literal, tail)) = rest.split_once("=?") {
        match decode_word(tail) {
            Some((text, consumed)) => {
                if !(follows_word && literal.trim().is_empty()) {
                    out.push_str(literal);
                }
                out.push_str(&text);
                rest = &tail[consumed..];
                follows_word = true;
            }
            None => {
                out.push_str(literal);
                out.push_str("=?");
                rest = tail;
                follows_word = false;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Decode `charset?enc?text?=`; returns the text and the bytes consumed.
fn decode_word(s: &str) -> Option<(String, usize)> {
    let mut parts = s.splitn(3, '?');
    let charset = parts.next()?;
    let encoding = parts.next()?;
    let rest = parts.next()?;
    let end = rest.find("?=")?;
    let encoded = &rest[..end];
    let consumed = charset.len() + 1 + encoding.len() + 1 + end + 2;

    let bytes = if encoding.eq_ignore_ascii_case("B") {
        decode_base64(encoded)?
    } else if encoding.eq_ignore_ascii_case("Q") {
        decode_q(encoded)
    } else {
        return None;
    };

    Some((decode_charset(charset, &bytes), consumed))
}

fn decode_base64(input: &str) -> Option<Vec<u8>> {
    fn value(c: u8) -> Option<u32> {
        match c {
            b'A'..=b'Z' => Some(u32::from(c - b'A')),
            b'a'..=b'z' => Some(u32::from(c - b'a') + 26),
            b'0'..=b'9' => Some(u32::from(c - b'0') + 52),
            b'+' => Some(62),
            b'/' => Some(63),
            _ => None,
        }
    }

    let mut out = Vec::with_capacity(input.len() * 3 / 4);
    let mut acc = 0u32;
    let mut bits = 0u32;
    for c in input.bytes().filter(|b| !b.is_ascii_whitespace() && *b != b'=') {
        acc = (acc << 6) | value(c)?;
        bits += 6;
        if bits >= 8 {
            bits -= 8;
            out.push((acc >> bits) as u8);
            acc &= (1 << bits) - 1;
        }
    }
    Some(out)
}

/// Q-encoding: `_` is a space, `=XX` a hex byte.
fn decode_q(input: &str) -> Vec<u8> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'_' => {
                out.push(b' ');
                i += 1;
            }
            b'=' => {
                let hex = input
                    .get(i + 1..i + 3)
                    .and_then(|h| u8::from_str_radix(h, 16).ok());
                match hex {
                    Some(b) => {
                        out.push(b);
                        i += 3;
                    }
                    None => {
                        out.push(b'=');
                        i += 1;
                    }
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    out
}

fn decode_charset(charset: &str, bytes: &[u8]) -> String {
    // RFC 2231 language suffix: "utf-8*en"
    let label = charset.split('*').next().unwrap_or(charset);
    match encoding_rs::Encoding::for_label(label.as_bytes()) {
        Some(encoding) => encoding.decode(bytes).0.into_owned(),
        None => {
            warn!(charset = label, "Unknown charset, falling back to UTF-8 lossy");
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

/// Strip surrounding whitespace and one pair of angle brackets from a message id.
pub fn normalize_message_id(id: &str) -> &str {
    id.trim().trim_start_matches('<').trim_end_matches('>')
}
