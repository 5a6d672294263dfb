//! Message parsing: header map plus best-effort plain-text body.

use std::borrow::Cow;

use mail_parser::{MessageParser, MessagePart, MimeHeaders, PartType};
use tracing::debug;

use super::header::{split_head_body, HeaderMap};
use super::mbox::skip_envelope;

/// A message reduced to what thread assembly needs.
#[derive(Debug, Clone, Default)]
pub struct ParsedMessage {
    pub headers: HeaderMap,
    /// Plain-text body; empty when the message has no plain-text part.
    pub body: String,
}

impl ParsedMessage {
    /// Parse one mbox record (the envelope line, if any, is skipped).
    pub fn parse(record: &str) -> Self {
        let message = skip_envelope(record);
        let (head, _) = split_head_body(message);
        Self {
            headers: HeaderMap::parse(head),
            body: extract_plain_text(message.as_bytes()),
        }
    }

    pub fn subject(&self) -> String {
        self.headers.get_or_empty("subject")
    }

    pub fn from(&self) -> String {
        self.headers.get_or_empty("from")
    }

    pub fn date(&self) -> String {
        self.headers.get_or_empty("date")
    }

    pub fn message_id(&self) -> String {
        self.headers.get_or_empty("message-id")
    }

    pub fn in_reply_to(&self) -> String {
        self.headers.get_or_empty("in-reply-to")
    }
}

/// Extract the plain-text body of a raw RFC 5322 message.
///
/// Multipart messages yield every `text/plain` leaf part concatenated in
/// part order. A single-part message yields its payload whatever its
/// declared type. Bytes that do not decode are replaced, never rejected.
pub fn extract_plain_text(raw: &[u8]) -> String {
    let Some(msg) = MessageParser::default().parse(raw) else {
        debug!("mail-parser rejected message, using raw body");
        return extract_body_fallback(raw);
    };

    let Some(root) = msg.parts.first() else {
        return String::new();
    };

    if !is_multipart(root) {
        return decode_part(root).into_owned();
    }

    let mut body = String::new();
    for part in msg.parts.iter().skip(1) {
        if is_multipart(part) || !is_text_plain(part) {
            continue;
        }
        body.push_str(&decode_part(part));
    }
    body
}

fn is_multipart(part: &MessagePart<'_>) -> bool {
    matches!(part.body, PartType::Multipart(_))
}

/// Parts without a `Content-Type` default to `text/plain` (RFC 2045 §5.2).
fn is_text_plain(part: &MessagePart<'_>) -> bool {
    match part.content_type() {
        Some(ct) => {
            ct.ctype().eq_ignore_ascii_case("text")
                && ct
                    .subtype()
                    .map_or(true, |sub| sub.eq_ignore_ascii_case("plain"))
        }
        None => true,
    }
}

fn decode_part<'a>(part: &'a MessagePart<'_>) -> Cow<'a, str> {
    if part.is_encoding_problem {
        debug!("Part has a transfer-encoding problem, decoding lossily");
    }
    match &part.body {
        PartType::Text(text) | PartType::Html(text) => Cow::Borrowed(text.as_ref()),
        PartType::Multipart(_) => Cow::Borrowed(""),
        _ => String::from_utf8_lossy(part.contents()),
    }
}

/// Everything after the first blank line, for input mail-parser gives up on.
fn extract_body_fallback(data: &[u8]) -> String {
    let text = String::from_utf8_lossy(data);
    let (_, body) = split_head_body(&text);
    body.to_string()
}
