//! MBOX decoding and record splitting.
//!
//! Public-inbox serves whole threads as gzip-compressed mbox (`t.mbox.gz`).
//! The payload is decompressed, decoded to text with invalid bytes replaced,
//! and cut into one record per message at `From ` envelope lines.

use std::io::Read;

use flate2::read::GzDecoder;
use tracing::{debug, warn};

use crate::error::{LoreError, Result};

/// Gzip member header magic.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Envelope line that opens every mbox record.
const ENVELOPE_PREFIX: &str = "From ";

/// Whether `bytes` starts with a gzip header.
pub fn is_gzip(bytes: &[u8]) -> bool {
    bytes.starts_with(&GZIP_MAGIC)
}

/// Decompress a gzip payload in full.
pub fn gunzip(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(bytes);
    let mut out = Vec::with_capacity(bytes.len() * 4);
    decoder
        .read_to_end(&mut out)
        .map_err(LoreError::Decompress)?;
    debug!(
        compressed = bytes.len(),
        decompressed = out.len(),
        "Decompressed mbox"
    );
    Ok(out)
}

/// Decode archive bytes as UTF-8, replacing invalid sequences and dropping a BOM.
pub fn decode_text(bytes: &[u8]) -> String {
    let (text, had_errors) = encoding_rs::UTF_8.decode_with_bom_removal(bytes);
    if had_errors {
        warn!(len = bytes.len(), "Archive contains invalid UTF-8, bytes replaced");
    }
    text.into_owned()
}

/// Split mbox text into raw message records, in archive order.
///
/// A `From ` line closes the record being accumulated and opens the next
/// one; the first envelope line only opens. Every other line is kept
/// verbatim. The last record is returned even without a following
/// separator, and blank records are returned as-is for the caller to skip.
pub fn split_records(text: &str) -> Vec<&str> {
    let mut records = Vec::new();
    let mut start: Option<usize> = None;
    let mut offset = 0usize;

    for line in text.split_inclusive('\n') {
        if is_mbox_separator(line) {
            if let Some(s) = start {
                records.push(&text[s..offset]);
            }
            start = Some(offset);
        } else if start.is_none() {
            start = Some(offset);
        }
        offset += line.len();
    }

    if let Some(s) = start {
        records.push(&text[s..]);
    }

    records
}

/// Check whether a line is an MBOX separator (`From ` at the start).
///
/// Quoted `>From ` lines inside bodies do not match.
pub fn is_mbox_separator(line: &str) -> bool {
    line.starts_with(ENVELOPE_PREFIX)
}

/// Strip the envelope line from a record, if it has one.
pub fn skip_envelope(record: &str) -> &str {
    if is_mbox_separator(record) {
        match record.find('\n') {
            Some(pos) => &record[pos + 1..],
            None => "",
        }
    } else {
        record
    }
}
