//! Reads a local `.mbox` or `.mbox.gz` file into decoded text.

use std::path::Path;

use tracing::debug;

use crate::error::{LoreError, Result};
use crate::export::diff::DiffStore;
use crate::model::message::ThreadResult;
use crate::parser::mbox::{decode_text, gunzip, is_gzip};
use crate::thread::{build_thread, ThreadOptions};

/// A local mbox archive, read fully into memory.
///
/// Gzip-compressed files are recognized by their magic bytes, not by
/// extension.
pub struct MboxArchive {
    bytes: Vec<u8>,
}

impl MboxArchive {
    /// Read an archive file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LoreError::FileNotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path).map_err(|e| LoreError::io(path, e))?;
        debug!(path = %path.display(), bytes = bytes.len(), "Read archive");
        Ok(Self { bytes })
    }

    /// Raw file bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// File contents as text, decompressed first when gzip-compressed.
    pub fn text(&self) -> Result<String> {
        let bytes = self.bytes();
        if is_gzip(bytes) {
            Ok(decode_text(&gunzip(bytes)?))
        } else {
            Ok(decode_text(bytes))
        }
    }

    /// Assemble the archive as one thread.
    ///
    /// `message_id` only labels the result; every message in the file is
    /// included.
    pub fn thread(
        &self,
        message_id: &str,
        options: &ThreadOptions,
        diffs: Option<&DiffStore>,
    ) -> Result<ThreadResult> {
        build_thread(message_id, &self.text()?, options, diffs)
    }
}
