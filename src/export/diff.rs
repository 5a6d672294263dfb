//! Saving patch diffs to disk, one file per message.

use std::path::PathBuf;

use tracing::debug;

use crate::error::{LoreError, Result};

/// Directory that receives `<message-id>.diff` files.
#[derive(Debug, Clone)]
pub struct DiffStore {
    dir: PathBuf,
}

impl DiffStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path a diff for `message_id` is written to.
    fn path_for(&self, message_id: &str) -> PathBuf {
        self.dir
            .join(format!("{}.diff", sanitize_message_id(message_id)))
    }

    /// Write `diff` for `message_id`, creating the directory on first use.
    ///
    /// An existing file for the same message is overwritten.
    pub fn save(&self, message_id: &str, diff: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir).map_err(|e| LoreError::io(&self.dir, e))?;
        let path = self.path_for(message_id);
        std::fs::write(&path, diff).map_err(|e| LoreError::io(&path, e))?;
        debug!(path = %path.display(), bytes = diff.len(), "Saved diff");
        Ok(path)
    }
}

/// Make a message id safe as a file name: `/` becomes `_`, `@` becomes `_at_`.
pub fn sanitize_message_id(message_id: &str) -> String {
    message_id.replace('/', "_").replace('@', "_at_")
}
