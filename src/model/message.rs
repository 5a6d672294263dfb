//! Thread-level result types.

use serde::{Deserialize, Serialize};

/// Context extracted from one message body.
///
/// When `diff` is set, `context` holds only the commit message, the
/// changed-file list and the diffstat summary line, never diff lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReducedContext {
    /// Condensed text kept inline.
    pub context: String,
    /// The patch from the `---` boundary onward, verbatim.
    pub diff: Option<String>,
}

impl ReducedContext {
    /// Whether the body was recognized as a patch.
    pub fn is_patch(&self) -> bool {
        self.diff.is_some()
    }
}

/// One message of a retrieved thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadMessage {
    pub subject: String,
    pub from: String,
    pub date: String,
    /// `Message-ID` header as it appears in the message.
    pub message_id: String,
    /// `In-Reply-To` header as it appears in the message (may be empty).
    pub in_reply_to: String,
    /// Reduced body context.
    pub body: String,
    /// Scratch file holding the separated diff, for patch messages.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub diff_path: Option<String>,
}

/// A full thread, in archive order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadResult {
    /// The requested message id, without angle brackets.
    pub message_id: String,
    pub messages: Vec<ThreadMessage>,
}

/// A single message in RFC 822 form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMessage {
    pub message_id: String,
    pub raw: String,
}
