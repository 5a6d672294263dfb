//! Thread assembly: mbox text in, reduced per-message context out.

pub mod bot;
pub mod context;

use tracing::{debug, info};

use crate::error::Result;
use crate::export::diff::DiffStore;
use crate::model::message::{ThreadMessage, ThreadResult};
use crate::parser::header::normalize_message_id;
use crate::parser::mbox::split_records;
use crate::parser::mime::ParsedMessage;

use self::bot::is_bot_sender;
use self::context::{reduce_body, DEFAULT_MAX_QUOTE_LINES};

/// Knobs for thread assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadOptions {
    /// Keep messages from CI robots and other automated senders.
    pub include_bots: bool,
    /// Trailing lines kept from each quote block.
    pub max_quote_lines: usize,
}

impl Default for ThreadOptions {
    fn default() -> Self {
        Self {
            include_bots: false,
            max_quote_lines: DEFAULT_MAX_QUOTE_LINES,
        }
    }
}

/// Build a thread from decoded mbox text.
///
/// Records are processed in archive order. Blank records and, unless
/// `include_bots` is set, messages from automated senders are skipped.
/// Patch diffs are written to `diffs` when a store is given; without one
/// the diff is dropped and only the reduced context is kept.
pub fn build_thread(
    message_id: &str,
    mbox_text: &str,
    options: &ThreadOptions,
    diffs: Option<&DiffStore>,
) -> Result<ThreadResult> {
    let records = split_records(mbox_text);
    let mut messages = Vec::with_capacity(records.len());
    let mut skipped_bots = 0usize;

    for (index, record) in records.into_iter().enumerate() {
        if record.trim().is_empty() {
            continue;
        }

        let parsed = ParsedMessage::parse(record);
        let from = parsed.from();
        if !options.include_bots && is_bot_sender(&from) {
            skipped_bots += 1;
            continue;
        }

        let reduced = reduce_body(&parsed.body, options.max_quote_lines);
        let own_id = parsed.message_id();

        let diff_path = match (reduced.diff.as_deref(), diffs) {
            (Some(diff), Some(store)) => {
                let key = match normalize_message_id(&own_id) {
                    "" => format!("record-{index}"),
                    id => id.to_string(),
                };
                Some(store.save(&key, diff)?.display().to_string())
            }
            _ => None,
        };

        messages.push(ThreadMessage {
            subject: parsed.subject(),
            from,
            date: parsed.date(),
            message_id: own_id,
            in_reply_to: parsed.in_reply_to(),
            body: reduced.context,
            diff_path,
        });
    }

    if skipped_bots > 0 {
        debug!(skipped_bots, "Filtered automated senders");
    }
    info!(message_id, messages = messages.len(), "Assembled thread");

    Ok(ThreadResult {
        message_id: normalize_message_id(message_id).to_string(),
        messages,
    })
}
