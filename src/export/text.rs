//! Plain-text reports for the terminal.
//!
//! Every report starts with a short header block, then one numbered entry
//! per item with its fields indented by four spaces.

use std::fmt::{self, Write as _};

use humansize::{format_size, BINARY};

use crate::model::address::Sender;
use crate::model::feed::{PatchInfo, SearchResult, SeriesResult};
use crate::model::message::{RawMessage, ThreadResult};
use crate::parser::header::normalize_message_id;

const INDENT: &str = "    ";

/// Run a report writer into a fresh buffer. Writing to a `String` cannot fail.
fn render(write: impl FnOnce(&mut String) -> fmt::Result) -> String {
    let mut out = String::new();
    let _ = write(&mut out);
    out
}

/// Render a thread: headers per message, then its reduced body.
pub fn render_thread(thread: &ThreadResult) -> String {
    render(|out| write_thread(out, thread))
}

fn write_thread(out: &mut String, thread: &ThreadResult) -> fmt::Result {
    writeln!(out, "Thread: {}", thread.message_id)?;
    writeln!(out, "Messages: {}", thread.messages.len())?;

    for (i, msg) in thread.messages.iter().enumerate() {
        writeln!(out, "\n[{}] {}", i + 1, msg.subject)?;
        writeln!(out, "{INDENT}From: {}", Sender::parse(&msg.from))?;
        writeln!(out, "{INDENT}Date: {}", msg.date)?;
        let in_reply_to = normalize_message_id(&msg.in_reply_to);
        if !in_reply_to.is_empty() {
            writeln!(out, "{INDENT}Reply-To: {in_reply_to}")?;
        }
        if let Some(ref path) = msg.diff_path {
            match std::fs::metadata(path) {
                Ok(meta) => writeln!(
                    out,
                    "{INDENT}Diff: {path} ({})",
                    format_size(meta.len(), BINARY)
                )?,
                Err(_) => writeln!(out, "{INDENT}Diff: {path}")?,
            }
        }
        out.push('\n');
        for line in msg.body.split('\n') {
            if line.is_empty() {
                out.push('\n');
            } else {
                writeln!(out, "{INDENT}{line}")?;
            }
        }
    }
    Ok(())
}

/// Render one message verbatim under a short banner.
pub fn render_raw(raw: &RawMessage) -> String {
    render(|out| {
        writeln!(out, "Raw message: {}", raw.message_id)?;
        writeln!(out, "Size: {}\n", format_size(raw.raw.len(), BINARY))?;
        out.push_str("--- RAW MESSAGE ---\n");
        out.push_str(&raw.raw);
        if !raw.raw.ends_with('\n') {
            out.push('\n');
        }
        Ok(())
    })
}

/// Render an author's series list.
pub fn render_series(result: &SeriesResult) -> String {
    render(|out| write_series(out, result))
}

fn write_series(out: &mut String, result: &SeriesResult) -> fmt::Result {
    writeln!(out, "Recent patch series for: {}", result.email)?;
    writeln!(out, "Found {} series\n", result.series.len())?;
    out.push_str("Use the message id with `loreshell thread` to fetch the full series.\n");

    for (i, series) in result.series.iter().enumerate() {
        writeln!(out, "\n[{}] {}", i + 1, series.title)?;
        writeln!(out, "{INDENT}Message ID: {}", series.message_id)?;
        writeln!(out, "{INDENT}Type: {}", series.kind)?;
        writeln!(out, "{INDENT}Total patches: {}", series.total_patches)?;
        writeln!(out, "{INDENT}Updated: {}", series.updated)?;
        writeln!(out, "{INDENT}URL: {}", series.url)?;
    }
    Ok(())
}

/// Render search hits with their patch annotations.
pub fn render_search(result: &SearchResult) -> String {
    render(|out| write_search(out, result))
}

fn write_search(out: &mut String, result: &SearchResult) -> fmt::Result {
    writeln!(out, "Search results for: {}", result.query)?;

    let filters = &result.filters;
    let active: Vec<String> = [
        ("Subsystem", &filters.subsystem),
        ("Author", &filters.author),
        ("Since", &filters.since_date),
    ]
    .into_iter()
    .filter_map(|(label, value)| value.as_ref().map(|v| format!("{label}: {v}")))
    .collect();
    if !active.is_empty() {
        writeln!(out, "Filters: {}", active.join(", "))?;
    }

    writeln!(out, "Found {} results\n", result.total_results)?;
    out.push_str("Use the message id with `loreshell thread` to fetch full details.\n");

    for (i, item) in result.results.iter().enumerate() {
        writeln!(out, "\n[{}] {}", i + 1, item.title)?;
        writeln!(out, "{INDENT}Message ID: {}", item.message_id)?;
        writeln!(out, "{INDENT}Author: {}", item.author)?;
        writeln!(out, "{INDENT}Updated: {}", item.updated)?;
        if let Some(ref info) = item.patch_info {
            writeln!(out, "{INDENT}Patch: {}", describe_patch(info))?;
        }
        writeln!(out, "{INDENT}URL: {}", item.url)?;
    }
    Ok(())
}

/// `v3, patch 2/5` / `standalone patch`.
fn describe_patch(info: &PatchInfo) -> String {
    let position = if info.is_series {
        format!(
            "patch {}/{}",
            info.patch_number.unwrap_or_default(),
            info.total_patches.unwrap_or_default()
        )
    } else {
        "standalone patch".to_string()
    };
    match info.version {
        Some(version) => format!("v{version}, {position}"),
        None => position,
    }
}
