//! Body reduction: keep what a reader of the thread needs, park the rest.
//!
//! A patch keeps its commit message plus a changed-file list and the
//! diffstat summary; the diff itself is returned separately. A reply keeps
//! its own text and only the tail of each block it quotes, and stops at the
//! signature separator.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::message::ReducedContext;

/// Quoted lines kept from the end of each quote block.
pub const DEFAULT_MAX_QUOTE_LINES: usize = 5;

/// Changed files named inline before the rest are only counted.
const MAX_LISTED_FILES: usize = 5;

static DIFFSTAT_ROW: OnceLock<Regex> = OnceLock::new();

/// ` path/to/file.c | 12 +++---`
fn diffstat_row_regex() -> &'static Regex {
    DIFFSTAT_ROW
        .get_or_init(|| Regex::new(r"^\s+\S+\s+\|\s+\d+").expect("Invalid diffstat row regex"))
}

/// Reduce a message body to its context and, for patches, its diff.
pub fn reduce_body(body: &str, max_quote_lines: usize) -> ReducedContext {
    let lines: Vec<&str> = body.split('\n').collect();

    match find_diff_boundary(&lines) {
        Some(boundary) if boundary > 0 => reduce_patch(&lines, boundary),
        _ => ReducedContext {
            context: reduce_discussion(&lines, max_quote_lines),
            diff: None,
        },
    }
}

/// Index of the first `---` line followed by `+++`, a blank line or a
/// diffstat row.
fn find_diff_boundary(lines: &[&str]) -> Option<usize> {
    lines
        .windows(2)
        .position(|pair| pair[0].starts_with("---") && opens_diff(pair[1]))
}

fn opens_diff(next: &str) -> bool {
    next.starts_with("+++") || next.trim().is_empty() || diffstat_row_regex().is_match(next)
}

fn reduce_patch(lines: &[&str], boundary: usize) -> ReducedContext {
    let (commit, diff) = lines.split_at(boundary);

    let mut parts: Vec<String> = Vec::new();

    let commit_text = commit.join("\n");
    let commit_text = commit_text.trim();
    if !commit_text.is_empty() {
        parts.push(commit_text.to_string());
    }

    let files = changed_files(diff);
    if !files.is_empty() {
        let listed = &files[..files.len().min(MAX_LISTED_FILES)];
        parts.push(format!("\nFiles changed: {}", listed.join(", ")));
        if files.len() > MAX_LISTED_FILES {
            parts.push(format!(
                "... and {} more files",
                files.len() - MAX_LISTED_FILES
            ));
        }
    }

    if let Some(stats) = diff
        .iter()
        .find(|line| line.contains("file") && line.contains("changed"))
    {
        parts.push(format!("\n{}", stats.trim()));
    }

    ReducedContext {
        context: parts.join("\n"),
        diff: Some(diff.join("\n")),
    }
}

/// Paths touched by the diff, deduplicated in order of first appearance.
///
/// Taken from `diff --git a/x b/<path>` headers and from `--- a/<path>`
/// lines once the first git header has been seen.
fn changed_files<'a>(diff: &[&'a str]) -> Vec<&'a str> {
    let mut files: Vec<&'a str> = Vec::new();
    let mut in_diff = false;

    for line in diff {
        let path = if let Some(rest) = line.strip_prefix("diff --git") {
            in_diff = true;
            rest.rfind(" b/").map(|pos| &rest[pos + 3..])
        } else if in_diff {
            line.strip_prefix("--- a/")
        } else {
            None
        };

        if let Some(path) = path.map(str::trim_end).filter(|p| !p.is_empty()) {
            if !files.contains(&path) {
                files.push(path);
            }
        }
    }

    files
}

/// Where the reply walker is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteState {
    /// Copying the author's own lines.
    Passthrough,
    /// Inside a block of `>` lines, not yet emitted.
    AccumulatingQuote,
    /// Past the signature separator; nothing more is kept.
    Terminated,
}

/// Line-at-a-time reducer for replies.
///
/// Quoted lines are held back until the next unquoted line, at which point
/// only the last `max_quote_lines` of them are emitted. Quote blocks still
/// pending when the body ends or the signature starts are dropped.
#[derive(Debug)]
pub struct QuoteReducer<'a> {
    max_quote_lines: usize,
    state: QuoteState,
    pending: Vec<&'a str>,
    kept: Vec<&'a str>,
}

impl<'a> QuoteReducer<'a> {
    pub fn new(max_quote_lines: usize) -> Self {
        Self {
            max_quote_lines,
            state: QuoteState::Passthrough,
            pending: Vec::new(),
            kept: Vec::new(),
        }
    }

    pub fn state(&self) -> QuoteState {
        self.state
    }

    /// Feed the next body line and return the resulting state.
    pub fn push(&mut self, line: &'a str) -> QuoteState {
        if self.state == QuoteState::Terminated {
            return self.state;
        }

        if is_signature_separator(line) {
            self.pending.clear();
            self.state = QuoteState::Terminated;
        } else if line.starts_with('>') {
            self.pending.push(line);
            self.state = QuoteState::AccumulatingQuote;
        } else {
            if self.state == QuoteState::AccumulatingQuote {
                let skip = self.pending.len().saturating_sub(self.max_quote_lines);
                self.kept.extend(self.pending.drain(..).skip(skip));
            }
            self.kept.push(line);
            self.state = QuoteState::Passthrough;
        }

        self.state
    }

    /// The kept lines, joined and trimmed.
    pub fn finish(self) -> String {
        self.kept.join("\n").trim().to_string()
    }
}

/// `--` or `-- ` alone on a line.
fn is_signature_separator(line: &str) -> bool {
    line.trim() == "--"
}

fn reduce_discussion(lines: &[&str], max_quote_lines: usize) -> String {
    let mut reducer = QuoteReducer::new(max_quote_lines);
    for &line in lines {
        if reducer.push(line) == QuoteState::Terminated {
            break;
        }
    }
    reducer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_with_diffstat_row_boundary() {
        let body = "Fixes bug\n---\n a/f.c | 2 +-\ndiff --git a/f.c b/f.c\n---\na/f.c\n+++ b/f.c\n@@...\n2 files changed";
        let reduced = reduce_body(body, DEFAULT_MAX_QUOTE_LINES);

        assert!(reduced.context.contains("Fixes bug"));
        assert!(reduced.context.contains("Files changed: f.c"));
        assert!(reduced.context.ends_with("2 files changed"));
        let diff = reduced.diff.expect("patch body has a diff");
        assert!(diff.starts_with("---\n a/f.c | 2 +-"));
        assert!(diff.ends_with("2 files changed"));
        assert!(!reduced.context.contains("@@"));
    }

    #[test]
    fn test_patch_layout() {
        let body = concat!(
            "\n",
            "mm: fix leak\n",
            "\n",
            "Signed-off-by: Dev <dev@example.org>\n",
            "---\n",
            " mm/a.c | 1 +\n",
            " 1 file changed, 1 insertion(+)\n",
            "\n",
            "diff --git a/mm/a.c b/mm/a.c\n",
            "--- a/mm/a.c\n",
            "+++ b/mm/a.c\n",
            "@@ -1 +1,2 @@\n",
            "+x\n",
        );
        let reduced = reduce_body(body, 5);
        assert_eq!(
            reduced.context,
            "mm: fix leak\n\nSigned-off-by: Dev <dev@example.org>\n\nFiles changed: mm/a.c\n\n1 file changed, 1 insertion(+)"
        );
    }

    #[test]
    fn test_file_list_truncated_after_five() {
        let mut body = String::from("Refactor drivers\n---\n\n");
        for i in 0..8 {
            body.push_str(&format!("diff --git a/d/f{i}.c b/d/f{i}.c\n--- a/d/f{i}.c\n+++ b/d/f{i}.c\n"));
        }
        let reduced = reduce_body(&body, 5);
        assert!(reduced.context.contains("Files changed: d/f0.c, d/f1.c, d/f2.c, d/f3.c, d/f4.c"));
        assert!(!reduced.context.contains("d/f5.c"));
        assert!(reduced.context.contains("... and 3 more files"));
    }

    #[test]
    fn test_changed_files_dedup_and_old_path() {
        let diff = [
            "---",
            "diff --git a/old/name.c b/new/name.c",
            "--- a/old/name.c",
            "+++ b/new/name.c",
            "diff --git a/new/name.c b/new/name.c",
            "--- /dev/null",
        ];
        assert_eq!(changed_files(&diff), vec!["new/name.c", "old/name.c"]);
    }

    #[test]
    fn test_dash_line_before_any_git_header_is_not_a_path() {
        let diff = ["--- a/not-yet.c", "+++ b/not-yet.c"];
        assert!(changed_files(&diff).is_empty());
    }

    #[test]
    fn test_boundary_at_first_line_is_not_a_patch() {
        let reduced = reduce_body("---\n+++ b/x\nsome text", 5);
        assert!(reduced.diff.is_none());
        assert_eq!(reduced.context, "---\n+++ b/x\nsome text");
    }

    #[test]
    fn test_dash_line_at_end_is_not_a_patch() {
        let reduced = reduce_body("Looks fine\n---", 5);
        assert!(!reduced.is_patch());
    }

    #[test]
    fn test_quote_tail_and_signature() {
        let mut body = String::new();
        for i in 1..=8 {
            body.push_str(&format!("> quoted {i}\n"));
        }
        body.push_str("I agree\n-- \nsig line\n");

        let reduced = reduce_body(&body, 5);
        assert!(reduced.diff.is_none());
        assert_eq!(
            reduced.context,
            "> quoted 4\n> quoted 5\n> quoted 6\n> quoted 7\n> quoted 8\nI agree"
        );
    }

    #[test]
    fn test_trailing_quote_block_is_dropped() {
        let reduced = reduce_body("My reply\n> trailing quote\n> more", 5);
        assert_eq!(reduced.context, "My reply");
    }

    #[test]
    fn test_each_quote_block_bounded_separately() {
        let body = "> a1\n> a2\n> a3\nfirst\n> b1\n> b2\n> b3\nsecond";
        let reduced = reduce_body(body, 2);
        assert_eq!(reduced.context, "> a2\n> a3\nfirst\n> b2\n> b3\nsecond");
    }

    #[test]
    fn test_zero_quote_lines_keeps_no_quotes() {
        let reduced = reduce_body("> a\n> b\nreply", 0);
        assert_eq!(reduced.context, "reply");
    }

    #[test]
    fn test_reduction_is_a_fixed_point() {
        let body = "Hi,\n\n> one\n> two\n> three\n> four\n> five\n> six\n> seven\nInline answer\n\nThanks\n-- \nsig";
        let once = reduce_body(body, 5).context;
        let twice = reduce_body(&once, 5).context;
        assert_eq!(once, twice);
    }

    #[test]
    fn test_partition_is_exclusive() {
        for body in [
            "plain text",
            "",
            "msg\n---\n\nrest",
            "> only quotes",
            "---\n",
            "x\n---\n+++ b/y",
        ] {
            let reduced = reduce_body(body, 5);
            match reduced.diff {
                Some(ref diff) => assert!(diff.starts_with("---")),
                None => assert!(!reduced.is_patch()),
            }
        }
    }

    #[test]
    fn test_quote_reducer_states() {
        let mut r = QuoteReducer::new(5);
        assert_eq!(r.state(), QuoteState::Passthrough);
        assert_eq!(r.push("> q"), QuoteState::AccumulatingQuote);
        assert_eq!(r.push("text"), QuoteState::Passthrough);
        assert_eq!(r.push("--"), QuoteState::Terminated);
        assert_eq!(r.push("after"), QuoteState::Terminated);
        assert_eq!(r.finish(), "> q\ntext");
    }
}
