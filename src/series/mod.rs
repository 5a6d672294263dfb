//! Patch-series reconstruction from a flat Atom feed.
//!
//! A search feed lists every message an author sent: cover letters, each
//! patch of each revision, and replies. Replies are dropped, entries are
//! grouped by [`SeriesKey`], and each group is represented by its cover
//! letter, else its first patch, else (for unnumbered patches) the patch
//! itself. Groups that only show later patches of a cover-less series are
//! not surfaced. All cover letters are listed before any other entry.

pub mod key;

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::model::feed::{FeedEntry, SeriesEntry, SeriesKind};

pub use self::key::{SeriesKey, TitleClass};

static REPLY_PREFIX: OnceLock<Regex> = OnceLock::new();

fn reply_prefix_regex() -> &'static Regex {
    REPLY_PREFIX.get_or_init(|| Regex::new(r"(?i)^Re:\s*").expect("Invalid reply prefix regex"))
}

/// Whether a subject is a reply (`Re:`, any case).
pub fn is_reply_title(title: &str) -> bool {
    reply_prefix_regex().is_match(title)
}

struct Candidate<'a> {
    entry: &'a FeedEntry,
    key: SeriesKey,
    class: TitleClass,
}

/// Reduce feed entries to one representative per series.
///
/// Cover letters come first, in feed order. First patches of cover-less
/// series and unnumbered patches follow, also in feed order. Every key
/// appears at most once.
pub fn reconstruct_series(entries: &[FeedEntry]) -> Vec<SeriesEntry> {
    let candidates: Vec<Candidate<'_>> = entries
        .iter()
        .filter(|entry| !is_reply_title(&entry.title))
        .map(|entry| Candidate {
            entry,
            key: SeriesKey::derive(&entry.message_id, &entry.title),
            class: TitleClass::of(&entry.title),
        })
        .collect();

    let mut seen: HashSet<&SeriesKey> = HashSet::new();
    let mut series: Vec<SeriesEntry> = Vec::new();

    for candidate in &candidates {
        if let TitleClass::CoverLetter { total } = candidate.class {
            if seen.insert(&candidate.key) {
                series.push(to_series_entry(candidate.entry, SeriesKind::CoverLetter, total));
            }
        }
    }

    for candidate in &candidates {
        if seen.contains(&candidate.key) {
            continue;
        }
        let kind_and_total = match candidate.class {
            TitleClass::NumberedPatch { index: 1, total } => Some((SeriesKind::FirstPatch, total)),
            TitleClass::NumberedPatch { .. } => {
                seen.insert(&candidate.key);
                None
            }
            TitleClass::SinglePatch => Some((SeriesKind::SinglePatch, 1)),
            TitleClass::CoverLetter { .. } | TitleClass::Unclassified => None,
        };
        if let Some((kind, total)) = kind_and_total {
            seen.insert(&candidate.key);
            series.push(to_series_entry(candidate.entry, kind, total));
        }
    }

    debug!(
        entries = entries.len(),
        considered = candidates.len(),
        series = series.len(),
        "Reconstructed series"
    );
    series
}

fn to_series_entry(entry: &FeedEntry, kind: SeriesKind, total: u32) -> SeriesEntry {
    SeriesEntry {
        message_id: entry.message_id.clone(),
        title: entry.title.clone(),
        updated: entry.updated.clone(),
        url: entry.url.clone(),
        kind,
        total_patches: total.max(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(message_id: &str, title: &str) -> FeedEntry {
        FeedEntry {
            message_id: message_id.to_string(),
            title: title.to_string(),
            author: String::new(),
            updated: "2025-01-01T00:00:00Z".to_string(),
            url: format!("https://lore.kernel.org/all/{message_id}/"),
        }
    }

    #[test]
    fn test_full_series_collapses_to_cover_letter() {
        let feed = vec![
            entry("20250101.100-4-dev@x", "[PATCH 3/3] c"),
            entry("20250101.100-3-dev@x", "[PATCH 2/3] b"),
            entry("20250101.100-2-dev@x", "[PATCH 1/3] a"),
            entry("20250101.100-1-dev@x", "[PATCH 0/3] cover"),
        ];
        let series = reconstruct_series(&feed);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].kind, SeriesKind::CoverLetter);
        assert_eq!(series[0].total_patches, 3);
        assert_eq!(series[0].message_id, "20250101.100-1-dev@x");
    }

    #[test]
    fn test_first_patch_without_cover() {
        let feed = vec![
            entry("20250101.5-3-d@x", "[PATCH v2 2/2] net: second"),
            entry("20250101.5-2-d@x", "[PATCH v2 1/2] net: first"),
        ];
        let series = reconstruct_series(&feed);
        assert!(series.is_empty());

        let feed = vec![
            entry("b@x", "[PATCH v2 1/2] net: first"),
            entry("a@x", "[PATCH v2 2/2] net: first"),
        ];
        let series = reconstruct_series(&feed);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].kind, SeriesKind::FirstPatch);
        assert_eq!(series[0].total_patches, 2);
    }

    #[test]
    fn test_replies_and_unrelated_mail_dropped() {
        let feed = vec![
            entry("r@x", "Re: [PATCH] fix typo"),
            entry("q@x", "RE: question"),
            entry("g@x", "[GIT PULL] for-next"),
            entry("s@x", "[PATCH] fix typo"),
        ];
        let series = reconstruct_series(&feed);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].kind, SeriesKind::SinglePatch);
        assert_eq!(series[0].total_patches, 1);
        assert_eq!(series[0].message_id, "s@x");
    }

    #[test]
    fn test_cover_letters_listed_before_patches() {
        let feed = vec![
            entry("a@x", "[PATCH] single"),
            entry("c@x", "[PATCH 0/2] cover"),
        ];
        let ids: Vec<String> = reconstruct_series(&feed)
            .into_iter()
            .map(|s| s.message_id)
            .collect();
        assert_eq!(ids, vec!["c@x", "a@x"]);

        let feed = vec![
            entry("one@x", "[PATCH] first single"),
            entry("20250102.1-2-d@x", "[PATCH 1/2] later cover series"),
            entry("two@x", "[PATCH] second single"),
            entry("20250102.1-1-d@x", "[PATCH 0/2] later cover series"),
            entry("20250103.9-1-d@x", "[PATCH 0/3] second cover"),
        ];
        let series = reconstruct_series(&feed);
        let ids: Vec<&str> = series.iter().map(|s| s.message_id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["20250102.1-1-d@x", "20250103.9-1-d@x", "one@x", "two@x"]
        );
        assert_eq!(series[0].kind, SeriesKind::CoverLetter);
        assert_eq!(series[2].kind, SeriesKind::SinglePatch);
    }

    #[test]
    fn test_each_key_once_and_total_at_least_one() {
        let feed = vec![
            entry("a@x", "[PATCH] same subject"),
            entry("b@x", "[PATCH] same subject"),
            entry("c@x", "[PATCH 0/0] empty cover"),
        ];
        let series = reconstruct_series(&feed);
        assert_eq!(series.len(), 2);
        assert!(series.iter().all(|s| s.total_patches >= 1));
        assert_eq!(series[1].total_patches, 1);
    }

    #[test]
    fn test_revisions_share_title_key() {
        let feed = vec![
            entry("v3@x", "[PATCH v3] mm: tidy"),
            entry("v2@x", "[PATCH v2] mm: tidy"),
        ];
        let series = reconstruct_series(&feed);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].message_id, "v3@x");
    }
}
