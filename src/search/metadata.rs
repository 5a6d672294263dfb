//! Patch metadata read from search-hit subjects.
//!
//! Every hit is classified on its own; hits are never grouped into series.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::feed::{FeedEntry, PatchInfo, SearchResultItem};

static VERSION: OnceLock<Regex> = OnceLock::new();
static POSITION: OnceLock<Regex> = OnceLock::new();

/// `v<N>` anywhere inside the `[PATCH ...]` tag.
fn version_regex() -> &'static Regex {
    VERSION.get_or_init(|| Regex::new(r"\[PATCH[^\]]*v(\d+)").expect("Invalid version regex"))
}

/// `<i>/<N>]` closing the `[PATCH ...]` tag.
fn position_regex() -> &'static Regex {
    POSITION
        .get_or_init(|| Regex::new(r"\[PATCH[^\]]*\s+(\d+)/(\d+)\]").expect("Invalid position regex"))
}

/// Whether a subject carries a `[PATCH` tag. `[RFC PATCH` does not count.
pub fn is_patch_title(title: &str) -> bool {
    title.contains("[PATCH")
}

/// Parse version and position from a patch subject.
///
/// Returns `None` for non-patch subjects.
pub fn parse_patch_info(title: &str) -> Option<PatchInfo> {
    if !is_patch_title(title) {
        return None;
    }

    let version = version_regex()
        .captures(title)
        .and_then(|caps| caps[1].parse().ok());

    let mut info = PatchInfo {
        version,
        ..PatchInfo::default()
    };
    if let Some(caps) = position_regex().captures(title) {
        info.patch_number = caps[1].parse().ok();
        info.total_patches = caps[2].parse().ok();
        info.is_series = true;
    }
    Some(info)
}

/// Turn a feed entry into a search hit.
pub fn to_search_item(entry: FeedEntry) -> SearchResultItem {
    let patch_info = parse_patch_info(&entry.title);
    SearchResultItem {
        is_patch: patch_info.is_some(),
        patch_info,
        message_id: entry.message_id,
        title: entry.title,
        author: entry.author,
        updated: entry.updated,
        url: entry.url,
    }
}
