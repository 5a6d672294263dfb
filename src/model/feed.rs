//! Atom feed entries and the series / search results derived from them.

use serde::{Deserialize, Serialize};

/// One `<entry>` of a public-inbox Atom feed, in feed order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    /// Last path segment of the entry link.
    pub message_id: String,
    pub title: String,
    /// `<author><name>`, empty when absent.
    pub author: String,
    /// `<updated>` timestamp, verbatim.
    pub updated: String,
    /// `<link href>`.
    pub url: String,
}

/// How a series was represented in the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    /// `[PATCH 0/N]`.
    CoverLetter,
    /// `[PATCH 1/N]` of a series whose cover letter was not in the feed.
    FirstPatch,
    /// `[PATCH]` without a position.
    SinglePatch,
}

impl SeriesKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CoverLetter => "cover_letter",
            Self::FirstPatch => "first_patch",
            Self::SinglePatch => "single_patch",
        }
    }
}

impl std::fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The representative entry of one logical patch series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesEntry {
    pub message_id: String,
    pub title: String,
    pub updated: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: SeriesKind,
    /// Always at least 1.
    pub total_patches: u32,
}

/// Series posted by one author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesResult {
    pub email: String,
    pub series: Vec<SeriesEntry>,
}

/// Version and position parsed from a `[PATCH ...]` subject tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchInfo {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub version: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub patch_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub total_patches: Option<u32>,
    /// `true` when the tag carries an `i/N` position.
    pub is_series: bool,
}

/// One search hit. Hits are never grouped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub message_id: String,
    pub title: String,
    pub author: String,
    pub updated: String,
    pub url: String,
    pub is_patch: bool,
    pub patch_info: Option<PatchInfo>,
}

/// Optional filters applied on top of the free-text query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub subsystem: Option<String>,
    pub author: Option<String>,
    /// `YYYYMMDD`.
    pub since_date: Option<String>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.subsystem.is_none() && self.author.is_none() && self.since_date.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub query: String,
    pub filters: SearchFilters,
    pub total_results: usize,
    pub results: Vec<SearchResultItem>,
}
