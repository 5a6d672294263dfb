//! Subject-tag classification and series grouping keys.

use std::sync::OnceLock;

use regex::Regex;

static COVER: OnceLock<Regex> = OnceLock::new();
static NUMBERED: OnceLock<Regex> = OnceLock::new();
static PATCH_TAG: OnceLock<Regex> = OnceLock::new();
static POSITION_AFTER_TAG: OnceLock<Regex> = OnceLock::new();
static ID_PREFIX: OnceLock<Regex> = OnceLock::new();
static VERSION_TOKEN: OnceLock<Regex> = OnceLock::new();

/// `[PATCH 0/N]`, `[RFC PATCH v2 0/N]`, ...
fn cover_regex() -> &'static Regex {
    COVER.get_or_init(|| {
        Regex::new(r"\[(?:RFC\s+)?PATCH[^\]]*\s+0/(\d+)\]").expect("Invalid cover regex")
    })
}

/// `[PATCH i/N]` with any index.
fn numbered_regex() -> &'static Regex {
    NUMBERED.get_or_init(|| {
        Regex::new(r"\[(?:RFC\s+)?PATCH[^\]]*\s+(\d+)/(\d+)\]").expect("Invalid numbered regex")
    })
}

/// Any `[PATCH ...]` tag.
fn patch_tag_regex() -> &'static Regex {
    PATCH_TAG.get_or_init(|| {
        Regex::new(r"\[(?:RFC\s+)?PATCH[^\]]*\]").expect("Invalid patch tag regex")
    })
}

/// A position written after the tag, as in `[PATCH] 2/3`.
fn position_after_tag_regex() -> &'static Regex {
    POSITION_AFTER_TAG.get_or_init(|| {
        Regex::new(r"^\s+\d+/\d+").expect("Invalid trailing position regex")
    })
}

/// `git send-email` ids: `<date>.<time>-<n>-<sender>`.
fn id_prefix_regex() -> &'static Regex {
    ID_PREFIX.get_or_init(|| Regex::new(r"^(\d+\.\d+)-\d+-").expect("Invalid message id regex"))
}

fn version_token_regex() -> &'static Regex {
    VERSION_TOKEN.get_or_init(|| {
        Regex::new(r"(\[(?:RFC\s+)?PATCH)\s+v\d+").expect("Invalid version token regex")
    })
}

/// What a subject line says about its place in a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleClass {
    /// `[PATCH 0/N]`.
    CoverLetter { total: u32 },
    /// `[PATCH i/N]`, `i >= 1`.
    NumberedPatch { index: u32, total: u32 },
    /// `[PATCH]` with no position.
    SinglePatch,
    /// No recognizable patch tag.
    Unclassified,
}

impl TitleClass {
    /// Classify a subject. Cover letters win over numbered patches, and
    /// numbered patches over bare tags.
    pub fn of(title: &str) -> Self {
        if let Some(caps) = cover_regex().captures(title) {
            return Self::CoverLetter {
                total: parse_count(&caps[1]),
            };
        }
        if let Some(caps) = numbered_regex().captures(title) {
            return Self::NumberedPatch {
                index: parse_count(&caps[1]),
                total: parse_count(&caps[2]),
            };
        }
        let has_bare_tag = patch_tag_regex()
            .find_iter(title)
            .any(|tag| !position_after_tag_regex().is_match(&title[tag.end()..]));
        if has_bare_tag {
            Self::SinglePatch
        } else {
            Self::Unclassified
        }
    }
}

/// Identity of a logical series within one feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SeriesKey {
    /// Shared `<date>.<time>` prefix of `git send-email` message ids.
    MessageIdPrefix(String),
    /// Subject with version and position normalized away.
    Title(String),
}

impl SeriesKey {
    /// Derive the key for an entry.
    ///
    /// The message-id prefix is preferred; otherwise `PATCH vN` becomes
    /// `PATCH` and any positioned tag becomes `[PATCH X/N]`, so that all
    /// parts and revisions of a series share one key.
    pub fn derive(message_id: &str, title: &str) -> Self {
        if let Some(caps) = id_prefix_regex().captures(message_id) {
            return Self::MessageIdPrefix(caps[1].to_string());
        }
        let unversioned = version_token_regex().replace_all(title, "${1}");
        let normalized = numbered_regex().replace_all(&unversioned, "[PATCH X/N]");
        Self::Title(normalized.into_owned())
    }
}

/// Decimal count, saturating on overflow.
fn parse_count(digits: &str) -> u32 {
    digits.parse().unwrap_or(u32::MAX)
}
