//! Archive URL layout.
//!
//! `lore.kernel.org` resolves any message id through `/r/<id>/`. Other
//! public-inbox instances only serve messages under their inbox name, so
//! every request against them needs one.

use reqwest::Url;

use crate::error::{LoreError, Result};
use crate::parser::header::normalize_message_id;

/// Host known to serve the universal `/r/` redirect.
const UNIVERSAL_REDIRECT_HOST: &str = "lore.kernel.org";

/// Inbox searched when none is given on a universal archive.
const ALL_INBOXES: &str = "all";

/// Per-message resources an archive serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageResource {
    /// Whole thread as gzip-compressed mbox.
    ThreadMbox,
    /// The message itself, RFC 822.
    Raw,
}

impl MessageResource {
    pub fn suffix(self) -> &'static str {
        match self {
            Self::ThreadMbox => "t.mbox.gz",
            Self::Raw => "raw",
        }
    }
}

/// Base URL of a public-inbox archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveBase {
    base: Url,
}

impl ArchiveBase {
    pub fn parse(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url.trim()).map_err(|e| {
            LoreError::InvalidArgument(format!("archive URL '{base_url}' is invalid: {e}"))
        })?;
        if base.cannot_be_a_base() || base.host_str().is_none() {
            return Err(LoreError::InvalidArgument(format!(
                "archive URL '{base_url}' has no host"
            )));
        }
        Ok(Self { base })
    }

    pub fn as_str(&self) -> &str {
        self.base.as_str()
    }

    pub fn host(&self) -> &str {
        self.base.host_str().unwrap_or_default()
    }

    /// Whether messages resolve without naming an inbox.
    pub fn supports_universal_redirect(&self) -> bool {
        self.host().eq_ignore_ascii_case(UNIVERSAL_REDIRECT_HOST)
    }

    /// URL of a per-message resource.
    ///
    /// The inbox is ignored on archives with the universal redirect and
    /// required everywhere else.
    pub fn message_url(
        &self,
        message_id: &str,
        inbox: Option<&str>,
        resource: MessageResource,
    ) -> Result<Url> {
        let scope = if self.supports_universal_redirect() {
            "r"
        } else {
            self.require_inbox(inbox)?
        };
        self.with_segments(&[scope, normalize_message_id(message_id), resource.suffix()])
    }

    /// URL of an Atom search feed for `query`.
    pub fn search_url(&self, query: &str, inbox: Option<&str>) -> Result<Url> {
        let scope = match non_empty(inbox) {
            Some(inbox) => inbox,
            None if self.supports_universal_redirect() => ALL_INBOXES,
            None => self.require_inbox(None)?,
        };
        let mut url = self.with_segments(&[scope, ""])?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("x", "A");
        Ok(url)
    }

    fn require_inbox<'a>(&self, inbox: Option<&'a str>) -> Result<&'a str> {
        non_empty(inbox).ok_or_else(|| LoreError::InboxRequired(self.host().to_string()))
    }

    fn with_segments(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|_| {
                LoreError::InvalidArgument(format!("archive URL '{}' has no path", self.base))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lore() -> ArchiveBase {
        ArchiveBase::parse("https://lore.kernel.org").unwrap()
    }

    fn sourceware() -> ArchiveBase {
        ArchiveBase::parse("https://inbox.sourceware.org").unwrap()
    }

    #[test]
    fn test_universal_redirect_detection() {
        assert!(lore().supports_universal_redirect());
        assert!(!sourceware().supports_universal_redirect());
        assert!(!ArchiveBase::parse("https://unknown-instance.example.com")
            .unwrap()
            .supports_universal_redirect());
    }

    #[test]
    fn test_lore_message_url_ignores_inbox() {
        for inbox in [None, Some("lkml")] {
            let url = lore()
                .message_url("test-message-id@example.com", inbox, MessageResource::ThreadMbox)
                .unwrap();
            assert_eq!(
                url.as_str(),
                "https://lore.kernel.org/r/test-message-id@example.com/t.mbox.gz"
            );
        }
    }

    #[test]
    fn test_other_archive_uses_inbox() {
        let url = sourceware()
            .message_url(
                "<test-message-id@example.com>",
                Some("gcc-patches"),
                MessageResource::ThreadMbox,
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://inbox.sourceware.org/gcc-patches/test-message-id@example.com/t.mbox.gz"
        );
    }

    #[test]
    fn test_other_archive_without_inbox_fails() {
        for inbox in [None, Some(""), Some("  ")] {
            let err = sourceware()
                .message_url("m@x", inbox, MessageResource::Raw)
                .unwrap_err();
            assert!(err.to_string().contains("inbox parameter is required"));
        }
        let err = sourceware().search_url("f:dev", None).unwrap_err();
        assert!(matches!(err, LoreError::InboxRequired(_)));
    }

    #[test]
    fn test_resource_suffixes() {
        let base = lore();
        for (resource, suffix) in [
            (MessageResource::ThreadMbox, "/t.mbox.gz"),
            (MessageResource::Raw, "/raw"),
        ] {
            let url = base.message_url("msg@example.com", None, resource).unwrap();
            assert!(url.as_str().ends_with(suffix));
        }
    }

    #[test]
    fn test_search_url() {
        let url = lore().search_url("f:dev@example.org", None).unwrap();
        assert_eq!(url.path(), "/all/");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("q".to_string(), "f:dev@example.org".to_string()),
                ("x".to_string(), "A".to_string())
            ]
        );

        let url = sourceware().search_url("s:x", Some("libc-alpha")).unwrap();
        assert_eq!(url.path(), "/libc-alpha/");
    }

    #[test]
    fn test_base_with_path_and_trailing_slash() {
        let base = ArchiveBase::parse("https://example.org/archives/").unwrap();
        let url = base
            .message_url("a@b", Some("dev"), MessageResource::Raw)
            .unwrap();
        assert_eq!(url.as_str(), "https://example.org/archives/dev/a@b/raw");
    }

    #[test]
    fn test_invalid_base() {
        assert!(ArchiveBase::parse("not a url").is_err());
        assert!(ArchiveBase::parse("mailto:dev@example.org").is_err());
    }
}
