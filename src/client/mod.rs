//! Blocking HTTP client for public-inbox archives.

pub mod url;

use std::ops::RangeInclusive;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::ArchiveConfig;
use crate::error::{LoreError, Result};
use crate::export::diff::DiffStore;
use crate::model::feed::{FeedEntry, SearchResult, SeriesResult};
use crate::model::message::{RawMessage, ThreadResult};
use crate::parser::atom::parse_feed;
use crate::parser::header::normalize_message_id;
use crate::parser::mbox::{decode_text, gunzip};
use crate::search::query::SearchQuery;
use crate::search::build_search_result;
use crate::series::reconstruct_series;
use crate::thread::{build_thread, ThreadOptions};

use self::url::{ArchiveBase, MessageResource};

/// Feed entries considered when reconstructing an author's series.
pub const SERIES_MAX_RESULTS: RangeInclusive<usize> = 1..=200;
pub const DEFAULT_SERIES_MAX_RESULTS: usize = 50;

/// Hits returned by a patch search.
pub const SEARCH_MAX_RESULTS: RangeInclusive<usize> = 1..=100;
pub const DEFAULT_SEARCH_MAX_RESULTS: usize = 20;

/// Client for one archive, optionally scoped to one inbox.
///
/// Requests are made one at a time and never retried.
pub struct ArchiveClient {
    http: reqwest::blocking::Client,
    base: ArchiveBase,
    inbox: Option<String>,
}

impl ArchiveClient {
    pub fn new(config: &ArchiveConfig) -> Result<Self> {
        let base = ArchiveBase::parse(&config.base_url)?;
        let http = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LoreError::http(base.as_str(), e))?;

        Ok(Self {
            http,
            base,
            inbox: config.inbox.clone().filter(|i| !i.trim().is_empty()),
        })
    }

    pub fn inbox(&self) -> Option<&str> {
        self.inbox.as_deref()
    }

    /// Fetch a whole thread and reduce each message.
    ///
    /// The thread mbox is always served gzip-compressed; a body that does not
    /// decompress fails the call with [`LoreError::Decompress`].
    pub fn get_thread(
        &self,
        message_id: &str,
        options: &ThreadOptions,
        diffs: Option<&DiffStore>,
    ) -> Result<ThreadResult> {
        let url = self
            .base
            .message_url(message_id, self.inbox(), MessageResource::ThreadMbox)?;
        let mbox = gunzip(&self.fetch(url)?)?;
        build_thread(message_id, &decode_text(&mbox), options, diffs)
    }

    /// Fetch one message verbatim.
    pub fn get_raw(&self, message_id: &str) -> Result<RawMessage> {
        let url = self
            .base
            .message_url(message_id, self.inbox(), MessageResource::Raw)?;
        let body = self.fetch(url)?;
        Ok(RawMessage {
            message_id: normalize_message_id(message_id).to_string(),
            raw: decode_text(&body),
        })
    }

    /// Recent patch series sent from `email`.
    pub fn get_user_series(&self, email: &str, max_results: usize) -> Result<SeriesResult> {
        check_range("max_results", max_results, &SERIES_MAX_RESULTS)?;
        let entries = self.fetch_feed(&format!("f:{}", email.trim()), max_results)?;
        let series = reconstruct_series(&entries);
        info!(email, entries = entries.len(), series = series.len(), "Found series");
        Ok(SeriesResult {
            email: email.to_string(),
            series,
        })
    }

    /// Search the archive and annotate every hit with patch metadata.
    pub fn search_patches(&self, query: &SearchQuery, max_results: usize) -> Result<SearchResult> {
        check_range("max_results", max_results, &SEARCH_MAX_RESULTS)?;
        let entries = self.fetch_feed(&query.to_query_string(), max_results)?;
        let result = build_search_result(query, entries);
        info!(query = %query.text, results = result.total_results, "Search done");
        Ok(result)
    }

    fn fetch_feed(&self, query: &str, max_results: usize) -> Result<Vec<FeedEntry>> {
        let url = self.base.search_url(query, self.inbox())?;
        let body = self.fetch(url)?;
        let mut entries = parse_feed(&body)?;
        entries.truncate(max_results);
        Ok(entries)
    }

    fn fetch(&self, url: reqwest::Url) -> Result<Vec<u8>> {
        debug!(url = %url, "GET");
        let response = self
            .http
            .get(url.clone())
            .send()
            .map_err(|e| LoreError::http(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoreError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .map_err(|e| LoreError::http(url.as_str(), e))?;
        debug!(url = %url, bytes = bytes.len(), "Fetched");
        Ok(bytes.to_vec())
    }
}

fn check_range(name: &str, value: usize, range: &RangeInclusive<usize>) -> Result<()> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(LoreError::InvalidArgument(format!(
            "{name} must be between {} and {}, got {value}",
            range.start(),
            range.end()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    fn client(base_url: &str, inbox: Option<&str>) -> ArchiveClient {
        ArchiveClient::new(&ArchiveConfig {
            base_url: base_url.to_string(),
            inbox: inbox.map(String::from),
            ..ArchiveConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_check_range() {
        assert!(check_range("n", 1, &SERIES_MAX_RESULTS).is_ok());
        assert!(check_range("n", 200, &SERIES_MAX_RESULTS).is_ok());
        assert!(check_range("n", 0, &SERIES_MAX_RESULTS).is_err());
        assert!(check_range("n", 101, &SEARCH_MAX_RESULTS).is_err());
    }

    #[test]
    fn test_requests_without_inbox_fail_before_network() {
        let c = client("https://inbox.sourceware.org", None);
        let options = ThreadOptions::default();

        let errors = [
            c.get_thread("m@x", &options, None).unwrap_err(),
            c.get_raw("m@x").unwrap_err(),
            c.get_user_series("dev@example.org", DEFAULT_SERIES_MAX_RESULTS)
                .unwrap_err(),
            c.search_patches(
                &SearchQuery::new("q", Default::default()).unwrap(),
                DEFAULT_SEARCH_MAX_RESULTS,
            )
            .unwrap_err(),
        ];
        for err in errors {
            assert!(err.to_string().contains("inbox parameter is required"), "{err}");
        }
    }

    #[test]
    fn test_out_of_range_max_results_rejected() {
        let c = client("https://lore.kernel.org", None);
        let err = c.get_user_series("dev@example.org", 0).unwrap_err();
        assert!(matches!(err, LoreError::InvalidArgument(_)));
        let query = SearchQuery::new("q", Default::default()).unwrap();
        assert!(matches!(
            c.search_patches(&query, 500).unwrap_err(),
            LoreError::InvalidArgument(_)
        ));
    }

    #[test]
    fn test_blank_inbox_treated_as_absent() {
        assert_eq!(client("https://lore.kernel.org", Some(" ")).inbox(), None);
        assert_eq!(
            client("https://lore.kernel.org", Some("lkml")).inbox(),
            Some("lkml")
        );
    }

    /// Serve one HTTP response on a loopback port and return its base URL.
    fn serve_once(content_type: &'static str, body: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            stream.write_all(head.as_bytes()).unwrap();
            stream.write_all(body).unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn test_uncompressed_thread_body_is_rejected() {
        let base = serve_once(
            "text/html",
            b"<html><body>Service temporarily unavailable</body></html>",
        );
        let c = client(&base, Some("lkml"));
        let err = c
            .get_thread("m@x", &ThreadOptions::default(), None)
            .unwrap_err();
        assert!(matches!(err, LoreError::Decompress(_)), "{err}");
        assert!(err.to_string().starts_with("Failed to decompress mbox data"));
    }

    #[test]
    fn test_gzip_thread_body_is_parsed() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        const MBOX: &str = "From a@x Mon Jan  1 00:00:00 2024\nFrom: A <a@x>\nSubject: [PATCH] a\nMessage-ID: <m@x>\n\nhello\n";
        let mut enc = GzEncoder::new(Vec::new(), Compression::fast());
        enc.write_all(MBOX.as_bytes()).unwrap();
        let gz: &'static [u8] = Box::leak(enc.finish().unwrap().into_boxed_slice());

        let c = client(&serve_once("application/gzip", gz), Some("lkml"));
        let thread = c
            .get_thread("<m@x>", &ThreadOptions::default(), None)
            .unwrap();
        assert_eq!(thread.message_id, "m@x");
        assert_eq!(thread.messages.len(), 1);
        assert_eq!(thread.messages[0].subject, "[PATCH] a");
        assert_eq!(thread.messages[0].body, "hello");
    }
}
