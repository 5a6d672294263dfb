//! Public-inbox search query composition.
//!
//! Filters map to public-inbox (Xapian) prefixes:
//! - `s:<subsystem>` for the subject
//! - `f:<author>` for the sender
//! - `dt:<YYYYMMDD>..` for an open-ended date range

use chrono::NaiveDate;

use crate::error::{LoreError, Result};
use crate::model::feed::SearchFilters;

/// A validated search: free text plus optional filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub filters: SearchFilters,
}

impl SearchQuery {
    /// Validate and build a query. Blank filters count as absent.
    pub fn new(text: impl Into<String>, filters: SearchFilters) -> Result<Self> {
        let filters = SearchFilters {
            subsystem: non_blank(filters.subsystem),
            author: non_blank(filters.author),
            since_date: non_blank(filters.since_date),
        };
        if let Some(ref since) = filters.since_date {
            parse_since_date(since)?;
        }
        Ok(Self {
            text: text.into(),
            filters,
        })
    }

    /// The `q=` value sent to the archive: terms joined by single spaces.
    pub fn to_query_string(&self) -> String {
        let mut terms: Vec<String> = Vec::with_capacity(4);
        if !self.text.trim().is_empty() {
            terms.push(self.text.trim().to_string());
        }
        if let Some(ref subsystem) = self.filters.subsystem {
            terms.push(format!("s:{subsystem}"));
        }
        if let Some(ref author) = self.filters.author {
            terms.push(format!("f:{author}"));
        }
        if let Some(ref since) = self.filters.since_date {
            terms.push(format!("dt:{since}.."));
        }
        terms.join(" ")
    }
}

/// Check a `YYYYMMDD` date.
pub fn parse_since_date(value: &str) -> Result<NaiveDate> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LoreError::InvalidArgument(format!(
            "since date '{value}' must be 8 digits (YYYYMMDD)"
        )));
    }
    let field = |range: std::ops::Range<usize>| value[range].parse::<u32>().unwrap_or(0);
    let year = field(0..4) as i32;
    NaiveDate::from_ymd_opt(year, field(4..6), field(6..8)).ok_or_else(|| {
        LoreError::InvalidArgument(format!("since date '{value}' is not a valid date"))
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
