//! Output: diff files on disk and plain-text reports.

pub mod diff;
pub mod text;
