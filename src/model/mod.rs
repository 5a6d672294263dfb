//! Core data model types for threads, feed entries, series and search hits.

pub mod address;
pub mod feed;
pub mod message;
