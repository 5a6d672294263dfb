//! `loreshell`: a command-line client for public-inbox mail archives.
//!
//! This crate provides the core library for fetching threads, raw
//! messages, patch series and search results from archives such as
//! lore.kernel.org, and for reducing them to compact, readable context.

pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod parser;
pub mod search;
pub mod series;
pub mod store;
pub mod thread;
