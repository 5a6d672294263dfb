//! Local archive access: mbox files saved from an archive.

pub mod reader;
