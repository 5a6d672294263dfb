//! Archive parsing: mbox splitting, header decoding, MIME bodies and Atom feeds.

pub mod atom;
pub mod header;
pub mod mbox;
pub mod mime;
