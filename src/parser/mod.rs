//! Attachment pipeline stages: classification, payload decoding, naming.

pub mod classify;
pub mod header;
pub mod name;
pub mod payload;
pub mod transfer;
