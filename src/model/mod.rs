//! Core data model: the incoming body part, the attachment, and its attributes.

pub mod attachment;
pub mod attribute;
pub mod part;
