//! Persistence sink for saved attachments.

pub mod sink;
