//! `mimeattach`: decode, name and present email MIME attachments.
//!
//! Given a body part produced by a MIME parser and the message that owns it,
//! [`Attachment::new`](model::attachment::Attachment::new) classifies the
//! part, decodes its payload, resolves a display name, and exposes the result
//! through typed and name-based accessors plus pluggable views ("masks").

pub mod config;
pub mod error;
pub mod mask;
pub mod message;
pub mod model;
pub mod parser;
pub mod sniff;
pub mod store;

pub use error::{AttachmentError, Result};
pub use model::attachment::Attachment;
pub use model::part::BodyPart;
