//! The owning message, as seen from an attachment.
//!
//! An attachment needs very little from its message: a decode service for
//! transfer-encoded payloads, the attachment options, and the mask registry.

use crate::config::AttachmentOptions;
use crate::mask::{MaskRegistry, BUILTIN_MASKS};
use crate::model::part::TransferEncoding;
use crate::parser::transfer::{decode_transfer, DecodeFailure};

/// Services a parent message offers to its attachments.
pub trait MessageContext {
    /// Decode a transfer-encoded payload. The attachment uses the result verbatim.
    fn decode_string(
        &self,
        raw: &[u8],
        encoding: &TransferEncoding,
    ) -> Result<Vec<u8>, DecodeFailure>;

    /// Options governing name decoding and the default mask.
    fn options(&self) -> &AttachmentOptions;

    /// Client-level default mask, if one is configured.
    fn default_attachment_mask(&self) -> Option<&str> {
        self.options().default_mask.as_deref()
    }

    /// Masks attachments of this message can be viewed through.
    fn masks(&self) -> &MaskRegistry {
        &BUILTIN_MASKS
    }
}

/// A ready-made message context using the standard transfer decoder.
#[derive(Debug, Clone, Default)]
pub struct StandardMessage {
    options: AttachmentOptions,
    masks: MaskRegistry,
}

impl StandardMessage {
    /// A message with the given options and the built-in masks.
    pub fn new(options: AttachmentOptions) -> Self {
        Self {
            options,
            masks: MaskRegistry::builtin(),
        }
    }

    /// Replace the mask registry, e.g. after registering custom views.
    pub fn with_masks(mut self, masks: MaskRegistry) -> Self {
        self.masks = masks;
        self
    }
}

impl MessageContext for StandardMessage {
    fn decode_string(
        &self,
        raw: &[u8],
        encoding: &TransferEncoding,
    ) -> Result<Vec<u8>, DecodeFailure> {
        decode_transfer(raw, encoding)
    }

    fn options(&self) -> &AttachmentOptions {
        &self.options
    }

    fn masks(&self) -> &MaskRegistry {
        &self.masks
    }
}
