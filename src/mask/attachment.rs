//! The default mask: base64 content, `data:` image sources, a summary line.

use humansize::{format_size, DECIMAL};

use crate::model::attachment::Attachment;

use super::{AttachmentView, DEFAULT_MASK};

/// Plain view over an attachment.
#[derive(Debug, Clone, Copy)]
pub struct AttachmentMask<'a> {
    parent: &'a Attachment,
}

impl<'a> AttachmentMask<'a> {
    pub fn new(parent: &'a Attachment) -> Self {
        Self { parent }
    }
}

/// Registry entry for [`AttachmentMask`].
pub fn factory(attachment: &Attachment) -> Box<dyn AttachmentView + '_> {
    Box::new(AttachmentMask::new(attachment))
}

impl AttachmentView for AttachmentMask<'_> {
    fn mask_name(&self) -> &str {
        DEFAULT_MASK
    }

    fn parent(&self) -> &Attachment {
        self.parent
    }

    /// `name (content/type, size)`
    fn render(&self) -> String {
        format!(
            "{} ({}, {})",
            self.parent.name().unwrap_or("unnamed"),
            self.parent.content_type(),
            format_size(self.parent.size(), DECIMAL)
        )
    }
}
