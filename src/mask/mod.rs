//! Masks: alternate read-only views of an attachment.
//!
//! A mask borrows its attachment and reads through to it. Masks are looked up
//! by name in a [`MaskRegistry`]; the built-in registry knows `"attachment"`
//! and `"template"`, and callers may register their own at startup.

pub mod attachment;
pub mod template;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{AttachmentError, Result};
use crate::model::attachment::Attachment;
use crate::model::attribute::AttributeValue;

pub use attachment::AttachmentMask;
pub use template::TemplateMask;

/// Mask used when neither the caller nor the message configuration names one.
pub const DEFAULT_MASK: &str = "attachment";

/// Registry holding the built-in masks only.
pub static BUILTIN_MASKS: LazyLock<MaskRegistry> = LazyLock::new(MaskRegistry::builtin);

/// Builds a view over an attachment.
pub type MaskFactory = for<'a> fn(&'a Attachment) -> Box<dyn AttachmentView + 'a>;

/// A read-only presentation of an attachment.
pub trait AttachmentView {
    /// Registry name of the view.
    fn mask_name(&self) -> &str;

    /// The attachment the view reads through to.
    fn parent(&self) -> &Attachment;

    /// The view's rendering of the attachment.
    fn render(&self) -> String;

    /// Read an attribute of the underlying attachment.
    fn get(&self, attribute: &str) -> Option<AttributeValue> {
        self.parent().get(attribute)
    }

    /// Decoded content, base64-encoded.
    fn content_base64(&self) -> String {
        STANDARD.encode(self.parent().content())
    }

    /// A `data:` URI of the content under its declared content type.
    fn image_src(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.parent().content_type(),
            self.content_base64()
        )
    }
}

/// Name → factory lookup for masks.
#[derive(Clone)]
pub struct MaskRegistry {
    factories: BTreeMap<String, MaskFactory>,
}

impl MaskRegistry {
    /// A registry with no masks at all.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// A registry with the built-in `attachment` and `template` masks.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(DEFAULT_MASK, attachment::factory);
        registry.register(template::TEMPLATE_MASK, template::factory);
        registry
    }

    /// Register (or replace) a mask. Returns the factory it replaced.
    pub fn register(&mut self, name: impl Into<String>, factory: MaskFactory) -> Option<MaskFactory> {
        self.factories.insert(name.into(), factory)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Build the view `name` over `attachment`.
    pub fn instantiate<'a>(
        &self,
        name: &str,
        attachment: &'a Attachment,
    ) -> Result<Box<dyn AttachmentView + 'a>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| AttachmentError::AdapterNotFound(name.to_string()))?;
        Ok(factory(attachment))
    }
}

impl Default for MaskRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for MaskRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}
