//! The attachment entity.
//!
//! Built eagerly from a [`BodyPart`]: classification, payload decoding and
//! name resolution all run inside [`Attachment::new`]. Afterwards the
//! attachment is plain data with typed getters and setters, a generic
//! name-based accessor surface, and lazily created masks.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::{AttachmentError, Result};
use crate::mask::{AttachmentView, DEFAULT_MASK};
use crate::message::MessageContext;
use crate::parser::classify::{classify, MediaCategory};
use crate::parser::header::decode_header_value;
use crate::parser::name::resolve_name;
use crate::parser::payload::{decode_payload, strip_content_id};
use crate::sniff;
use crate::store::sink::{sanitize_filename, FsSink, StorageSink};

use super::attribute::{normalize_key, Attribute, AttributeValue, DERIVED_ATTRIBUTES};
use super::part::BodyPart;

/// A decoded MIME attachment belonging to one message.
pub struct Attachment {
    message: Arc<dyn MessageContext>,
    mask: String,

    part_number: usize,
    size: u64,
    content: Vec<u8>,
    media_type: MediaCategory,
    content_type: String,
    id: Option<String>,
    name: Option<String>,
    disposition: Option<String>,
    img_src: Option<String>,

    /// Ad-hoc attributes set through the generic accessor.
    extras: BTreeMap<String, AttributeValue>,
}

/// Serializable snapshot used for listings and `--json` output.
#[derive(Debug, Clone, Serialize)]
pub struct AttachmentSummary {
    pub part_number: usize,
    #[serde(rename = "type")]
    pub media_type: MediaCategory,
    pub content_type: String,
    pub id: Option<String>,
    pub name: Option<String>,
    pub disposition: Option<String>,
    pub img_src: Option<String>,
    pub size: u64,
    pub decoded_size: usize,
    pub mime_type: String,
    pub extension: Option<String>,
    pub sha256: String,
    pub mask: String,
}

impl Attachment {
    /// Build an attachment from `part`, owned by `message`.
    ///
    /// Fails only if the message's decode service rejects the payload; no
    /// partially populated attachment is ever returned.
    pub fn new(message: Arc<dyn MessageContext>, part: BodyPart) -> Result<Self> {
        let media_type = classify(part.type_code);
        let payload = decode_payload(&part, media_type, message.as_ref())?;
        let resolved = resolve_name(&part, media_type, message.options().decoder_mode);

        let mask = message
            .default_attachment_mask()
            .unwrap_or(DEFAULT_MASK)
            .to_string();

        debug!(
            part = part.part_number,
            content_type = %payload.content_type,
            name = resolved.name.as_deref().unwrap_or(""),
            "Built attachment"
        );

        Ok(Self {
            message,
            mask,
            part_number: part.part_number,
            size: payload.size,
            content: payload.content,
            media_type,
            content_type: payload.content_type,
            id: payload.id,
            name: resolved.name,
            disposition: resolved.disposition,
            img_src: None,
            extras: BTreeMap::new(),
        })
    }

    // ── Typed getters ───────────────────────────────────────────

    pub fn part_number(&self) -> usize {
        self.part_number
    }

    /// Declared size of the part; not necessarily `content().len()`.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn media_type(&self) -> MediaCategory {
        self.media_type
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn disposition(&self) -> Option<&str> {
        self.disposition.as_deref()
    }

    pub fn img_src(&self) -> Option<&str> {
        self.img_src.as_deref()
    }

    /// The owning message.
    pub fn message(&self) -> &Arc<dyn MessageContext> {
        &self.message
    }

    // ── Typed setters ───────────────────────────────────────────

    pub fn set_part_number(&mut self, part_number: usize) {
        self.part_number = part_number;
    }

    pub fn set_size(&mut self, size: u64) {
        self.size = size;
    }

    pub fn set_content(&mut self, content: Vec<u8>) {
        self.content = content;
    }

    pub fn set_media_type(&mut self, media_type: MediaCategory) {
        self.media_type = media_type;
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = content_type.into();
    }

    /// Set the content id; `<` and `>` are removed.
    pub fn set_id(&mut self, id: &str) {
        self.id = Some(strip_content_id(id));
    }

    /// Set the name from a raw header value, decoding it with the message's
    /// configured decoder.
    pub fn set_name(&mut self, raw: &str) {
        self.name = Some(decode_header_value(
            raw,
            self.message.options().decoder_mode,
        ));
    }

    pub fn set_disposition(&mut self, disposition: impl Into<String>) {
        self.disposition = Some(disposition.into());
    }

    pub fn set_img_src(&mut self, img_src: impl Into<String>) {
        self.img_src = Some(img_src.into());
    }

    // ── Generic accessor surface ────────────────────────────────

    /// Read an attribute by name (`snake_case` or `camelCase`).
    ///
    /// Unset attributes and names nobody ever set read as `None`.
    pub fn get(&self, name: &str) -> Option<AttributeValue> {
        match Attribute::lookup(name) {
            Some(attr) => self.get_known(attr),
            None => self.extras.get(&normalize_key(name)).cloned(),
        }
    }

    /// Write an attribute by name and return the stored value.
    ///
    /// Unknown names are kept as ad-hoc attributes. Derived queries
    /// (`mime_type`, `extension`) and values of the wrong shape for a known
    /// attribute are rejected with [`AttachmentError::UnsupportedAccessor`].
    pub fn set(&mut self, name: &str, value: impl Into<AttributeValue>) -> Result<AttributeValue> {
        let value = value.into();
        let Some(attr) = Attribute::lookup(name) else {
            let key = normalize_key(name);
            if DERIVED_ATTRIBUTES.contains(&key.as_str()) {
                return Err(AttachmentError::UnsupportedAccessor(format!(
                    "'{key}' is derived from the content and cannot be set"
                )));
            }
            self.extras.insert(key, value.clone());
            return Ok(value);
        };

        let mismatch = |value: &AttributeValue, expected: &str| {
            AttachmentError::UnsupportedAccessor(format!(
                "'{attr}' expects {expected}, got {}",
                value.kind()
            ))
        };

        match (attr, value) {
            (Attribute::PartNumber, AttributeValue::Integer(n)) => {
                let n = usize::try_from(n).map_err(|_| {
                    AttachmentError::UnsupportedAccessor(format!("'{attr}' out of range: {n}"))
                })?;
                self.set_part_number(n);
            }
            (Attribute::Size, AttributeValue::Integer(n)) => self.set_size(n),
            (Attribute::Content, AttributeValue::Bytes(b)) => self.set_content(b),
            (Attribute::Content, AttributeValue::Text(s)) => self.set_content(s.into_bytes()),
            (Attribute::Type, AttributeValue::Text(s)) => {
                let category = s.parse().map_err(AttachmentError::UnsupportedAccessor)?;
                self.set_media_type(category);
            }
            (Attribute::ContentType, AttributeValue::Text(s)) => self.set_content_type(s),
            (Attribute::Id, AttributeValue::Text(s)) => self.set_id(&s),
            (Attribute::Name, AttributeValue::Text(s)) => self.set_name(&s),
            (Attribute::Disposition, AttributeValue::Text(s)) => self.set_disposition(s),
            (Attribute::ImgSrc, AttributeValue::Text(s)) => self.set_img_src(s),
            (Attribute::PartNumber | Attribute::Size, other) => {
                return Err(mismatch(&other, "an integer"))
            }
            (Attribute::Content, other) => return Err(mismatch(&other, "bytes or text")),
            (_, other) => return Err(mismatch(&other, "text")),
        }

        self.get_known(attr).ok_or_else(|| {
            AttachmentError::UnsupportedAccessor(format!("'{attr}' could not be stored"))
        })
    }

    /// Every attribute that currently holds a value, ad-hoc ones included.
    pub fn attributes(&self) -> BTreeMap<String, AttributeValue> {
        let mut all: BTreeMap<String, AttributeValue> = Attribute::ALL
            .into_iter()
            .filter_map(|attr| self.get_known(attr).map(|v| (attr.as_str().to_string(), v)))
            .collect();
        for (key, value) in &self.extras {
            all.entry(key.clone()).or_insert_with(|| value.clone());
        }
        all
    }

    fn get_known(&self, attr: Attribute) -> Option<AttributeValue> {
        let text = |s: &Option<String>| s.clone().map(AttributeValue::Text);
        match attr {
            Attribute::PartNumber => Some(AttributeValue::Integer(self.part_number as u64)),
            Attribute::Size => Some(AttributeValue::Integer(self.size)),
            Attribute::Content => Some(AttributeValue::Bytes(self.content.clone())),
            Attribute::Type => Some(AttributeValue::Text(self.media_type.to_string())),
            Attribute::ContentType => Some(AttributeValue::Text(self.content_type.clone())),
            Attribute::Id => text(&self.id),
            Attribute::Name => text(&self.name),
            Attribute::Disposition => text(&self.disposition),
            Attribute::ImgSrc => text(&self.img_src),
        }
    }

    // ── Derived queries ─────────────────────────────────────────

    /// MIME type sniffed from the decoded content.
    pub fn mime_type(&self) -> String {
        sniff::sniff_mime_type(&self.content)
    }

    /// File extension matching [`mime_type`](Self::mime_type).
    pub fn extension(&self) -> Option<&'static str> {
        sniff::extension_for_mime(&self.mime_type())
    }

    /// Hex SHA-256 of the decoded content.
    pub fn sha256(&self) -> String {
        format!("{:x}", Sha256::digest(&self.content))
    }

    pub fn summary(&self) -> AttachmentSummary {
        AttachmentSummary {
            part_number: self.part_number,
            media_type: self.media_type,
            content_type: self.content_type.clone(),
            id: self.id.clone(),
            name: self.name.clone(),
            disposition: self.disposition.clone(),
            img_src: self.img_src.clone(),
            size: self.size,
            decoded_size: self.content.len(),
            mime_type: self.mime_type(),
            extension: self.extension().map(String::from),
            sha256: self.sha256(),
            mask: self.mask.clone(),
        }
    }

    // ── Persistence ─────────────────────────────────────────────

    /// Write the content to `path` + `filename` (or the resolved name).
    ///
    /// `path` is used as a prefix, so directories need a trailing separator.
    /// Returns `false` if there is nothing to name the file or the write fails.
    pub fn save(&self, path: &str, filename: Option<&str>) -> bool {
        self.save_to(&FsSink, path, filename)
    }

    /// [`save`](Self::save) through an arbitrary sink.
    pub fn save_to(&self, sink: &dyn StorageSink, path: &str, filename: Option<&str>) -> bool {
        let Some(filename) = self.save_filename(filename) else {
            warn!(
                part = self.part_number,
                "Attachment has no name and no filename was given, not saving"
            );
            return false;
        };

        let target = PathBuf::from(format!("{path}{filename}"));
        match sink.put(&target, &self.content) {
            Ok(()) => {
                debug!(path = %target.display(), bytes = self.content.len(), "Saved attachment");
                true
            }
            Err(e) => {
                warn!(path = %target.display(), error = %e, "Failed to save attachment");
                false
            }
        }
    }

    /// The file name [`save`](Self::save) appends to its path.
    ///
    /// An explicit `filename` is used verbatim. The resolved name is passed
    /// through [`sanitize_filename`] first, so a header value cannot climb out
    /// of the target directory.
    pub fn save_filename(&self, filename: Option<&str>) -> Option<String> {
        match (filename, self.name.as_deref()) {
            (Some(f), _) if !f.is_empty() => Some(f.to_string()),
            (_, Some(name)) => Some(sanitize_filename(name)),
            _ => None,
        }
    }

    // ── Masks ───────────────────────────────────────────────────

    /// Name of the mask used when [`mask`](Self::mask) gets no identifier.
    pub fn mask_name(&self) -> &str {
        &self.mask
    }

    /// Change the default mask. Unknown names are ignored; read
    /// [`mask_name`](Self::mask_name) back to confirm.
    pub fn set_mask(&mut self, name: &str) -> &mut Self {
        if self.message.masks().contains(name) {
            self.mask = name.to_string();
        } else {
            debug!(mask = name, "Ignoring unknown mask");
        }
        self
    }

    /// A view of this attachment through `name`, or the default mask.
    pub fn mask(&self, name: Option<&str>) -> Result<Box<dyn AttachmentView + '_>> {
        let name = name.unwrap_or(&self.mask);
        debug!(mask = name, part = self.part_number, "Resolving mask");
        self.message.masks().instantiate(name, self)
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("part_number", &self.part_number)
            .field("type", &self.media_type)
            .field("content_type", &self.content_type)
            .field("id", &self.id)
            .field("name", &self.name)
            .field("disposition", &self.disposition)
            .field("img_src", &self.img_src)
            .field("size", &self.size)
            .field("content_len", &self.content.len())
            .field("mask", &self.mask)
            .finish_non_exhaustive()
    }
}
