//! Payload decoding: content type, decoded bytes, declared size, content id.

use tracing::debug;

use crate::error::{AttachmentError, Result};
use crate::message::MessageContext;
use crate::model::part::BodyPart;

use super::classify::MediaCategory;

/// Everything the payload stage contributes to an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPayload {
    pub content_type: String,
    pub content: Vec<u8>,
    pub size: u64,
    pub id: Option<String>,
}

/// Decode a body part through the owning message's decode service.
///
/// The returned bytes are taken verbatim from the service. `size` is the
/// part's declared length, which may differ from `content.len()`.
pub fn decode_payload(
    part: &BodyPart,
    category: MediaCategory,
    message: &dyn MessageContext,
) -> Result<DecodedPayload> {
    let content_type = compose_content_type(category, &part.subtype);

    let content = message
        .decode_string(&part.content, &part.encoding)
        .map_err(|source| AttachmentError::PayloadDecode {
            encoding: part.encoding.to_string(),
            source,
        })?;

    debug!(
        part = part.part_number,
        encoding = %part.encoding,
        raw_len = part.content.len(),
        decoded_len = content.len(),
        "Decoded attachment payload"
    );

    Ok(DecodedPayload {
        content_type,
        content,
        size: part.bytes,
        id: part.id.as_deref().map(strip_content_id),
    })
}

/// `"<category>/<subtype>"` with the subtype lower-cased.
pub fn compose_content_type(category: MediaCategory, subtype: &str) -> String {
    format!("{category}/{}", subtype.to_lowercase())
}

/// Remove every `<` and `>` from a Content-ID.
pub fn strip_content_id(raw: &str) -> String {
    raw.chars().filter(|c| !matches!(c, '<' | '>')).collect()
}
