//! Display-name resolution for attachments.

use crate::config::DecoderMode;
use crate::model::part::BodyPart;

use super::classify::MediaCategory;
use super::header::decode_header_value;

/// Outcome of name resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedName {
    /// Decoded display name.
    pub name: Option<String>,
    /// Disposition, present only when the name came from `name`/`filename`.
    pub disposition: Option<String>,
}

/// Pick and decode an attachment's display name.
///
/// `name` wins over `filename`; either copies the part's disposition.
/// Message parts are then always renamed to their description, or to their
/// subtype when there is none, even if a filename was found.
pub fn resolve_name(part: &BodyPart, category: MediaCategory, mode: DecoderMode) -> ResolvedName {
    let mut resolved = ResolvedName::default();

    if let Some(raw) = part.name.as_deref().or(part.filename.as_deref()) {
        resolved.name = Some(decode_header_value(raw, mode));
        resolved.disposition = part.disposition.clone();
    }

    if category == MediaCategory::Message {
        let raw = part.description.as_deref().unwrap_or(&part.subtype);
        resolved.name = Some(decode_header_value(raw, mode));
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::part::TypeCode;

    fn part(type_code: TypeCode, subtype: &str) -> BodyPart {
        BodyPart {
            type_code,
            subtype: subtype.to_string(),
            disposition: Some("attachment".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_name_beats_filename() {
        let mut p = part(TypeCode::APPLICATION, "pdf");
        p.name = Some("from-name.pdf".into());
        p.filename = Some("from-filename.pdf".into());
        let r = resolve_name(&p, MediaCategory::Application, DecoderMode::Generic);
        assert_eq!(r.name.as_deref(), Some("from-name.pdf"));
        assert_eq!(r.disposition.as_deref(), Some("attachment"));
    }

    #[test]
    fn test_filename_used_when_no_name() {
        let mut p = part(TypeCode::IMAGE, "png");
        p.filename = Some("photo.png".into());
        let r = resolve_name(&p, MediaCategory::Image, DecoderMode::Generic);
        assert_eq!(r.name.as_deref(), Some("photo.png"));
        assert_eq!(r.disposition.as_deref(), Some("attachment"));
    }

    #[test]
    fn test_nothing_to_resolve() {
        let mut p = part(TypeCode::APPLICATION, "octet-stream");
        p.description = Some("ignored for non-message parts".into());
        let r = resolve_name(&p, MediaCategory::Application, DecoderMode::Generic);
        assert_eq!(r, ResolvedName::default());
    }

    #[test]
    fn test_message_part_uses_subtype() {
        let p = part(TypeCode::MESSAGE, "rfc822");
        let r = resolve_name(&p, MediaCategory::Message, DecoderMode::Generic);
        assert_eq!(r.name.as_deref(), Some("rfc822"));
        assert!(r.disposition.is_none());
    }

    #[test]
    fn test_message_part_description_overrides_filename() {
        let mut p = part(TypeCode::MESSAGE, "rfc822");
        p.filename = Some("forward.eml".into());
        p.description = Some("Forwarded report".into());
        let r = resolve_name(&p, MediaCategory::Message, DecoderMode::Generic);
        assert_eq!(r.name.as_deref(), Some("Forwarded report"));
        // The filename step still contributed the disposition.
        assert_eq!(r.disposition.as_deref(), Some("attachment"));
    }

    #[test]
    fn test_encoded_name_is_decoded() {
        let mut p = part(TypeCode::APPLICATION, "pdf");
        p.name = Some("=?UTF-8?Q?r=C3=A9sum=C3=A9.pdf?=".into());
        let r = resolve_name(&p, MediaCategory::Application, DecoderMode::Generic);
        assert_eq!(r.name.as_deref(), Some("résumé.pdf"));
    }
}
