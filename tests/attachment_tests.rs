//! Integration tests for attachment construction, naming, masks and saving.

use std::cell::Cell;
use std::path::Path;
use std::sync::Arc;

use mimeattach::config::{AttachmentOptions, DecoderMode};
use mimeattach::mask::{AttachmentView, MaskRegistry, TemplateMask};
use mimeattach::message::{MessageContext, StandardMessage};
use mimeattach::model::attribute::AttributeValue;
use mimeattach::model::part::{load_manifest, BodyPart, TransferEncoding, TypeCode};
use mimeattach::parser::classify::MediaCategory;
use mimeattach::parser::transfer::DecodeFailure;
use mimeattach::store::sink::StorageSink;
use mimeattach::{Attachment, AttachmentError};

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn standard() -> Arc<dyn MessageContext> {
    Arc::new(StandardMessage::new(AttachmentOptions::default()))
}

fn with_options(options: AttachmentOptions) -> Arc<dyn MessageContext> {
    Arc::new(StandardMessage::new(options))
}

fn part(type_code: TypeCode, subtype: &str) -> BodyPart {
    BodyPart {
        type_code,
        subtype: subtype.to_string(),
        content: b"payload".to_vec(),
        bytes: 7,
        ..Default::default()
    }
}

/// A message whose decode service refuses everything.
struct RejectingMessage {
    options: AttachmentOptions,
}

impl MessageContext for RejectingMessage {
    fn decode_string(&self, _raw: &[u8], encoding: &TransferEncoding) -> Result<Vec<u8>, DecodeFailure> {
        Err(DecodeFailure::Unsupported(encoding.to_string()))
    }

    fn options(&self) -> &AttachmentOptions {
        &self.options
    }
}

/// A message that records what it was asked to decode and returns fixed bytes.
struct RecordingMessage {
    options: AttachmentOptions,
    calls: Cell<usize>,
    last_encoding: Cell<Option<&'static str>>,
}

impl MessageContext for RecordingMessage {
    fn decode_string(&self, _raw: &[u8], encoding: &TransferEncoding) -> Result<Vec<u8>, DecodeFailure> {
        self.calls.set(self.calls.get() + 1);
        self.last_encoding.set(Some(match encoding {
            TransferEncoding::Base64 => "base64",
            TransferEncoding::QuotedPrintable => "quoted-printable",
            _ => "other",
        }));
        Ok(b"from the service".to_vec())
    }

    fn options(&self) -> &AttachmentOptions {
        &self.options
    }
}

/// A sink whose writes always fail.
struct BrokenSink;

impl StorageSink for BrokenSink {
    fn put(&self, _target: &Path, _data: &[u8]) -> std::io::Result<()> {
        Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"))
    }
}

// ─── Classification & content type ─────────────────────────────────

#[test]
fn test_content_type_for_every_category() {
    let cases = [
        (TypeCode::TEXT, "text"),
        (TypeCode::MULTIPART, "multipart"),
        (TypeCode::MESSAGE, "message"),
        (TypeCode::APPLICATION, "application"),
        (TypeCode::AUDIO, "audio"),
        (TypeCode::IMAGE, "image"),
        (TypeCode::VIDEO, "video"),
        (TypeCode::MODEL, "model"),
        (TypeCode::OTHER, "other"),
        (TypeCode(77), "other"),
    ];
    for (code, category) in cases {
        let a = Attachment::new(standard(), part(code, "X-Mixed-Case")).unwrap();
        assert_eq!(a.content_type(), format!("{category}/x-mixed-case"));
        assert_eq!(a.media_type().as_str(), category);
    }
}

// ─── Payload decoding ───────────────────────────────────────────────

#[test]
fn test_fixture_pdf_decodes_and_keeps_declared_size() {
    let parts = load_manifest(&fixture("invoice.json")).unwrap();
    let a = Attachment::new(standard(), parts.into_iter().next().unwrap()).unwrap();

    assert!(a.content().starts_with(b"%PDF-1.4"));
    assert_eq!(a.content().len(), 51);
    // Declared size is kept even though it differs from the decoded length.
    assert_eq!(a.size(), 68);
    assert_eq!(a.content_type(), "application/pdf");
    assert_eq!(a.mime_type(), "application/pdf");
    assert_eq!(a.extension(), Some("pdf"));
}

#[test]
fn test_decode_service_gets_declared_encoding_and_is_used_verbatim() {
    let message = Arc::new(RecordingMessage {
        options: AttachmentOptions::default(),
        calls: Cell::new(0),
        last_encoding: Cell::new(None),
    });
    let mut p = part(TypeCode::APPLICATION, "octet-stream");
    p.encoding = TransferEncoding::QuotedPrintable;

    let a = Attachment::new(message.clone(), p).unwrap();
    assert_eq!(a.content(), b"from the service");
    assert_eq!(message.calls.get(), 1);
    assert_eq!(message.last_encoding.get(), Some("quoted-printable"));
}

#[test]
fn test_decode_failure_aborts_construction() {
    let message = Arc::new(RejectingMessage {
        options: AttachmentOptions::default(),
    });
    let mut p = part(TypeCode::IMAGE, "png");
    p.encoding = TransferEncoding::Base64;

    let err = Attachment::new(message, p).unwrap_err();
    match err {
        AttachmentError::PayloadDecode { encoding, .. } => assert_eq!(encoding, "base64"),
        other => panic!("expected PayloadDecode, got {other:?}"),
    }
}

#[test]
fn test_invalid_base64_is_payload_decode_error() {
    let mut p = part(TypeCode::IMAGE, "png");
    p.encoding = TransferEncoding::Base64;
    p.content = b"@@@@ not base64 @@@@".to_vec();
    assert!(matches!(
        Attachment::new(standard(), p),
        Err(AttachmentError::PayloadDecode { .. })
    ));
}

#[test]
fn test_content_id_delimiters_stripped() {
    for raw in ["<abc123>", "abc123", "<abc123", "abc123>", "<<abc123>>"] {
        let mut p = part(TypeCode::IMAGE, "gif");
        p.id = Some(raw.to_string());
        let a = Attachment::new(standard(), p).unwrap();
        assert_eq!(a.id(), Some("abc123"), "raw id {raw}");
    }

    let a = Attachment::new(standard(), part(TypeCode::IMAGE, "gif")).unwrap();
    assert_eq!(a.id(), None);
}

// ─── Name resolution ────────────────────────────────────────────────

#[test]
fn test_encoded_word_name_and_disposition() {
    let parts = load_manifest(&fixture("invoice.json")).unwrap();
    let a = Attachment::new(standard(), parts.into_iter().next().unwrap()).unwrap();
    assert_eq!(a.name(), Some("résumé.pdf"));
    assert_eq!(a.disposition(), Some("attachment"));
}

#[test]
fn test_encoded_word_name_with_legacy_decoder() {
    let options = AttachmentOptions {
        decoder_mode: DecoderMode::LegacyCharset,
        default_mask: None,
    };
    let mut p = part(TypeCode::APPLICATION, "pdf");
    p.name = Some("=?ISO-8859-1?Q?r=E9sum=E9.pdf?=".to_string());
    p.disposition = Some("attachment".to_string());
    let a = Attachment::new(with_options(options), p).unwrap();
    assert_eq!(a.name(), Some("résumé.pdf"));
}

#[test]
fn test_encoded_stem_with_literal_extension() {
    for mode in [DecoderMode::Generic, DecoderMode::LegacyCharset] {
        for raw in [
            "=?UTF-8?Q?r=C3=A9sum=C3=A9?=.pdf",
            "=?UTF-8?B?csOpc3Vtw6k=?=.pdf",
        ] {
            let options = AttachmentOptions {
                decoder_mode: mode,
                default_mask: None,
            };
            let mut p = part(TypeCode::APPLICATION, "pdf");
            p.filename = Some(raw.to_string());
            let a = Attachment::new(with_options(options), p).unwrap();
            assert_eq!(a.name(), Some("résumé.pdf"), "{raw} with {mode:?}");
        }
    }
}

#[test]
fn test_save_uses_decoded_stem_name() {
    let dir = tempfile::tempdir().unwrap();
    let prefix = format!("{}/", dir.path().display());
    let mut p = part(TypeCode::APPLICATION, "pdf");
    p.name = Some("=?UTF-8?Q?r=C3=A9sum=C3=A9?=.pdf".to_string());
    let a = Attachment::new(standard(), p).unwrap();

    assert!(a.save(&prefix, None));
    assert_eq!(std::fs::read(dir.path().join("résumé.pdf")).unwrap(), b"payload");
}

#[test]
fn test_no_name_sources_leaves_name_and_disposition_unset() {
    let mut p = part(TypeCode::APPLICATION, "zip");
    p.disposition = Some("attachment".to_string());
    p.description = Some("not used outside message parts".to_string());
    let a = Attachment::new(standard(), p).unwrap();
    assert_eq!(a.name(), None);
    assert_eq!(a.disposition(), None);
}

#[test]
fn test_message_part_name_from_subtype_then_description() {
    let p = part(TypeCode::MESSAGE, "rfc822");
    let a = Attachment::new(standard(), p.clone()).unwrap();
    assert_eq!(a.name(), Some("rfc822"));
    assert_eq!(a.disposition(), None);

    let mut described = p;
    described.description = Some("Forwarded report".to_string());
    let a = Attachment::new(standard(), described).unwrap();
    assert_eq!(a.name(), Some("Forwarded report"));
}

#[test]
fn test_message_part_override_beats_explicit_filename() {
    let mut p = part(TypeCode::MESSAGE, "rfc822");
    p.filename = Some("forwarded.eml".to_string());
    p.disposition = Some("attachment".to_string());
    let a = Attachment::new(standard(), p).unwrap();
    assert_eq!(a.name(), Some("rfc822"));
    assert_eq!(a.disposition(), Some("attachment"));
}

#[test]
fn test_mixed_manifest() {
    let parts = load_manifest(&fixture("mixed.json")).unwrap();
    let attachments: Vec<Attachment> = parts
        .into_iter()
        .map(|p| Attachment::new(standard(), p).unwrap())
        .collect();
    assert_eq!(attachments.len(), 3);

    let logo = &attachments[0];
    assert_eq!(logo.content_type(), "image/png");
    assert_eq!(logo.id(), Some("logo@example.com"));
    assert_eq!(logo.name(), Some("logo.png"));
    assert_eq!(logo.disposition(), Some("inline"));
    assert_eq!(logo.mime_type(), "image/png");

    let forwarded = &attachments[1];
    assert_eq!(forwarded.media_type(), MediaCategory::Message);
    assert_eq!(forwarded.content_type(), "message/rfc822");
    assert_eq!(forwarded.name(), Some("Forwarded report"));

    let menu = &attachments[2];
    assert_eq!(
        String::from_utf8(menu.content().to_vec()).unwrap(),
        "Café menu for Friday\r\n"
    );
    assert_eq!(menu.mime_type(), "text/plain");
    assert_eq!(menu.extension(), Some("txt"));
}

// ─── Masks ──────────────────────────────────────────────────────────

#[test]
fn test_unknown_mask_is_adapter_not_found() {
    let a = Attachment::new(standard(), part(TypeCode::TEXT, "plain")).unwrap();
    match a.mask(Some("nope")) {
        Err(AttachmentError::AdapterNotFound(name)) => assert_eq!(name, "nope"),
        Err(other) => panic!("expected AdapterNotFound, got {other:?}"),
        Ok(view) => panic!("unexpected view {}", view.mask_name()),
    };
}

#[test]
fn test_mask_without_argument_uses_default() {
    let mut a = Attachment::new(standard(), part(TypeCode::TEXT, "plain")).unwrap();
    assert_eq!(a.mask(None).unwrap().mask_name(), "attachment");

    a.set_mask("template");
    assert_eq!(a.mask(None).unwrap().mask_name(), "template");
}

#[test]
fn test_default_mask_from_message_options() {
    let options = AttachmentOptions {
        decoder_mode: DecoderMode::Generic,
        default_mask: Some("template".to_string()),
    };
    let a = Attachment::new(with_options(options), part(TypeCode::TEXT, "plain")).unwrap();
    assert_eq!(a.mask_name(), "template");
    assert_eq!(a.mask(None).unwrap().mask_name(), "template");
}

#[test]
fn test_misconfigured_default_mask_surfaces_on_use() {
    let options = AttachmentOptions {
        decoder_mode: DecoderMode::Generic,
        default_mask: Some("missing".to_string()),
    };
    let a = Attachment::new(with_options(options), part(TypeCode::TEXT, "plain")).unwrap();
    assert!(matches!(
        a.mask(None),
        Err(AttachmentError::AdapterNotFound(_))
    ));
}

#[test]
fn test_attachment_mask_reads_through() {
    let mut a = Attachment::new(standard(), part(TypeCode::IMAGE, "GIF")).unwrap();
    a.set("name", "pixel.gif").unwrap();
    let view = a.mask(None).unwrap();
    assert_eq!(view.content_base64(), "cGF5bG9hZA==");
    assert_eq!(view.image_src(), "data:image/gif;base64,cGF5bG9hZA==");
    assert_eq!(view.get("name"), Some(AttributeValue::Text("pixel.gif".into())));
    assert!(view.render().starts_with("pixel.gif (image/gif, "));
}

#[test]
fn test_template_mask_renders_html() {
    let mut p = part(TypeCode::IMAGE, "png");
    p.filename = Some("a<b>.png".to_string());
    let mut a = Attachment::new(standard(), p).unwrap();

    let html = a.mask(Some("template")).unwrap().render();
    assert_eq!(
        html,
        r#"<img src="data:image/png;base64,cGF5bG9hZA==" alt="a&lt;b&gt;.png" title="a&lt;b&gt;.png">"#
    );

    a.set_img_src("cid:logo");
    let html = a.mask(Some("template")).unwrap().render();
    assert!(html.starts_with(r#"<img src="cid:logo""#));

    let link = Attachment::new(standard(), part(TypeCode::APPLICATION, "zip")).unwrap();
    let html = link.mask(Some("template")).unwrap().render();
    assert!(html.starts_with(r#"<a href="data:application/zip;base64,cGF5bG9hZA==" download="attachment">attachment</a>"#));

    let custom = TemplateMask::with_template(&link, "{content_type}:{size}:{unknown}");
    assert_eq!(custom.render(), "application/zip:7:{unknown}");
}

#[test]
fn test_custom_registered_mask() {
    struct Shout<'a>(&'a Attachment);

    impl AttachmentView for Shout<'_> {
        fn mask_name(&self) -> &str {
            "shout"
        }
        fn parent(&self) -> &Attachment {
            self.0
        }
        fn render(&self) -> String {
            self.0.content_type().to_uppercase()
        }
    }

    fn shout(a: &Attachment) -> Box<dyn AttachmentView + '_> {
        Box::new(Shout(a))
    }

    let mut masks = MaskRegistry::builtin();
    masks.register("shout", shout);
    let message: Arc<dyn MessageContext> =
        Arc::new(StandardMessage::new(AttachmentOptions::default()).with_masks(masks));

    let mut a = Attachment::new(message, part(TypeCode::AUDIO, "ogg")).unwrap();
    a.set_mask("shout");
    assert_eq!(a.mask_name(), "shout");
    assert_eq!(a.mask(None).unwrap().render(), "AUDIO/OGG");
}

// ─── Saving ─────────────────────────────────────────────────────────

#[test]
fn test_save_writes_content_with_explicit_filename() {
    let dir = tempfile::tempdir().unwrap();
    let prefix = format!("{}/", dir.path().display());
    let a = Attachment::new(standard(), part(TypeCode::APPLICATION, "octet-stream")).unwrap();

    assert!(a.save(&prefix, Some("x.bin")));
    assert_eq!(std::fs::read(dir.path().join("x.bin")).unwrap(), b"payload");
}

#[test]
fn test_save_falls_back_to_resolved_name() {
    let dir = tempfile::tempdir().unwrap();
    let prefix = format!("{}/", dir.path().display());
    let mut p = part(TypeCode::TEXT, "plain");
    p.filename = Some("notes.txt".to_string());
    let a = Attachment::new(standard(), p).unwrap();

    assert!(a.save(&prefix, None));
    assert_eq!(std::fs::read(dir.path().join("notes.txt")).unwrap(), b"payload");
}

#[test]
fn test_save_without_any_name_fails() {
    let dir = tempfile::tempdir().unwrap();
    let prefix = format!("{}/", dir.path().display());
    let a = Attachment::new(standard(), part(TypeCode::TEXT, "plain")).unwrap();
    assert!(!a.save(&prefix, None));
}

#[test]
fn test_save_reports_sink_failure() {
    let a = Attachment::new(standard(), part(TypeCode::TEXT, "plain")).unwrap();
    assert!(!a.save_to(&BrokenSink, "/anywhere/", Some("x.bin")));
}

// ─── Derived queries ────────────────────────────────────────────────

#[test]
fn test_derived_queries_are_stable() {
    let parts = load_manifest(&fixture("mixed.json")).unwrap();
    for p in parts {
        let a = Attachment::new(standard(), p).unwrap();
        assert_eq!(a.mime_type(), a.mime_type());
        assert_eq!(a.extension(), a.extension());
    }
}
