//! Content sniffing: the MIME type of decoded bytes and a matching extension.
//!
//! Independent of the declared Content-Type, which senders often get wrong.

/// Reported for zero-length content.
pub const EMPTY_MIME: &str = "application/x-empty";

/// Extensions preferred over `mime_guess`'s alphabetical first pick.
const PREFERRED_EXTENSIONS: &[(&str, &str)] = &[
    ("application/octet-stream", "bin"),
    ("text/plain", "txt"),
    ("text/html", "html"),
    ("image/jpeg", "jpg"),
    ("image/tiff", "tiff"),
    ("audio/mpeg", "mp3"),
    ("video/mp4", "mp4"),
    ("message/rfc822", "eml"),
];

/// Detect the MIME type of `content` from its magic bytes.
///
/// Falls back to `text/plain` for clean UTF-8 text and
/// `application/octet-stream` for anything else.
pub fn sniff_mime_type(content: &[u8]) -> String {
    if content.is_empty() {
        return EMPTY_MIME.to_string();
    }
    if let Some(kind) = infer::get(content) {
        return kind.mime_type().to_string();
    }
    if looks_like_text(content) {
        "text/plain".to_string()
    } else {
        "application/octet-stream".to_string()
    }
}

/// Map a MIME type to a file extension (without the dot).
pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    let mime = mime.trim().to_ascii_lowercase();
    PREFERRED_EXTENSIONS
        .iter()
        .find(|(m, _)| *m == mime)
        .map(|(_, ext)| *ext)
        .or_else(|| {
            mime_guess::get_mime_extensions_str(&mime).and_then(|exts| exts.first().copied())
        })
}

fn looks_like_text(content: &[u8]) -> bool {
    std::str::from_utf8(content).is_ok_and(|s| {
        !s.chars()
            .any(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t' | '\x0c'))
    })
}
