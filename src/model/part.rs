//! The body part handed over by the MIME parser.
//!
//! A [`BodyPart`] is read-only input: the attachment consumes it once at
//! construction and keeps none of it as shared state.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{AttachmentError, Result};

/// Raw body-structure type code, numbered the way IMAP `BODYSTRUCTURE` does.
///
/// Any `u32` is accepted; values outside the known set classify as `other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TypeCode(pub u32);

impl TypeCode {
    pub const TEXT: TypeCode = TypeCode(0);
    pub const MULTIPART: TypeCode = TypeCode(1);
    pub const MESSAGE: TypeCode = TypeCode(2);
    pub const APPLICATION: TypeCode = TypeCode(3);
    pub const AUDIO: TypeCode = TypeCode(4);
    pub const IMAGE: TypeCode = TypeCode(5);
    pub const VIDEO: TypeCode = TypeCode(6);
    pub const MODEL: TypeCode = TypeCode(7);
    pub const OTHER: TypeCode = TypeCode(8);

    /// Map a top-level media type name (`"image"`, `"Message"`, …) to its code.
    pub fn from_media_type(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "text" => Self::TEXT,
            "multipart" => Self::MULTIPART,
            "message" => Self::MESSAGE,
            "application" => Self::APPLICATION,
            "audio" => Self::AUDIO,
            "image" => Self::IMAGE,
            "video" => Self::VIDEO,
            "model" => Self::MODEL,
            _ => Self::OTHER,
        }
    }
}

impl<'de> Deserialize<'de> for TypeCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Code(u32),
            Name(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Code(code) => TypeCode(code),
            Raw::Name(name) => TypeCode::from_media_type(&name),
        })
    }
}

/// Content-Transfer-Encoding declared by a body part.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransferEncoding {
    #[default]
    SevenBit,
    EightBit,
    Binary,
    Base64,
    QuotedPrintable,
    /// Any label we do not recognise, kept verbatim (lower-cased).
    Other(String),
}

impl TransferEncoding {
    /// Map an IMAP body-structure encoding code (`ENC7BIT` = 0 … `ENCOTHER` = 5).
    pub fn from_imap_code(code: u32) -> Self {
        match code {
            0 => Self::SevenBit,
            1 => Self::EightBit,
            2 => Self::Binary,
            3 => Self::Base64,
            4 => Self::QuotedPrintable,
            _ => Self::Other("other".to_string()),
        }
    }

    /// The canonical header label (`"base64"`, `"quoted-printable"`, …).
    pub fn label(&self) -> &str {
        match self {
            Self::SevenBit => "7bit",
            Self::EightBit => "8bit",
            Self::Binary => "binary",
            Self::Base64 => "base64",
            Self::QuotedPrintable => "quoted-printable",
            Self::Other(label) => label,
        }
    }
}

impl From<&str> for TransferEncoding {
    fn from(label: &str) -> Self {
        let label = label.trim().to_ascii_lowercase();
        match label.as_str() {
            "" | "7bit" => Self::SevenBit,
            "8bit" => Self::EightBit,
            "binary" => Self::Binary,
            "base64" => Self::Base64,
            "quoted-printable" => Self::QuotedPrintable,
            _ => Self::Other(label),
        }
    }
}

impl From<String> for TransferEncoding {
    fn from(label: String) -> Self {
        Self::from(label.as_str())
    }
}

impl From<TransferEncoding> for String {
    fn from(encoding: TransferEncoding) -> Self {
        encoding.label().to_string()
    }
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One MIME body part as produced by an external parser.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyPart {
    /// Position of the part within the message structure.
    pub part_number: usize,

    /// Top-level type code; also accepts a media type name in manifests.
    #[serde(rename = "type")]
    pub type_code: TypeCode,

    /// Subtype as written in the header (case preserved).
    pub subtype: String,

    /// Declared Content-Transfer-Encoding.
    pub encoding: TransferEncoding,

    /// Undecoded payload.
    #[serde(deserialize_with = "bytes_or_string")]
    pub content: Vec<u8>,

    /// Byte length reported by the parser.
    pub bytes: u64,

    /// Content-Disposition type (`inline`, `attachment`).
    pub disposition: Option<String>,

    /// Raw Content-ID, usually still wrapped in `<…>`.
    pub id: Option<String>,

    /// `name` parameter of Content-Type.
    pub name: Option<String>,

    /// `filename` parameter of Content-Disposition.
    pub filename: Option<String>,

    /// Content-Description header.
    pub description: Option<String>,
}

impl Default for TypeCode {
    fn default() -> Self {
        Self::OTHER
    }
}

/// Load body parts from a JSON manifest holding one part or an array of parts.
pub fn load_manifest(path: &Path) -> Result<Vec<BodyPart>> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Manifest {
        Many(Vec<BodyPart>),
        One(Box<BodyPart>),
    }

    let text = std::fs::read_to_string(path).map_err(|e| AttachmentError::io(path, e))?;
    let manifest: Manifest = serde_json::from_str(&text)
        .map_err(|e| AttachmentError::Manifest(format!("{}: {e}", path.display())))?;
    Ok(match manifest {
        Manifest::Many(parts) => parts,
        Manifest::One(part) => vec![*part],
    })
}

/// Manifests may carry the payload either as a string or as a byte array.
fn bytes_or_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Vec<u8>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Bytes(Vec<u8>),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s.into_bytes(),
        Raw::Bytes(b) => b,
    })
}
