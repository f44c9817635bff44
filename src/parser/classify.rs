//! Coarse media-type classification of body parts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::part::TypeCode;

/// The closed set of top-level media categories an attachment can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    Message,
    Application,
    Audio,
    Image,
    Video,
    Model,
    Text,
    Multipart,
    Other,
}

impl MediaCategory {
    pub const ALL: [MediaCategory; 9] = [
        MediaCategory::Message,
        MediaCategory::Application,
        MediaCategory::Audio,
        MediaCategory::Image,
        MediaCategory::Video,
        MediaCategory::Model,
        MediaCategory::Text,
        MediaCategory::Multipart,
        MediaCategory::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Application => "application",
            Self::Audio => "audio",
            Self::Image => "image",
            Self::Video => "video",
            Self::Model => "model",
            Self::Text => "text",
            Self::Multipart => "multipart",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| format!("unknown media category '{s}'"))
    }
}

/// Classify a raw type code. Total: unknown codes become [`MediaCategory::Other`].
pub fn classify(code: TypeCode) -> MediaCategory {
    match code {
        TypeCode::MESSAGE => MediaCategory::Message,
        TypeCode::APPLICATION => MediaCategory::Application,
        TypeCode::AUDIO => MediaCategory::Audio,
        TypeCode::IMAGE => MediaCategory::Image,
        TypeCode::VIDEO => MediaCategory::Video,
        TypeCode::MODEL => MediaCategory::Model,
        TypeCode::TEXT => MediaCategory::Text,
        TypeCode::MULTIPART => MediaCategory::Multipart,
        _ => MediaCategory::Other,
    }
}
