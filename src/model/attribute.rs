//! Attribute names and values for the generic accessor surface.

use std::fmt;

use serde::Serialize;

/// The fixed set of stored attachment attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    PartNumber,
    Size,
    Content,
    Type,
    ContentType,
    Id,
    Name,
    Disposition,
    ImgSrc,
}

/// Queries computed from the content rather than stored. They can be read
/// through their dedicated methods but never written.
pub const DERIVED_ATTRIBUTES: [&str; 2] = ["mime_type", "extension"];

impl Attribute {
    pub const ALL: [Attribute; 9] = [
        Attribute::PartNumber,
        Attribute::Size,
        Attribute::Content,
        Attribute::Type,
        Attribute::ContentType,
        Attribute::Id,
        Attribute::Name,
        Attribute::Disposition,
        Attribute::ImgSrc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PartNumber => "part_number",
            Self::Size => "size",
            Self::Content => "content",
            Self::Type => "type",
            Self::ContentType => "content_type",
            Self::Id => "id",
            Self::Name => "name",
            Self::Disposition => "disposition",
            Self::ImgSrc => "img_src",
        }
    }

    /// Look up an attribute by name, accepting `snake_case` or `camelCase`.
    pub fn lookup(name: &str) -> Option<Self> {
        let key = normalize_key(name);
        Self::ALL.into_iter().find(|a| a.as_str() == key)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value held by an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Integer(u64),
    Text(String),
    Bytes(Vec<u8>),
}

impl AttributeValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<u64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Short name of the value's shape, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
        }
    }
}

impl From<u64> for AttributeValue {
    fn from(n: u64) -> Self {
        Self::Integer(n)
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<u8>> for AttributeValue {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

/// `"ContentType"` / `"contentType"` / `"content_type"` → `"content_type"`.
pub fn normalize_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len() + 4);
    for (i, ch) in name.trim().chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 && !key.ends_with('_') {
                key.push('_');
            }
            key.push(ch.to_ascii_lowercase());
        } else if ch == '-' || ch == ' ' {
            key.push('_');
        } else {
            key.push(ch);
        }
    }
    key
}
