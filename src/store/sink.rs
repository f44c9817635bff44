//! Where saved attachments go.

use std::path::Path;

/// A destination for attachment bytes.
pub trait StorageSink {
    /// Write `data` to `target`, replacing any existing file.
    fn put(&self, target: &Path, data: &[u8]) -> std::io::Result<()>;
}

/// Writes straight to the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSink;

impl StorageSink for FsSink {
    fn put(&self, target: &Path, data: &[u8]) -> std::io::Result<()> {
        std::fs::write(target, data)
    }
}

/// Make a header-supplied name safe to append to a directory path.
///
/// Path separators and control characters become `_`; an empty result
/// becomes `"unknown"`.
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    match sanitized.as_str() {
        "" | "." | ".." => "unknown".to_string(),
        _ => sanitized,
    }
}
