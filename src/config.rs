//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$MIMEATTACH_CONFIG` (environment variable)
//! 2. `~/.config/mimeattach/config.toml` (Linux/macOS)
//!    `%APPDATA%\mimeattach\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Options handed to every attachment through its owning message.
    pub attachment: AttachmentOptions,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
}

/// How attachment names are decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecoderMode {
    /// Charset-aware legacy MIME header decoder (needs the `legacy-charset` feature).
    #[serde(alias = "utf-8")]
    LegacyCharset,
    /// RFC 2047 encoded-word decoding.
    #[default]
    Generic,
}

/// Attachment-level options.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachmentOptions {
    /// Strategy used to decode `name` / `filename` headers.
    pub decoder_mode: DecoderMode,
    /// Mask used when `mask()` is called without an identifier.
    /// `None` keeps the built-in default.
    #[serde(alias = "default_adapter")]
    pub default_mask: Option<String>,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            log_level: "warn".to_string(),
        }
    }
}

// ── Load / save ─────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<Config>(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Save configuration to the standard location.
pub fn save_config(config: &Config) -> anyhow::Result<()> {
    let path = config_file_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config file path"))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(&path, contents)?;
    tracing::info!(path = %path.display(), "Saved config");
    Ok(())
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("MIMEATTACH_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    dirs::config_dir().map(|d| d.join("mimeattach").join("config.toml"))
}

/// Return the cache directory for logs.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mimeattach")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.general.log_level, "warn");
        assert_eq!(cfg.attachment.decoder_mode, DecoderMode::Generic);
        assert!(cfg.attachment.default_mask.is_none());
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let mut cfg = Config::default();
        cfg.attachment.decoder_mode = DecoderMode::LegacyCharset;
        cfg.attachment.default_mask = Some("template".to_string());
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        assert!(toml_str.contains("legacy-charset"));
        let parsed: Config = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.attachment, cfg.attachment);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[attachment]
decoder_mode = "legacy-charset"
"#;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        assert_eq!(cfg.attachment.decoder_mode, DecoderMode::LegacyCharset);
        assert!(cfg.attachment.default_mask.is_none());
        assert_eq!(cfg.general.log_level, "warn");
    }

    #[test]
    fn test_aliases() {
        let cfg: Config = toml::from_str(
            r#"
[attachment]
decoder_mode = "utf-8"
default_adapter = "template"
"#,
        )
        .expect("parse aliases");
        assert_eq!(cfg.attachment.decoder_mode, DecoderMode::LegacyCharset);
        assert_eq!(cfg.attachment.default_mask.as_deref(), Some("template"));
    }
}
