//! Configuration for the `sd` CLI.
//!
//! One optional file, `~/.config/stubdeck/config.toml`:
//!
//! ```toml
//! url = "http://mock.internal:8080"
//! output-format = "human"
//! ```
//!
//! Precedence for the server URL: `--url` flag > `SD_URL` env var
//! (both handled by clap) > config file > default. Output format works
//! the same way with the `-H/--human` flag.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::client::DEFAULT_BASE_URL;
use crate::{Error, Result};

/// Preferred command output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Human,
}

/// Parsed `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SdConfig {
    /// Admin base URL of the mock server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Default output format when no flag is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_format: Option<OutputFormat>,
}

impl SdConfig {
    /// Load from the default location. A missing file is an empty
    /// config, not an error.
    pub fn load() -> Result<Self> {
        match config_file_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from an explicit path (tests use this).
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }
}

/// `~/.config/stubdeck/config.toml`, honoring `SD_CONFIG_DIR` overrides.
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("SD_CONFIG_DIR") {
        return Some(PathBuf::from(dir).join("config.toml"));
    }
    Some(dirs::config_dir()?.join("stubdeck").join("config.toml"))
}

/// Where a resolved value came from, for `sd config show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    Flag,
    ConfigFile,
    Default,
}

impl ValueSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueSource::Flag => "flag",
            ValueSource::ConfigFile => "config file",
            ValueSource::Default => "default",
        }
    }
}

/// Resolved server URL plus its provenance.
#[derive(Debug, Clone)]
pub struct ResolvedUrl {
    pub url: String,
    pub source: ValueSource,
}

/// Resolve the server URL. The flag argument already folds in `SD_URL`
/// via clap's env support.
pub fn resolve_url(flag: Option<&str>, config: &SdConfig) -> ResolvedUrl {
    if let Some(url) = flag {
        return ResolvedUrl {
            url: url.to_string(),
            source: ValueSource::Flag,
        };
    }
    if let Some(url) = &config.url {
        return ResolvedUrl {
            url: url.clone(),
            source: ValueSource::ConfigFile,
        };
    }
    ResolvedUrl {
        url: DEFAULT_BASE_URL.to_string(),
        source: ValueSource::Default,
    }
}

/// Resolve whether output should be human-readable.
pub fn resolve_human(flag: bool, config: &SdConfig) -> bool {
    flag || config.output_format == Some(OutputFormat::Human)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_missing_file_is_empty_config() {
        let dir = TempDir::new().unwrap();
        let config = SdConfig::load_from(&dir.path().join("nope.toml")).unwrap();
        assert!(config.url.is_none());
        assert!(config.output_format.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "url = \"http://mock.internal:9999\"\noutput-format = \"human\"\n",
        );
        let config = SdConfig::load_from(&path).unwrap();
        assert_eq!(config.url.as_deref(), Some("http://mock.internal:9999"));
        assert_eq!(config.output_format, Some(OutputFormat::Human));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "url = [not toml");
        assert!(matches!(
            SdConfig::load_from(&path),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_url_precedence_flag_wins() {
        let config = SdConfig {
            url: Some("http://from-file".to_string()),
            output_format: None,
        };
        let resolved = resolve_url(Some("http://from-flag"), &config);
        assert_eq!(resolved.url, "http://from-flag");
        assert_eq!(resolved.source, ValueSource::Flag);
    }

    #[test]
    fn test_url_precedence_file_then_default() {
        let config = SdConfig {
            url: Some("http://from-file".to_string()),
            output_format: None,
        };
        assert_eq!(resolve_url(None, &config).source, ValueSource::ConfigFile);

        let resolved = resolve_url(None, &SdConfig::default());
        assert_eq!(resolved.url, DEFAULT_BASE_URL);
        assert_eq!(resolved.source, ValueSource::Default);
    }

    #[test]
    fn test_human_resolution() {
        let config = SdConfig {
            url: None,
            output_format: Some(OutputFormat::Human),
        };
        assert!(resolve_human(false, &config));
        assert!(resolve_human(true, &SdConfig::default()));
        assert!(!resolve_human(false, &SdConfig::default()));
    }
}
