//! Registry configuration.
//!
//! Locates the schema asset tree and fixes the serialization format of the
//! schema documents inside it. Defaults match the layout the schema
//! generator produces. Override via environment variables or explicit
//! construction.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Environment variable naming the asset root directory.
pub const SCHEMA_DIR_ENV: &str = "COLSCHEMA_SCHEMA_DIR";
/// Environment variable selecting the stored schema format (`json` or `yaml`).
pub const SCHEMA_FORMAT_ENV: &str = "COLSCHEMA_SCHEMA_FORMAT";

const DEFAULT_SCHEMA_DIR: &str = "schemas";

/// Serialization formats understood by the registry, both for stored
/// schema documents and for candidate configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DocumentFormat {
    /// JSON text.
    Json,
    /// YAML text.
    #[default]
    Yaml,
}

impl DocumentFormat {
    /// File extension used for schema documents in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }

    /// Infer the format from a file extension. `yml` is accepted for YAML.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("JSON"),
            Self::Yaml => f.write_str("YAML"),
        }
    }
}

impl FromStr for DocumentFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s.trim()).ok_or_else(|| ConfigError::InvalidFormat(s.to_string()))
    }
}

/// Location and format of the schema asset tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Directory holding one subdirectory per collector version.
    pub schema_root: PathBuf,
    /// Format of every `<category>_<name>.<ext>` schema file.
    pub schema_format: DocumentFormat,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            schema_root: PathBuf::from(DEFAULT_SCHEMA_DIR),
            schema_format: DocumentFormat::default(),
        }
    }
}

impl RegistryConfig {
    /// Configuration for an explicit asset root.
    pub fn new(schema_root: impl Into<PathBuf>, schema_format: DocumentFormat) -> Self {
        Self {
            schema_root: schema_root.into(),
            schema_format,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `COLSCHEMA_SCHEMA_DIR` (default: `schemas`)
    /// - `COLSCHEMA_SCHEMA_FORMAT` (`json` or `yaml`, default: `yaml`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let schema_root = lookup(SCHEMA_DIR_ENV)
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SCHEMA_DIR));

        let schema_format = match lookup(SCHEMA_FORMAT_ENV) {
            Some(raw) if !raw.trim().is_empty() => raw.parse()?,
            _ => DocumentFormat::default(),
        };

        Ok(Self {
            schema_root,
            schema_format,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A format name other than `json` or `yaml`.
    #[error("invalid schema format \"{0}\" (expected json or yaml)")]
    InvalidFormat(String),
}
