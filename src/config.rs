//! Configuration for the Guardian keyboard monitor.

use crate::alert::UnlockGate;
use crate::signal::FileResetFlag;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Threshold used when no valid configuration is available.
pub const DEFAULT_THRESHOLD: u32 = 5;

/// Main configuration for the monitor.
///
/// Stored as camelCase JSON. The legacy keys `guardianNumber` and `pin` are
/// still read; when a file carries both spellings the current key wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Running score at which an alert fires
    #[serde(with = "threshold_serde")]
    pub threshold: u32,

    /// Where alerts are sent; `None` means no alert channel is configured
    #[serde(with = "optional_string")]
    pub alert_destination: Option<String>,

    /// Secret for the unlock gate; `None` means the gate auto-dismisses
    #[serde(with = "optional_string")]
    pub unlock_secret: Option<String>,

    /// Lexicon file; the bundled lexicon is used when unset or unreadable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lexicon_path: Option<PathBuf>,

    /// Path for the reset flag and transparency log
    pub data_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("guardian-keyboard");

        Self {
            threshold: DEFAULT_THRESHOLD,
            alert_destination: None,
            unlock_secret: None,
            lexicon_path: None,
            data_path: data_dir,
        }
    }
}

/// On-disk record, with current and legacy keys side by side.
#[derive(Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct StoredConfig {
    #[serde(with = "threshold_serde")]
    threshold: u32,
    #[serde(with = "optional_string")]
    alert_destination: Option<String>,
    #[serde(rename = "guardianNumber", with = "optional_string")]
    guardian_number: Option<String>,
    #[serde(with = "optional_string")]
    unlock_secret: Option<String>,
    #[serde(rename = "pin", with = "optional_string")]
    pin: Option<String>,
    lexicon_path: Option<PathBuf>,
    data_path: PathBuf,
}

impl Default for StoredConfig {
    fn default() -> Self {
        let config = Config::default();
        Self {
            threshold: config.threshold,
            alert_destination: None,
            guardian_number: None,
            unlock_secret: None,
            pin: None,
            lexicon_path: None,
            data_path: config.data_path,
        }
    }
}

impl From<StoredConfig> for Config {
    fn from(stored: StoredConfig) -> Self {
        Self {
            threshold: stored.threshold,
            alert_destination: stored.alert_destination.or(stored.guardian_number),
            unlock_secret: stored.unlock_secret.or(stored.pin),
            lexicon_path: stored.lexicon_path,
            data_path: stored.data_path,
        }
    }
}

impl<'de> Deserialize<'de> for Config {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        StoredConfig::deserialize(deserializer).map(Config::from)
    }
}

impl Config {
    /// Typed parse of a JSON configuration record.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(ConfigError::Parse)
    }

    /// Parse, recovering to the default configuration on any error.
    pub fn parse_or_default(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Malformed configuration, using defaults");
            Self::default()
        })
    }

    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a file; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::parse(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Validate and save configuration to a file.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Check the record before it is persisted.
    ///
    /// A secret with surrounding whitespace or control characters cannot be
    /// typed back reliably and would leave the unlock gate stuck.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threshold < 1 {
            return Err(ConfigError::InvalidThreshold(self.threshold.into()));
        }
        if let Some(secret) = &self.unlock_secret {
            if secret.trim() != secret {
                return Err(ConfigError::InvalidSecret(
                    "must not start or end with whitespace",
                ));
            }
            if secret.chars().any(char::is_control) {
                return Err(ConfigError::InvalidSecret(
                    "must not contain control characters",
                ));
            }
        }
        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("guardian-keyboard")
            .join("config.json")
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.data_path)?;
        Ok(())
    }

    /// Unlock gate for this configuration's secret.
    pub fn unlock_gate(&self) -> UnlockGate {
        UnlockGate::new(self.unlock_secret.as_deref())
    }

    /// Durable reset flag inside the data directory.
    pub fn reset_flag(&self) -> FileResetFlag {
        FileResetFlag::in_dir(&self.data_path)
    }

    /// Location of the persisted transparency statistics.
    pub fn transparency_path(&self) -> PathBuf {
        self.data_path.join("transparency.json")
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("Threshold must be at least 1, got {0}")]
    InvalidThreshold(i64),
    #[error("Unlock secret {0}")]
    InvalidSecret(&'static str),
}

/// Serde support for the threshold.
///
/// Stored values below 1 are clamped to 1 on load; out-of-range values are
/// clamped to `u32::MAX`.
mod threshold_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(threshold: &u32, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        threshold.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = i64::deserialize(deserializer)?;
        let clamped = raw.clamp(1, i64::from(u32::MAX));
        if clamped != raw {
            tracing::warn!(raw, clamped, "Threshold out of range, clamped");
        }
        Ok(clamped as u32)
    }
}

/// Serde support for optional strings stored as possibly-empty strings.
mod optional_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.filter(|s| !s.is_empty()))
    }
}
