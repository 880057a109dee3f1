use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ReadyRsError;
use crate::form::FormConfig;
use crate::logging::LogConfig;
use crate::readiness::ReadinessConfig;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Credentials file location (defaults to ~/.readyrs/credentials.toml)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials_path: Option<PathBuf>,

    /// Application metadata
    pub metadata: ConfigMetadata,

    /// intervals.icu API settings
    pub api: ApiSettings,

    /// Readiness engine tunables
    pub readiness: ReadinessConfig,

    /// Form engine tunables
    pub form: FormConfig,

    /// Logging settings
    pub logging: LogConfig,
}

/// Configuration metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Default for ConfigMetadata {
    fn default() -> Self {
        let now = Utc::now();
        ConfigMetadata {
            version: "1.0".to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// intervals.icu API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// API root, without a trailing slash
    pub base_url: String,

    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Days of wellness history fetched when no range is given
    pub default_range_days: u32,

    /// Activities listed when no limit is given
    pub default_activity_limit: u32,
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: "https://intervals.icu/api/v1".to_string(),
            user_agent: format!("readyrs/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            default_range_days: 30,
            default_activity_limit: 5,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            credentials_path: None,
            metadata: ConfigMetadata::default(),
            api: ApiSettings::default(),
            readiness: ReadinessConfig::default(),
            form: FormConfig::default(),
            logging: LogConfig::default(),
        }
    }
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".readyrs")
            .join("config.toml")
    }

    /// Load configuration, falling back to defaults when the file is missing
    ///
    /// A file that exists but cannot be parsed is still an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);

        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        Self::load_from_file(&config_path)
    }

    /// Credentials file in effect
    pub fn credentials_path(&self) -> PathBuf {
        self.credentials_path
            .clone()
            .unwrap_or_else(crate::credentials::FileCredentialStore::default_path)
    }

    /// Check that engine tunables make sense
    pub fn validate(&self) -> std::result::Result<(), ReadyRsError> {
        let r = &self.readiness;
        if r.window_days == 0 {
            return Err(ReadyRsError::Config("readiness.window_days must be at least 1".into()));
        }
        if [r.hrv_weight, r.rhr_weight, r.sleep_weight]
            .iter()
            .any(|w| !w.is_finite() || *w < 0.0)
        {
            return Err(ReadyRsError::Config("readiness weights must be non-negative".into()));
        }
        if !(r.sub_score_cap >= r.saturation_point && r.saturation_point > 0.0) {
            return Err(ReadyRsError::Config(
                "readiness.sub_score_cap must be >= saturation_point > 0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&r.diminishing_factor) {
            return Err(ReadyRsError::Config(
                "readiness.diminishing_factor must be between 0 and 1".into(),
            ));
        }
        if self.form.trend_days == 0 {
            return Err(ReadyRsError::Config("form.trend_days must be at least 1".into()));
        }
        if self.api.timeout_secs == 0 {
            return Err(ReadyRsError::Config("api.timeout_secs must be at least 1".into()));
        }
        if self.api.default_range_days == 0 {
            return Err(ReadyRsError::Config("api.default_range_days must be at least 1".into()));
        }
        Ok(())
    }

    /// Flattened `key = value` listing of every setting
    pub fn list(&self) -> Result<Vec<(String, String)>> {
        let value = toml::Value::try_from(self)?;
        let mut entries = Vec::new();
        flatten("", &value, &mut entries);
        Ok(entries)
    }

    /// Look up a setting by dotted key, e.g. `readiness.hrv_weight`
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = toml::Value::try_from(self)?;
        Ok(lookup(&value, key).map(display_value))
    }

    /// Update a setting by dotted key; the value is parsed as TOML, falling
    /// back to a plain string
    pub fn set(&mut self, key: &str, raw_value: &str) -> Result<()> {
        let mut value = toml::Value::try_from(&*self)?;

        let unknown = || ReadyRsError::Config(format!("Unknown configuration key: {}", key));
        // Unset optional keys are absent from the serialized form
        if lookup(&value, key).is_none() && OPTIONAL_KEYS.contains(&key) {
            let (parent, field) = match key.rsplit_once('.') {
                Some((parent, field)) => (lookup_mut(&mut value, parent), field),
                None => (Some(&mut value), key),
            };
            parent
                .and_then(toml::Value::as_table_mut)
                .ok_or_else(unknown)?
                .insert(field.to_string(), parse_value(raw_value));
        } else {
            let slot = lookup_mut(&mut value, key).ok_or_else(unknown)?;
            *slot = parse_value(raw_value);
        }

        let updated: AppConfig = value
            .try_into()
            .with_context(|| format!("Invalid value for {}: {}", key, raw_value))?;
        updated.validate()?;

        *self = updated;
        self.metadata.updated_at = Utc::now();
        Ok(())
    }
}

/// Settable keys that are left out of the file while unset
const OPTIONAL_KEYS: &[&str] = &["credentials_path", "logging.file_path"];

fn parse_value(raw: &str) -> toml::Value {
    format!("value = {}", raw)
        .parse::<toml::Table>()
        .ok()
        .and_then(|mut table| table.remove("value"))
        .unwrap_or_else(|| toml::Value::String(raw.to_string()))
}

fn lookup<'a>(value: &'a toml::Value, key: &str) -> Option<&'a toml::Value> {
    key.split('.').try_fold(value, |current, part| current.get(part))
}

fn lookup_mut<'a>(value: &'a mut toml::Value, key: &str) -> Option<&'a mut toml::Value> {
    key.split('.').try_fold(value, |current, part| current.get_mut(part))
}

fn display_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn flatten(prefix: &str, value: &toml::Value, entries: &mut Vec<(String, String)>) {
    match value {
        toml::Value::Table(table) => {
            for (key, child) in table {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten(&path, child, entries);
            }
        }
        leaf => entries.push((prefix.to_string(), display_value(leaf))),
    }
}
