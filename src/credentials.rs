//! intervals.icu credential storage
//!
//! The scoring engines never see credentials; only the API client does.
//! Storage sits behind [`CredentialsProvider`] so the CLI can use a file in
//! the user's home directory while tests and library callers use memory.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const API_KEY_ENV: &str = "INTERVALS_API_KEY";
pub const ATHLETE_ID_ENV: &str = "INTERVALS_ATHLETE_ID";

/// Credential storage errors
#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("Credentials file error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse credentials file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Failed to serialize credentials: {0}")]
    Serialize(String),
}

/// API key and athlete id for intervals.icu
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub api_key: String,
    pub athlete_id: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, athlete_id: impl Into<String>) -> Self {
        Credentials {
            api_key: api_key.into(),
            athlete_id: athlete_id.into(),
        }
    }

    /// Both values present and non-blank
    pub fn is_complete(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.athlete_id.trim().is_empty()
    }

    /// Read credentials from `INTERVALS_API_KEY` and `INTERVALS_ATHLETE_ID`
    pub fn from_env() -> Option<Self> {
        let credentials = Credentials {
            api_key: env::var(API_KEY_ENV).ok()?,
            athlete_id: env::var(ATHLETE_ID_ENV).ok()?,
        };
        credentials.is_complete().then_some(credentials)
    }

    /// API key with everything but the last four characters masked
    pub fn masked_api_key(&self) -> String {
        crate::logging::redact(&self.api_key)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.masked_api_key())
            .field("athlete_id", &self.athlete_id)
            .finish()
    }
}

/// Source of intervals.icu credentials
pub trait CredentialsProvider {
    /// Stored credentials, `None` when not connected
    fn get(&self) -> Result<Option<Credentials>, CredentialsError>;

    fn set(&mut self, credentials: Credentials) -> Result<(), CredentialsError>;

    fn clear(&mut self) -> Result<(), CredentialsError>;

    fn is_connected(&self) -> bool {
        matches!(self.get(), Ok(Some(_)))
    }
}

/// Credentials kept in process memory
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credentials: Option<Credentials>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(credentials: Credentials) -> Self {
        MemoryCredentialStore {
            credentials: Some(credentials),
        }
    }
}

impl CredentialsProvider for MemoryCredentialStore {
    fn get(&self) -> Result<Option<Credentials>, CredentialsError> {
        Ok(self.credentials.clone().filter(Credentials::is_complete))
    }

    fn set(&mut self, credentials: Credentials) -> Result<(), CredentialsError> {
        self.credentials = Some(credentials);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), CredentialsError> {
        self.credentials = None;
        Ok(())
    }
}

/// Credentials persisted as a small TOML file
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileCredentialStore { path: path.into() }
    }

    /// `~/.readyrs/credentials.toml`
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".readyrs")
            .join("credentials.toml")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> CredentialsError {
        CredentialsError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl Default for FileCredentialStore {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}

impl CredentialsProvider for FileCredentialStore {
    fn get(&self) -> Result<Option<Credentials>, CredentialsError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        let credentials: Credentials =
            toml::from_str(&content).map_err(|e| CredentialsError::Parse {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        Ok(credentials.is_complete().then_some(credentials))
    }

    fn set(&mut self, credentials: Credentials) -> Result<(), CredentialsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let content = toml::to_string_pretty(&credentials)
            .map_err(|e| CredentialsError::Serialize(e.to_string()))?;

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);
        let mut file = options.open(&self.path).map_err(|e| self.io_error(e))?;

        // The mode above only applies to new files
        #[cfg(unix)]
        file.set_permissions(fs::Permissions::from_mode(0o600))
            .map_err(|e| self.io_error(e))?;

        file.write_all(content.as_bytes())
            .map_err(|e| self.io_error(e))?;

        tracing::info!(path = %self.path.display(), athlete_id = %credentials.athlete_id, "Credentials saved");
        Ok(())
    }

    fn clear(&mut self) -> Result<(), CredentialsError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "Credentials removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}
