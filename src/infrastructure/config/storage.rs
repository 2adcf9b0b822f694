//! Loading and saving the client configuration file.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::app_config::ClientConfig;

/// File name of the configuration inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors raised while reading or writing the configuration file.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ConfigError {
    #[error("no configuration directory for this platform")]
    NoConfigDir,

    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Reads and writes `ClientConfig` at one resolved path.
#[derive(Debug, Clone)]
pub struct StorageManager {
    config_path: PathBuf,
}

impl StorageManager {
    /// Uses `config.toml` in the platform configuration directory.
    ///
    /// # Errors
    /// Returns `NoConfigDir` if the platform has no configuration directory.
    pub fn new() -> Result<Self, ConfigError> {
        ClientConfig::default_config_dir()
            .map(|dir| Self::at(dir.join(CONFIG_FILE_NAME)))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Uses an explicit file.
    #[must_use]
    pub fn at(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Uses `path_override` when given, the platform file otherwise.
    ///
    /// # Errors
    /// As [`new`](Self::new) when no override is given.
    pub fn for_override(path_override: Option<&Path>) -> Result<Self, ConfigError> {
        path_override.map_or_else(Self::new, |path| Ok(Self::at(path)))
    }

    /// Returns the configuration file path.
    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Loads the configuration.
    ///
    /// A missing file is created with the defaults. A file that does not
    /// parse is kept as is and the defaults are returned.
    ///
    /// # Errors
    /// Returns `Io` if the file exists but cannot be read, or if the default
    /// file cannot be written.
    pub fn load_config(&self) -> Result<ClientConfig, ConfigError> {
        match fs::read_to_string(&self.config_path) {
            Ok(content) => Ok(self.parse_or_default(&content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %self.config_path.display(), "Writing default configuration");
                let config = ClientConfig::default();
                self.save_config(&config)?;
                Ok(config)
            }
            Err(source) => Err(ConfigError::Io {
                path: self.config_path.clone(),
                source,
            }),
        }
    }

    /// Writes the configuration, replacing the file atomically.
    ///
    /// # Errors
    /// Returns error if serialization or any file operation fails.
    pub fn save_config(&self, config: &ClientConfig) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(config)?;
        write_atomic(&self.config_path, content.as_bytes())?;
        debug!(path = %self.config_path.display(), "Configuration saved");
        Ok(())
    }

    fn parse_or_default(&self, content: &str) -> ClientConfig {
        toml::from_str(content).unwrap_or_else(|e| {
            warn!(
                path = %self.config_path.display(),
                error = %e,
                "Malformed configuration, using defaults"
            );
            ClientConfig::default()
        })
    }
}

fn write_atomic(path: &Path, content: &[u8]) -> Result<(), ConfigError> {
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let io_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source| ConfigError::Io { path, source }
    };

    fs::create_dir_all(dir).map_err(io_error(dir))?;
    let mut file = NamedTempFile::new_in(dir).map_err(io_error(dir))?;
    file.write_all(content).map_err(io_error(file.path()))?;
    file.persist(path).map_err(|e| io_error(path)(e.error))?;
    Ok(())
}
