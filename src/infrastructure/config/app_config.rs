//! Client configuration.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use crate::domain::entities::{
    AvatarQueryOptions, DEFAULT_AVATAR_BASE_URL, DEFAULT_AVATAR_SIZE, DefaultAvatarOption, Rating,
};
use crate::infrastructure::http::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use crate::infrastructure::image::DEFAULT_UPLOAD_URL;

const APP_NAME: &str = "gravatar";
const APP_QUALIFIER: &str = "com";
const APP_ORGANIZATION: &str = "gravatar";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Client configuration, from file and CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Log file path. Logs go to stderr when unset.
    #[serde(default)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// `User-Agent` sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Base URL avatars are served from.
    #[serde(default = "default_avatar_base_url")]
    pub avatar_base_url: String,

    /// Avatar upload endpoint.
    #[serde(default = "default_upload_url")]
    pub upload_url: String,

    /// Default avatar query options.
    #[serde(default)]
    pub avatar: AvatarConfig,
}

/// Default query options for avatar URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarConfig {
    /// Requested size in pixels.
    #[serde(default = "default_avatar_size")]
    pub size: u32,

    /// Maximum rating.
    #[serde(default)]
    pub rating: Rating,

    /// Fallback when no avatar exists (`404`, `mp`, `identicon`, ... or a URL).
    #[serde(default = "default_avatar_option")]
    pub default_avatar: String,

    /// Always serve the default avatar.
    #[serde(default)]
    pub force_default: bool,
}

impl AvatarConfig {
    /// Converts to query options. An unknown default option falls back to `404`.
    #[must_use]
    pub fn query_options(&self) -> AvatarQueryOptions {
        let default_avatar = self.default_avatar.parse().unwrap_or_else(|e| {
            warn!(error = %e, "Invalid default avatar option, using 404");
            DefaultAvatarOption::Status404
        });

        let options = AvatarQueryOptions::default()
            .with_default_avatar(default_avatar)
            .with_preferred_size(self.size)
            .with_rating(self.rating);

        if self.force_default {
            options.with_force_default(true)
        } else {
            options
        }
    }
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_AVATAR_SIZE,
            rating: Rating::G,
            default_avatar: default_avatar_option(),
            force_default: false,
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_avatar_base_url() -> String {
    DEFAULT_AVATAR_BASE_URL.to_string()
}

fn default_upload_url() -> String {
    DEFAULT_UPLOAD_URL.to_string()
}

fn default_avatar_size() -> u32 {
    DEFAULT_AVATAR_SIZE
}

fn default_avatar_option() -> String {
    "404".to_string()
}

use super::args::CliArgs;

impl ClientConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(timeout_secs) = args.timeout_secs {
            self.timeout_secs = timeout_secs;
        }
        if let Some(size) = args.size {
            self.avatar.size = size;
        }
        if let Some(rating) = args.rating {
            self.avatar.rating = rating;
        }
        if let Some(default_avatar) = &args.default_avatar {
            self.avatar.default_avatar = default_avatar.clone();
        }
        if args.force_default {
            self.avatar.force_default = true;
        }
    }

    /// Returns the platform configuration directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns the request timeout.
    #[must_use]
    pub const fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            log_path: None,
            log_level: LogLevel::Info,
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            avatar_base_url: default_avatar_base_url(),
            upload_url: default_upload_url(),
            avatar: AvatarConfig::default(),
        }
    }
}
