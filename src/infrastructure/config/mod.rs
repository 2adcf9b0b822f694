//! Client configuration.

pub mod app_config;
pub mod args;
pub mod storage;

pub use app_config::{AvatarConfig, ClientConfig, LogLevel};
pub use args::{CliArgs, Command};
pub use storage::{CONFIG_FILE_NAME, ConfigError, StorageManager};
