use super::app_config::LogLevel;
use crate::domain::entities::Rating;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "gravatar",
    version,
    about = "Build Gravatar avatar URLs, download avatars and upload new ones",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH", global = true)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// Request timeout in seconds.
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Avatar size in pixels.
    #[arg(long, global = true)]
    pub size: Option<u32>,

    /// Maximum avatar rating.
    #[arg(long, value_enum, global = true)]
    pub rating: Option<Rating>,

    /// Default avatar when none exists (404, mp, identicon, ... or a URL).
    #[arg(long, value_name = "OPTION", global = true)]
    pub default_avatar: Option<String>,

    /// Always serve the default avatar.
    #[arg(long, global = true)]
    pub force_default: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the avatar URL for an email address or hash.
    Url {
        /// Email address, or hash with `--hash`.
        identifier: String,

        /// Treat the identifier as a precomputed hash.
        #[arg(long)]
        hash: bool,
    },

    /// Download an avatar and save it to a file.
    Fetch {
        /// Email address, or hash with `--hash`.
        identifier: String,

        /// Output file; the format follows the extension.
        #[arg(short, long, value_name = "PATH")]
        output: PathBuf,

        /// Treat the identifier as a precomputed hash.
        #[arg(long)]
        hash: bool,

        /// Bypass any cached copy.
        #[arg(long)]
        force_refresh: bool,
    },

    /// Upload an image as the account's avatar.
    Upload {
        /// Image file to upload.
        path: PathBuf,

        /// Account email address.
        #[arg(long)]
        email: String,

        /// OAuth access token.
        #[arg(long, env = "GRAVATAR_TOKEN", hide_env_values = true)]
        token: String,
    },
}
