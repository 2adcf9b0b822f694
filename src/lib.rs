//! Gravatar - avatar URLs, downloads and uploads.
//!
//! This crate builds avatar URLs from email addresses, downloads avatars
//! through a shared cache that collapses concurrent requests for the same
//! image into one network fetch, and uploads new avatars for an account.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing the image service facade.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;

/// Current version of the library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = "gravatar";
