//! Application layer composing domain ports and infrastructure adapters.

/// Application services.
pub mod services;

pub use services::ImageService;
