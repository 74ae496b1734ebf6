//! Image Harvester: single-page image downloader
//!
//! This crate fetches one web page, discovers the images it references
//! (`<img>` tags, inline `<svg>` markup and CSS `url(...)` rules inside
//! `<style>` blocks) and saves each of them under
//! `<base-dir>/downloaded/<domain>/image_<n><ext>`, reporting progress as it goes.

pub mod config;
pub mod format;
pub mod harvester;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for harvesting operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Failed to write image {path}: {source}")]
    ImageWrite {
        path: String,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Empty URL")]
    Empty,
}

/// Result type alias for harvesting operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use format::{sniff_extension, ImageFormat};
pub use harvester::{download, Harvester, ProgressReporter, SessionOutcome};
pub use output::HarvestSummary;
pub use url::{extract_domain, normalize_target_url, resolve_reference};
