//! Configuration module for the harvester
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key is optional; `Config::default()` writes to `data/downloaded/<domain>`.
//!
//! # Example
//!
//! ```no_run
//! use image_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvester.toml")).unwrap();
//! println!("Request timeout: {}s", config.http.timeout_secs);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, HttpConfig, StorageConfig, DEFAULT_BASE_DIR};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
