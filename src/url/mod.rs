//! URL handling module
//!
//! This module provides domain extraction (the storage namespace for a run),
//! resolution of page-relative image references, and normalization of the
//! user-supplied target URL.

mod domain;
mod resolve;

pub use domain::extract_domain;
pub use resolve::{normalize_target_url, resolve_reference};
