//! Harvester module for page fetching and image downloading
//!
//! This module contains the core pipeline, including:
//! - HTTP fetching of the page and of individual images
//! - HTML parsing and image reference extraction
//! - Progress reporting
//! - Overall run orchestration
//!
//! Images are processed strictly one at a time: each fetch is awaited before
//! the next starts, and the progress reporter is called inline.

mod extractor;
mod fetcher;
mod orchestrator;
mod progress;

pub use extractor::{
    extract_css_urls, extract_images, extract_page, ExtractedImages, ExtractedPage,
    ImageReference,
};
pub use fetcher::{
    build_http_client, fetch_image, fetch_page, image_file_name, save_inline_svg, temp_file_name,
    DownloadResult, FetchedPage, ImageFetch,
};
pub use orchestrator::{download, Harvester, SessionOutcome, COMPLETION_MESSAGE};
pub use progress::{percent_complete, LogProgress, ProgressReporter};
