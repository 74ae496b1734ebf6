//! HTTP fetcher and image writer
//!
//! This module handles every network request a harvest run makes:
//! - Building the HTTP client from configuration
//! - Fetching the target page body
//! - Downloading a single image through a `temp_<n>` file, sniffing its
//!   format, and renaming it to `image_<n><ext>`
//! - Writing inline SVG markup straight to disk

use crate::config::HttpConfig;
use crate::format::{sniff_format, ImageFormat};
use crate::url::resolve_reference;
use crate::HarvestError;
use reqwest::header::CONTENT_TYPE;
use reqwest::{redirect::Policy, Client};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Outcome of one image reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadResult {
    /// Image written to its final path
    Saved(PathBuf),
    /// Nothing written; the reason is kept for reporting
    Failed(String),
}

impl DownloadResult {
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved(_))
    }
}

/// Result of handling one reference, with the index the next one must use
///
/// The index always advances by one, whether the image was saved or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFetch {
    pub next_index: usize,
    pub result: DownloadResult,
}

/// A fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after redirects; relative references resolve against it
    pub final_url: Url,
    /// Decoded page body
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use image_harvester::config::HttpConfig;
/// use image_harvester::harvester::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches the target page
///
/// Transport errors and non-success statuses are both errors; the caller
/// treats either as fatal for the run.
pub async fn fetch_page(client: &Client, url: &Url) -> Result<FetchedPage, HarvestError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|source| HarvestError::Http {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(HarvestError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let final_url = response.url().clone();
    let body = response.text().await.map_err(|source| HarvestError::Http {
        url: url.to_string(),
        source,
    })?;

    Ok(FetchedPage { final_url, body })
}

/// Downloads one image reference and commits it as `image_<index><ext>`
///
/// Failures are logged and absorbed: the returned [`ImageFetch`] carries
/// `index + 1` either way, and no `temp_<index>` file is left behind.
pub async fn fetch_image(
    client: &Client,
    reference: &str,
    base_url: &Url,
    dest_dir: &Path,
    index: usize,
) -> ImageFetch {
    let result = match try_fetch_image(client, reference, base_url, dest_dir, index).await {
        Ok(path) => {
            tracing::info!("Downloaded: {}", path.display());
            DownloadResult::Saved(path)
        }
        Err(e) => {
            tracing::warn!("Failed to download {}: {}", reference, e);
            DownloadResult::Failed(e.to_string())
        }
    };

    ImageFetch {
        next_index: index + 1,
        result,
    }
}

async fn try_fetch_image(
    client: &Client,
    reference: &str,
    base_url: &Url,
    dest_dir: &Path,
    index: usize,
) -> Result<PathBuf, HarvestError> {
    let url = resolve_reference(base_url, reference)?;
    tracing::debug!("Resolved {} to {}", reference, url);

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|source| HarvestError::Http {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(HarvestError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let body = response.bytes().await.map_err(|source| HarvestError::Http {
        url: url.to_string(),
        source,
    })?;

    let temp_path = dest_dir.join(temp_file_name(index));
    let committed = commit_image(
        &temp_path,
        &body,
        content_type.as_deref(),
        url.as_str(),
        dest_dir,
        index,
    )
    .await;

    if committed.is_err() {
        remove_temp_file(&temp_path).await;
    }

    committed
}

/// Writes the body to the temp path, then renames it after sniffing
async fn commit_image(
    temp_path: &Path,
    body: &[u8],
    content_type: Option<&str>,
    url: &str,
    dest_dir: &Path,
    index: usize,
) -> Result<PathBuf, HarvestError> {
    tokio::fs::write(temp_path, body)
        .await
        .map_err(|source| HarvestError::ImageWrite {
            path: temp_path.display().to_string(),
            source,
        })?;

    let format = sniff_format(body, content_type, url);
    let final_path = dest_dir.join(image_file_name(index, format));
    remove_stale_siblings(dest_dir, index, format).await;

    tokio::fs::rename(temp_path, &final_path)
        .await
        .map_err(|source| HarvestError::ImageWrite {
            path: final_path.display().to_string(),
            source,
        })?;

    Ok(final_path)
}

async fn remove_temp_file(temp_path: &Path) {
    remove_if_present(temp_path).await;
}

/// Deletes `image_<index>` files left by an earlier run under another extension
///
/// Each index maps to exactly one file, so a re-run that sniffs a different
/// format must not leave the old one beside the new one.
async fn remove_stale_siblings(dest_dir: &Path, index: usize, keep: ImageFormat) {
    for format in ImageFormat::ALL.into_iter().filter(|f| *f != keep) {
        remove_if_present(&dest_dir.join(image_file_name(index, format))).await;
    }
}

async fn remove_if_present(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!("Removed {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Could not remove {}: {}", path.display(), e),
    }
}

/// Writes inline SVG markup as `image_<index>.svg`
///
/// No network access. Like [`fetch_image`], the index advances even when
/// the write fails.
pub async fn save_inline_svg(markup: &str, dest_dir: &Path, index: usize) -> ImageFetch {
    let path = dest_dir.join(image_file_name(index, ImageFormat::Svg));
    remove_stale_siblings(dest_dir, index, ImageFormat::Svg).await;

    let result = match tokio::fs::write(&path, markup.as_bytes()).await {
        Ok(()) => {
            tracing::info!("Saved inline SVG: {}", path.display());
            DownloadResult::Saved(path)
        }
        Err(e) => {
            tracing::warn!("Failed to save inline SVG {}: {}", path.display(), e);
            DownloadResult::Failed(e.to_string())
        }
    };

    ImageFetch {
        next_index: index + 1,
        result,
    }
}

/// Final file name for the image at `index`
pub fn image_file_name(index: usize, format: ImageFormat) -> String {
    format!("image_{}{}", index, format.extension())
}

/// Temporary file name used while the image at `index` is being written
pub fn temp_file_name(index: usize) -> String {
    format!("temp_{}", index)
}
