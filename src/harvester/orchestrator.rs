//! Harvest orchestration
//!
//! This module sequences one run:
//! - Resolving the domain and creating the destination directory
//! - Fetching and parsing the page
//! - Processing tag references, then CSS references, one at a time
//! - Reporting progress and folding every failure into a [`SessionOutcome`]

use crate::config::Config;
use crate::harvester::extractor::{extract_page, ImageReference};
use crate::harvester::fetcher::{build_http_client, fetch_image, save_inline_svg, ImageFetch};
use crate::harvester::progress::{percent_complete, ProgressReporter};
use crate::output::HarvestSummary;
use crate::url::{extract_domain, normalize_target_url};
use crate::HarvestError;
use reqwest::Client;
use std::path::{Path, PathBuf};
use url::Url;

/// Message carried by a successful outcome
pub const COMPLETION_MESSAGE: &str = "Download completed";

/// Terminal result of one harvest run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The page was processed; individual images may still have failed
    Success {
        directory: PathBuf,
        message: String,
        summary: HarvestSummary,
    },
    /// The run aborted before any image was attempted
    Failure { reason: String },
}

impl SessionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Destination directory, present only on success
    pub fn directory(&self) -> Option<&Path> {
        match self {
            Self::Success { directory, .. } => Some(directory.as_path()),
            Self::Failure { .. } => None,
        }
    }

    /// Human-readable completion or error message
    pub fn message(&self) -> &str {
        match self {
            Self::Success { message, .. } => message.as_str(),
            Self::Failure { reason } => reason.as_str(),
        }
    }

    /// Splits into the `(directory, success, message)` triple
    pub fn into_parts(self) -> (Option<PathBuf>, bool, String) {
        match self {
            Self::Success {
                directory, message, ..
            } => (Some(directory), true, message),
            Self::Failure { reason } => (None, false, reason),
        }
    }
}

/// Runs harvests with one configuration and one HTTP client
pub struct Harvester {
    config: Config,
    client: Client,
}

impl Harvester {
    /// Creates a harvester, building its HTTP client from `config`
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        let client = build_http_client(&config.http)?;
        Ok(Self { config, client })
    }

    /// Downloads every image on `target`, reporting progress as it goes
    ///
    /// Never returns an error: page-level failures become
    /// [`SessionOutcome::Failure`], per-image failures are logged and counted.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use image_harvester::{Config, Harvester};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let harvester = Harvester::new(Config::default())?;
    /// let outcome = harvester
    ///     .harvest("https://example.com", &mut |p: u8| println!("{}%", p))
    ///     .await;
    /// println!("{}", outcome.message());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn harvest<P>(&self, target: &str, progress: &mut P) -> SessionOutcome
    where
        P: ProgressReporter + ?Sized,
    {
        match self.run(target, progress).await {
            Ok((directory, summary)) => {
                tracing::info!(
                    "Harvest completed: {} saved, {} failed, {} skipped into {}",
                    summary.saved_count(),
                    summary.failed,
                    summary.skipped,
                    directory.display()
                );
                SessionOutcome::Success {
                    directory,
                    message: COMPLETION_MESSAGE.to_string(),
                    summary,
                }
            }
            Err(e) => {
                tracing::error!("Harvest of {} failed: {}", target, e);
                SessionOutcome::Failure {
                    reason: format!("Error occurred: {}", e),
                }
            }
        }
    }

    async fn run<P>(
        &self,
        target: &str,
        progress: &mut P,
    ) -> Result<(PathBuf, HarvestSummary), HarvestError>
    where
        P: ProgressReporter + ?Sized,
    {
        let url = normalize_target_url(target)?;
        let domain = extract_domain(url.as_str());
        let directory = self.config.storage.domain_dir(&domain);

        tokio::fs::create_dir_all(&directory).await?;
        tracing::info!("Harvesting {} into {}", url, directory.display());

        let page = extract_page(&self.client, &url).await?;
        let images = page.images;
        let total = images.total_count();

        let mut run = RunState::new(total);

        for reference in &images.tag_references {
            match reference {
                ImageReference::Remote(src) => {
                    let fetch =
                        fetch_image(&self.client, src, &page.base_url, &directory, run.index).await;
                    run.apply(fetch);
                }
                ImageReference::InlineSvg(markup) => {
                    let fetch = save_inline_svg(markup, &directory, run.index).await;
                    run.apply(fetch);
                }
                ImageReference::Missing => {
                    tracing::debug!("Skipping <img> without src");
                    run.summary.record_skipped();
                }
            }
            run.advance(progress);
        }

        for reference in &images.css_references {
            let fetch = self
                .fetch_css_reference(reference, &page.base_url, &directory, run.index)
                .await;
            run.apply(fetch);
            run.advance(progress);
        }

        Ok((directory, run.summary))
    }

    async fn fetch_css_reference(
        &self,
        reference: &str,
        base_url: &Url,
        directory: &Path,
        index: usize,
    ) -> ImageFetch {
        tracing::debug!("Fetching CSS background {}", reference);
        fetch_image(&self.client, reference, base_url, directory, index).await
    }
}

/// Counters threaded through the per-reference loop
struct RunState {
    index: usize,
    processed: usize,
    total: usize,
    summary: HarvestSummary,
}

impl RunState {
    fn new(total: usize) -> Self {
        Self {
            index: 0,
            processed: 0,
            total,
            summary: HarvestSummary::new(total),
        }
    }

    fn apply(&mut self, fetch: ImageFetch) {
        self.summary.record(&fetch.result);
        self.index = fetch.next_index;
    }

    fn advance<P>(&mut self, progress: &mut P)
    where
        P: ProgressReporter + ?Sized,
    {
        self.processed += 1;
        if let Some(percent) = percent_complete(self.processed, self.total) {
            progress.report(percent);
        }
    }
}

/// Downloads every image on `url` into `data/downloaded/<domain>`
///
/// Uses the default configuration. See [`Harvester::harvest`].
///
/// # Example
///
/// ```no_run
/// # async fn example() {
/// let outcome = image_harvester::download("example.com", &mut |_: u8| {}).await;
/// let (directory, success, message) = outcome.into_parts();
/// # }
/// ```
pub async fn download<P>(url: &str, progress: &mut P) -> SessionOutcome
where
    P: ProgressReporter + ?Sized,
{
    match Harvester::new(Config::default()) {
        Ok(harvester) => harvester.harvest(url, progress).await,
        Err(e) => SessionOutcome::Failure {
            reason: format!("Error occurred: {}", e),
        },
    }
}
