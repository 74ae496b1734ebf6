//! HTML parser for discovering image references
//!
//! This module finds every image a page embeds:
//! - `<img>` elements and inline `<svg>` elements, in document order
//! - `url(...)` values inside `<style>` blocks, appended after the tags
//!
//! The order matters: it decides which `image_<n>` name each reference gets.

use crate::harvester::fetcher::fetch_page;
use crate::HarvestError;
use html5ever::driver::{self, ParseOpts};
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

/// Matches `url(x)`, `url('x')` and `url("x")` with optional inner padding
///
/// Quoted values may contain `)`; group 1 is double-quoted, 2 single-quoted,
/// 3 bare.
static CSS_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\(\s*(?:"([^"]*)"|'([^']*)'|([^'"\s)]*))\s*\)"#)
        .expect("CSS url regex is valid") // Static pattern, safe to panic
});

/// One image-bearing element found in the markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageReference {
    /// `src` of an `<img>` element, possibly relative
    Remote(String),
    /// Serialized `<svg>` element, saved without any fetch
    InlineSvg(String),
    /// `<img>` element without a usable `src`
    Missing,
}

/// All references discovered on one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedImages {
    /// Tag-based references in document order
    pub tag_references: Vec<ImageReference>,
    /// CSS `url(...)` references, in order of appearance
    pub css_references: Vec<String>,
}

impl ExtractedImages {
    /// Number of references that will be processed (and reported)
    pub fn total_count(&self) -> usize {
        self.tag_references.len() + self.css_references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_count() == 0
    }
}

/// A fetched and parsed page
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    /// URL after redirects, used as the base for relative references
    pub base_url: Url,
    pub images: ExtractedImages,
}

/// Fetches a page and extracts its image references
///
/// # Returns
///
/// * `Ok(ExtractedPage)` - Page fetched and parsed
/// * `Err(HarvestError)` - Transport failure or non-success status
pub async fn extract_page(client: &Client, url: &Url) -> Result<ExtractedPage, HarvestError> {
    let page = fetch_page(client, url).await?;
    let images = extract_images(&page.body);

    tracing::info!(
        "Found {} tag references and {} CSS references on {}",
        images.tag_references.len(),
        images.css_references.len(),
        page.final_url
    );

    Ok(ExtractedPage {
        base_url: page.final_url,
        images,
    })
}

/// Parses HTML content and extracts image references
///
/// # Example
///
/// ```
/// use image_harvester::harvester::{extract_images, ImageReference};
///
/// let html = r#"<img src="/a.png"><style>.x { background: url(b.jpg) }</style>"#;
/// let images = extract_images(html);
/// assert_eq!(images.tag_references, vec![ImageReference::Remote("/a.png".into())]);
/// assert_eq!(images.css_references, vec!["b.jpg".to_string()]);
/// assert_eq!(images.total_count(), 2);
/// ```
pub fn extract_images(html: &str) -> ExtractedImages {
    let document = parse_without_scripting(html);

    ExtractedImages {
        tag_references: extract_tag_references(&document),
        css_references: extract_style_references(&document),
    }
}

/// Parses as a browser with scripting disabled would
///
/// `Html::parse_document` keeps `<noscript>` content as raw text, which
/// hides fallback `<img>` elements from the selector.
fn parse_without_scripting(html: &str) -> Html {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            scripting_enabled: false,
            ..Default::default()
        },
        ..Default::default()
    };
    driver::parse_document(Html::new_document(), opts).one(html)
}

fn extract_tag_references(document: &Html) -> Vec<ImageReference> {
    let mut references = Vec::new();

    if let Ok(selector) = Selector::parse("img, svg") {
        for element in document.select(&selector) {
            references.push(to_reference(element));
        }
    }

    references
}

fn to_reference(element: ElementRef<'_>) -> ImageReference {
    if element.value().name() == "svg" {
        return ImageReference::InlineSvg(element.html());
    }

    match element.value().attr("src").map(str::trim) {
        Some(src) if !src.is_empty() => ImageReference::Remote(src.to_string()),
        _ => ImageReference::Missing,
    }
}

fn extract_style_references(document: &Html) -> Vec<String> {
    let mut references = Vec::new();

    if let Ok(selector) = Selector::parse("style") {
        for element in document.select(&selector) {
            let css = element.text().collect::<String>();
            references.extend(extract_css_urls(&css));
        }
    }

    references
}

/// Extracts every non-empty `url(...)` value from a CSS string
pub fn extract_css_urls(css: &str) -> Vec<String> {
    CSS_URL_PATTERN
        .captures_iter(css)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
