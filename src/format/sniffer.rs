//! Format sniffing
//!
//! Content type and URL suffix catch SVG, magic bytes catch raster formats,
//! and the declared content type is the last resort before the JPEG default.

use super::ImageFormat;
use url::Url;

const SVG_SUFFIX: &str = ".svg";

/// Decides the format of a downloaded image
///
/// # Decision Order
///
/// First match wins:
///
/// 1. `Content-Type` names SVG, or the URL ends in `.svg` → [`ImageFormat::Svg`]
/// 2. Byte signature of a known raster format
/// 3. Raster format named inside the `Content-Type` string
/// 4. [`ImageFormat::FALLBACK`] (JPEG)
///
/// SVG is served as text and cannot be told apart by its bytes, so it is
/// checked first. Byte signatures beat the declared type for raster images
/// because servers frequently send `application/octet-stream` or a wrong
/// image type.
///
/// # Examples
///
/// ```
/// use image_harvester::format::{sniff_format, ImageFormat};
///
/// let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
/// let format = sniff_format(&jpeg, Some("application/octet-stream"), "https://a.com/x");
/// assert_eq!(format, ImageFormat::Jpeg);
///
/// let format = sniff_format(b"<svg/>", Some("text/plain"), "https://a.com/logo.svg");
/// assert_eq!(format, ImageFormat::Svg);
/// ```
pub fn sniff_format(bytes: &[u8], content_type: Option<&str>, url: &str) -> ImageFormat {
    if declares_svg(content_type) || has_svg_suffix(url) {
        tracing::debug!("{} treated as SVG", url);
        return ImageFormat::Svg;
    }

    if let Some(format) = detect_signature(bytes) {
        tracing::debug!("{} detected as {} from signature", url, format);
        return format;
    }

    if let Some(format) = content_type.and_then(format_from_content_type) {
        tracing::debug!("{} detected as {} from content type", url, format);
        return format;
    }

    tracing::debug!(
        "No format detected for {}, defaulting to {}",
        url,
        ImageFormat::FALLBACK
    );
    ImageFormat::FALLBACK
}

/// Same as [`sniff_format`], returning the file extension (with dot)
pub fn sniff_extension(bytes: &[u8], content_type: Option<&str>, url: &str) -> &'static str {
    sniff_format(bytes, content_type, url).extension()
}

/// Classifies raster image bytes by their magic signature
pub fn detect_signature(bytes: &[u8]) -> Option<ImageFormat> {
    ImageFormat::RASTER
        .into_iter()
        .find(|format| format.matches_signature(bytes))
}

/// Finds a raster format named anywhere in a `Content-Type` value
///
/// Substring matching, case-insensitive, so `image/pjpeg` and
/// `image/x-png; charset=binary` are recognised too.
pub fn format_from_content_type(content_type: &str) -> Option<ImageFormat> {
    let content_type = content_type.to_ascii_lowercase();

    ImageFormat::RASTER.into_iter().find(|format| {
        format
            .content_type_keys()
            .iter()
            .any(|key| content_type.contains(key))
    })
}

fn declares_svg(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| {
        let ct = ct.to_ascii_lowercase();
        ImageFormat::Svg
            .content_type_keys()
            .iter()
            .any(|key| ct.contains(key))
    })
}

/// Checks the raw URL and, when it parses, its path without the query string
fn has_svg_suffix(url: &str) -> bool {
    if url.to_ascii_lowercase().ends_with(SVG_SUFFIX) {
        return true;
    }

    Url::parse(url)
        .map(|parsed| parsed.path().to_ascii_lowercase().ends_with(SVG_SUFFIX))
        .unwrap_or(false)
}
