use crate::{UrlError, UrlResult};
use url::Url;

/// Resolves an image reference found on a page against the page URL
///
/// Absolute references are returned as-is, relative and protocol-relative
/// ones are joined onto `base_url`. Only HTTP(S) results are accepted.
///
/// # Examples
///
/// ```
/// use image_harvester::url::resolve_reference;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/page").unwrap();
/// let resolved = resolve_reference(&base, "/img/logo.png").unwrap();
/// assert_eq!(resolved.as_str(), "https://example.com/img/logo.png");
/// ```
pub fn resolve_reference(base_url: &Url, reference: &str) -> UrlResult<Url> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(UrlError::Empty);
    }

    let resolved = base_url
        .join(reference)
        .map_err(|e| UrlError::Parse(format!("{}: {}", reference, e)))?;

    match resolved.scheme() {
        "http" | "https" => Ok(resolved),
        other => Err(UrlError::InvalidScheme(other.to_string())),
    }
}

/// Normalizes user input into a fetchable page URL
///
/// Surrounding whitespace is trimmed and `https://` is prepended when the
/// input carries no HTTP(S) scheme.
///
/// # Examples
///
/// ```
/// use image_harvester::url::normalize_target_url;
///
/// let url = normalize_target_url("  example.com/gallery ").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/gallery");
/// ```
pub fn normalize_target_url(input: &str) -> UrlResult<Url> {
    let input = input.trim();
    if input.is_empty() {
        return Err(UrlError::Empty);
    }

    let lowered = input.to_ascii_lowercase();
    let candidate = if lowered.starts_with("http://") || lowered.starts_with("https://") {
        input.to_string()
    } else {
        format!("https://{}", input)
    };

    let url = Url::parse(&candidate).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    Ok(url)
}
