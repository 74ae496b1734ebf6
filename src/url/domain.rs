use url::Url;

/// Extracts the domain (host plus explicit port) from a URL string
///
/// This is the storage namespace for a harvest run: the destination folder
/// is `<base-dir>/downloaded/<domain>`. Malformed input never fails; a
/// best-effort authority is cut out of the raw string instead, which may be
/// empty.
///
/// # Examples
///
/// ```
/// use image_harvester::url::extract_domain;
///
/// assert_eq!(extract_domain("https://example.com/path"), "example.com");
/// assert_eq!(extract_domain("https://EXAMPLE.COM/path"), "example.com");
/// assert_eq!(extract_domain("http://127.0.0.1:8080/"), "127.0.0.1:8080");
/// assert_eq!(extract_domain("not a url"), "not a url");
/// ```
pub fn extract_domain(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => match (parsed.host_str(), parsed.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host.to_lowercase(), port),
            (Some(host), None) => host.to_lowercase(),
            (None, _) => String::new(),
        },
        Err(_) => best_effort_authority(url),
    }
}

/// Cuts the authority out of a string that `Url` refused to parse
fn best_effort_authority(raw: &str) -> String {
    let raw = raw.trim();
    let without_scheme = match raw.find("://") {
        Some(idx) => &raw[idx + 3..],
        None => raw,
    };

    let authority = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();

    // Drop userinfo
    let host = authority.rsplit('@').next().unwrap_or_default();

    host.to_lowercase()
}
