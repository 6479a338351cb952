use crate::UrlError;
use url::Url;

/// List of tracking query parameters to remove during normalization
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid", "msclkid"];

/// Schemes that never lead to a fetchable page
const SKIPPED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Normalizes an absolute URL into the canonical form used for deduplication
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Accept only HTTP and HTTPS
/// 3. Lowercase the host (done by the parser) and drop default ports
/// 4. Remove dot segments (done by the parser); empty path becomes /
/// 5. Remove fragment (everything after #)
/// 6. Remove tracking query parameters (utm_*, fbclid, ...)
/// 7. Sort remaining query parameters by key
/// 8. Remove empty query string (trailing ?)
///
/// Path case, trailing slashes and `www.` are preserved: servers may treat
/// them as different resources.
///
/// # Examples
///
/// ```
/// use gleaner::url::normalize_url;
///
/// let url = normalize_url("HTTP://Example.COM:80/a/../page?b=2&a=1#top").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/page?a=1&b=2");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    canonicalize(url)
}

/// Resolves a possibly relative href against the page it was found on
///
/// Returns the canonical absolute URL, or an error when the href cannot lead
/// to a fetchable page (`javascript:`, `mailto:`, `tel:`, `data:`, fragment-only
/// or empty links, non-HTTP schemes).
///
/// # Examples
///
/// ```
/// use gleaner::url::resolve_href;
/// use url::Url;
///
/// let base = Url::parse("https://a.test/docs/index.html").unwrap();
/// let url = resolve_href("../about#team", &base).unwrap();
/// assert_eq!(url.as_str(), "https://a.test/about");
/// ```
pub fn resolve_href(raw_href: &str, base_url: &Url) -> Result<Url, UrlError> {
    let href = raw_href.trim();

    if href.is_empty() || href.starts_with('#') {
        return Err(UrlError::NotFollowable(raw_href.to_string()));
    }

    let lowered = href.to_ascii_lowercase();
    if SKIPPED_SCHEMES.iter().any(|scheme| lowered.starts_with(scheme)) {
        return Err(UrlError::NotFollowable(raw_href.to_string()));
    }

    let joined = base_url
        .join(href)
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;
    canonicalize(joined)
}

fn canonicalize(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    if url.path().is_empty() {
        url.set_path("/");
    }

    url.set_fragment(None);

    if url.query().is_some() {
        let params = filter_and_sort_query_params(&url);
        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(params);
        }
    }

    Ok(url)
}

/// Filters out tracking parameters and sorts remaining query parameters
fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    // Stable sort keeps repeated keys in their original relative order
    params.sort_by(|a, b| a.0.cmp(&b.0));

    params
}

fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}
