//! Content extractor
//!
//! This module parses a fetched document into a `PageRecord`:
//! - Page title (always, when the document has one)
//! - Visible body text, capped to a character limit
//! - Absolute image, anchor and video/embedded-frame URLs, as the page wrote them
//!
//! It also yields the outbound links the coordinator may enqueue. Those are
//! canonicalized for deduplication and collected regardless of the `links`
//! content flag; the recorded fields are only made absolute.

use crate::crawler::fetcher::{Document, FetchError};
use crate::record::{ContentFlags, PageRecord};
use crate::url::resolve_href;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Elements whose text content is never rendered
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Default character cap for extracted text
pub const DEFAULT_TEXT_LIMIT: usize = 1_000;

/// Extraction output for one page
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    /// The record to append to the result set
    pub record: PageRecord,

    /// Followable links found on the page, deduplicated, in document order
    pub outbound: Vec<Url>,
}

struct Selectors {
    title: Selector,
    body: Selector,
    anchors: Selector,
    images: Selector,
    videos: Selector,
}

impl Selectors {
    fn new() -> Result<Self, FetchError> {
        Ok(Self {
            title: selector("title")?,
            body: selector("body")?,
            anchors: selector("a[href]")?,
            images: selector("img[src]")?,
            videos: selector("video[src], video source[src], iframe[src]")?,
        })
    }
}

fn selector(css: &str) -> Result<Selector, FetchError> {
    Selector::parse(css).map_err(|e| FetchError::Parse(format!("selector {}: {:?}", css, e)))
}

/// Parses a document and extracts the fields selected by `flags`
///
/// Extraction never yields a partial record: any failure is reported as
/// `FetchError::Parse` and the page is skipped by the caller.
///
/// # Example
///
/// ```
/// use gleaner::crawler::{extract, Document};
/// use gleaner::ContentFlags;
/// use url::Url;
///
/// let document = Document {
///     url: Url::parse("https://a.test/").unwrap(),
///     body: r#"<html><head><title>A</title></head><body><a href="/b">B</a></body></html>"#.to_string(),
/// };
/// let page = extract(&document, ContentFlags::ALL, 1000).unwrap();
/// assert_eq!(page.record.title.as_deref(), Some("A"));
/// assert_eq!(page.outbound[0].as_str(), "https://a.test/b");
/// ```
pub fn extract(
    document: &Document,
    flags: ContentFlags,
    text_limit: usize,
) -> Result<ExtractedPage, FetchError> {
    let selectors = Selectors::new()?;
    let html = Html::parse_document(&document.body);
    let base = &document.url;

    let anchors = collect_urls(&html, &selectors.anchors, "href", base);
    let outbound = followable_links(&html, &selectors.anchors, base);

    let record = PageRecord {
        url: document.url.to_string(),
        title: extract_title(&html, &selectors.title),
        text: flags
            .text
            .then(|| visible_text(&html, &selectors.body, text_limit)),
        images: flags
            .images
            .then(|| collect_urls(&html, &selectors.images, "src", base)),
        links: flags.links.then_some(anchors),
        videos: flags
            .videos
            .then(|| collect_urls(&html, &selectors.videos, "src", base)),
    };

    Ok(ExtractedPage { record, outbound })
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html, title: &Selector) -> Option<String> {
    document
        .select(title)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Collects rendered text under `<body>`, whitespace-collapsed and capped to `limit` characters
fn visible_text(document: &Html, body: &Selector, limit: usize) -> String {
    let Some(body) = document.select(body).next() else {
        return String::new();
    };

    let words = body
        .descendants()
        .filter_map(|node| node.value().as_text().map(|text| (node, text)))
        .filter(|(node, _)| {
            !node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .map_or(false, |el| HIDDEN_ELEMENTS.contains(&el.name()))
            })
        })
        .flat_map(|(_, text)| text.split_whitespace());

    let mut collected = String::new();
    for word in words {
        if !collected.is_empty() {
            collected.push(' ');
        }
        collected.push_str(word);
        if collected.chars().count() >= limit {
            break;
        }
    }

    truncate_chars(&collected, limit)
}

fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}

/// Joins the `attr` of every element matching `selector` onto `base`
///
/// Query strings, fragments and non-HTTP schemes (`mailto:`, `data:`) are kept
/// verbatim. Empty and unparsable values are skipped.
fn collect_urls(document: &Html, selector: &Selector, attr: &str, base: &Url) -> Vec<String> {
    document
        .select(selector)
        .filter_map(|element| element.value().attr(attr))
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .filter_map(|raw| base.join(raw).ok())
        .map(String::from)
        .collect()
}

/// Anchors worth following: resolvable, not marked `download`, first occurrence only
fn followable_links(document: &Html, anchors: &Selector, base: &Url) -> Vec<Url> {
    let mut seen = HashSet::new();
    document
        .select(anchors)
        .filter(|element| !is_download(element))
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_href(href, base).ok())
        .filter(|url| seen.insert(url.as_str().to_string()))
        .collect()
}

fn is_download(element: &ElementRef<'_>) -> bool {
    element.value().attr("download").is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(body: &str) -> Document {
        Document {
            url: Url::parse("https://example.com/page").unwrap(),
            body: body.to_string(),
        }
    }

    fn extract_all(body: &str) -> ExtractedPage {
        extract(&document(body), ContentFlags::ALL, DEFAULT_TEXT_LIMIT).unwrap()
    }

    #[test]
    fn test_extract_title() {
        let page = extract_all("<html><head><title>  Test Page  </title></head><body></body></html>");
        assert_eq!(page.record.title, Some("Test Page".to_string()));
        assert_eq!(page.record.url, "https://example.com/page");
    }

    #[test]
    fn test_no_title() {
        let page = extract_all("<html><head></head><body>x</body></html>");
        assert_eq!(page.record.title, None);
    }

    #[test]
    fn test_visible_text_skips_scripts_and_styles() {
        let page = extract_all(
            r#"<html><head><style>p { color: red }</style></head><body>
                <h1>Hello</h1>
                <script>var hidden = 1;</script>
                <p>visible   text</p>
                <noscript>enable js</noscript>
            </body></html>"#,
        );
        assert_eq!(page.record.text.as_deref(), Some("Hello visible text"));
    }

    #[test]
    fn test_text_is_capped() {
        let long = "word ".repeat(1_000);
        let body = format!("<html><body><p>{}</p></body></html>", long);
        let page = extract(&document(&body), ContentFlags::ALL, 12).unwrap();
        assert_eq!(page.record.text.as_deref(), Some("word word wo"));
    }

    #[test]
    fn test_text_cap_counts_characters_not_bytes() {
        let page = extract(
            &document("<html><body>héllo wörld</body></html>"),
            ContentFlags::ALL,
            4,
        )
        .unwrap();
        assert_eq!(page.record.text.as_deref(), Some("héll"));
    }

    #[test]
    fn test_extract_media_urls() {
        let page = extract_all(
            r#"<html><body>
                <img src="/img/a.png">
                <img src="https://cdn.test/b.jpg">
                <img src="">
                <video src="/v/clip.mp4"></video>
                <video><source src="/v/other.webm"></video>
                <iframe src="https://player.test/embed/1"></iframe>
            </body></html>"#,
        );
        assert_eq!(
            page.record.images,
            Some(vec![
                "https://example.com/img/a.png".to_string(),
                "https://cdn.test/b.jpg".to_string(),
            ])
        );
        assert_eq!(
            page.record.videos,
            Some(vec![
                "https://example.com/v/clip.mp4".to_string(),
                "https://example.com/v/other.webm".to_string(),
                "https://player.test/embed/1".to_string(),
            ])
        );
    }

    #[test]
    fn test_fields_follow_flags() {
        let flags = ContentFlags {
            text: false,
            images: true,
            links: false,
            videos: false,
        };
        let page = extract(
            &document(r#"<html><body><a href="/next">n</a>text</body></html>"#),
            flags,
            DEFAULT_TEXT_LIMIT,
        )
        .unwrap();
        assert!(page.record.text.is_none());
        assert_eq!(page.record.images, Some(vec![]));
        assert!(page.record.links.is_none());
        assert!(page.record.videos.is_none());
        // Outbound links are still collected for the frontier
        assert_eq!(page.outbound.len(), 1);
    }

    #[test]
    fn test_recorded_urls_are_not_canonicalized() {
        let page = extract_all(
            r#"<html><body>
                <a href="mailto:me@example.com">mail</a>
                <a href="/search?b=2&a=1&utm_source=x">search</a>
                <a href="/docs#install">docs</a>
                <img src="data:image/png;base64,AAAA">
                <img src="/i.png?utm_campaign=z&v=3">
            </body></html>"#,
        );
        assert_eq!(
            page.record.links,
            Some(vec![
                "mailto:me@example.com".to_string(),
                "https://example.com/search?b=2&a=1&utm_source=x".to_string(),
                "https://example.com/docs#install".to_string(),
            ])
        );
        assert_eq!(
            page.record.images,
            Some(vec![
                "data:image/png;base64,AAAA".to_string(),
                "https://example.com/i.png?utm_campaign=z&v=3".to_string(),
            ])
        );

        // The frontier still sees canonical, followable URLs only
        let outbound: Vec<&str> = page.outbound.iter().map(|u| u.as_str()).collect();
        assert_eq!(
            outbound,
            vec!["https://example.com/search?a=1&b=2", "https://example.com/docs"]
        );
    }

    #[test]
    fn test_extract_relative_and_absolute_links() {
        let page = extract_all(
            r#"<html><body>
                <a href="/other">1</a>
                <a href="sibling">2</a>
                <a href="https://other.com/page3">3</a>
            </body></html>"#,
        );
        assert_eq!(
            page.record.links,
            Some(vec![
                "https://example.com/other".to_string(),
                "https://example.com/sibling".to_string(),
                "https://other.com/page3".to_string(),
            ])
        );
    }

    #[test]
    fn test_mixed_valid_and_invalid_links() {
        let page = extract_all(
            r##"<html><body>
                <a href="/valid">Valid</a>
                <a href="javascript:alert('no')">Invalid</a>
                <a href="mailto:test@example.com">Invalid</a>
                <a href="#section">Jump</a>
                <a href="/another-valid">Valid</a>
            </body></html>"##,
        );
        assert_eq!(page.outbound.len(), 2);
    }

    #[test]
    fn test_outbound_skips_downloads_and_duplicates() {
        let page = extract_all(
            r#"<html><body>
                <a href="/file.pdf" download>Download</a>
                <a href="/a">A</a>
                <a href="/a#top">A again</a>
            </body></html>"#,
        );
        let outbound: Vec<&str> = page.outbound.iter().map(|u| u.as_str()).collect();
        assert_eq!(outbound, vec!["https://example.com/a"]);
        // The record still lists every anchor
        assert_eq!(page.record.links.as_ref().map(Vec::len), Some(3));
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abc", 5), "abc");
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }
}
