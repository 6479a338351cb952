//! Page records and the per-run result aggregator

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Selects which optional fields extraction populates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentFlags {
    pub text: bool,
    pub images: bool,
    pub links: bool,
    pub videos: bool,
}

impl ContentFlags {
    /// Every content type enabled
    pub const ALL: Self = Self {
        text: true,
        images: true,
        links: true,
        videos: true,
    };

    /// No optional content; records carry only url and title
    pub const NONE: Self = Self {
        text: false,
        images: false,
        links: false,
        videos: false,
    };

    /// Names of the enabled flags, in record field order
    pub fn enabled(&self) -> Vec<&'static str> {
        [
            ("text", self.text),
            ("images", self.images),
            ("links", self.links),
            ("videos", self.videos),
        ]
        .into_iter()
        .filter_map(|(name, on)| on.then_some(name))
        .collect()
    }
}

impl Default for ContentFlags {
    fn default() -> Self {
        Self::ALL
    }
}

impl fmt::Display for ContentFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let enabled = self.enabled();
        if enabled.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", enabled.join(","))
        }
    }
}

/// Parses a comma-separated list such as `text,links`, `all` or `none`
impl FromStr for ContentFlags {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut flags = Self::NONE;
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part.to_ascii_lowercase().as_str() {
                "all" => flags = Self::ALL,
                "none" => {}
                "text" => flags.text = true,
                "images" => flags.images = true,
                "links" => flags.links = true,
                "videos" => flags.videos = true,
                other => {
                    return Err(format!(
                        "unknown content type '{}', expected text, images, links, videos, all or none",
                        other
                    ))
                }
            }
        }
        Ok(flags)
    }
}

/// Structured content extracted from one successfully parsed page
///
/// `text`, `images`, `links` and `videos` are present iff the matching
/// content flag was enabled when the run started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub videos: Option<Vec<String>>,
}

impl PageRecord {
    /// A record with only the URL set
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            text: None,
            images: None,
            links: None,
            videos: None,
        }
    }
}

/// Ordered collection of page records for one run
///
/// Insertion order is completion order. Records are only ever appended; the
/// set is cleared when a new run starts and read-only once export begins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    records: Vec<PageRecord>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record
    pub fn push(&mut self, record: PageRecord) {
        self.records.push(record);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PageRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Returns true if a record for the URL exists
    pub fn contains_url(&self, url: &str) -> bool {
        self.records.iter().any(|r| r.url == url)
    }
}

impl From<Vec<PageRecord>> for ResultSet {
    fn from(records: Vec<PageRecord>) -> Self {
        Self { records }
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a PageRecord;
    type IntoIter = std::slice::Iter<'a, PageRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
