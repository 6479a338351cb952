use url::Url;

/// Decides which discovered links may be followed
///
/// An empty scope follows every link, which matches a plain depth-bounded
/// crawl. Patterns are either an exact host (`example.com`) or a wildcard
/// (`*.example.com`) covering the bare domain and all of its subdomains.
#[derive(Debug, Clone, Default)]
pub struct DomainScope {
    patterns: Vec<String>,
}

impl DomainScope {
    /// Builds a scope from configured patterns (lowercased on the way in)
    pub fn new(patterns: &[String]) -> Self {
        Self {
            patterns: patterns.iter().map(|p| p.to_lowercase()).collect(),
        }
    }

    /// Returns true when no restriction is configured
    pub fn is_unrestricted(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Returns true if the URL's host falls inside the scope
    pub fn allows(&self, url: &Url) -> bool {
        if self.is_unrestricted() {
            return true;
        }

        match url.host_str() {
            Some(host) => {
                let host = host.to_lowercase();
                self.patterns
                    .iter()
                    .any(|pattern| matches_wildcard(pattern, &host))
            }
            None => false,
        }
    }
}

fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    if let Some(base) = pattern.strip_prefix("*.") {
        candidate == base || candidate.ends_with(&format!(".{}", base))
    } else {
        candidate == pattern
    }
}
