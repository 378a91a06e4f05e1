use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

static URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://[^\s]+").expect("valid url regex"));

/// Collects every URL-like substring of `text`, deduplicated, in the order
/// each one first appears.
///
/// Matching is deliberately naive: anything from `http://` or `https://` up
/// to the next whitespace counts, trailing punctuation included.
pub fn extract_urls(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    URL_REGEX
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|url| seen.insert(*url))
        .map(str::to_string)
        .collect()
}

/// Blocklist of spam domains.
///
/// A URL is a hit when its text contains any entry as a plain substring.
/// This is permissive on purpose: a domain anywhere in the host, path or
/// query string matches, and so does an incidental substring such as
/// `notbad.example` for the entry `bad.example`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpamDomains(Vec<String>);

impl SpamDomains {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for domain in domains {
            // An empty entry would match every URL.
            let trimmed = domain.as_ref().trim();
            if trimmed.is_empty() || out.iter().any(|d| d == trimmed) {
                continue;
            }
            out.push(trimmed.to_string());
        }
        Self(out)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// The first blocklist entry contained in `url`, if any.
    pub fn matching_domain(&self, url: &str) -> Option<&str> {
        self.iter().find(|domain| url.contains(domain))
    }
}

impl<S: AsRef<str>> FromIterator<S> for SpamDomains {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::new(iter)
    }
}

pub fn matches_any_domain(url: &str, domains: &SpamDomains) -> bool {
    domains.matching_domain(url).is_some()
}
