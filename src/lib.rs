//! Link-topology spam detection.
//!
//! Content is spam when one of its links reaches a blocklisted domain: by its
//! own text, through the redirects it triggers, or through the links on the
//! pages it leads to, up to a depth budget.

pub mod checker;
pub mod config;
pub mod domain;
pub mod fetcher;
pub mod infrastructure;
pub mod links;
pub mod resolver;

#[cfg(test)]
mod testing;

pub use checker::LinkSpamChecker;
pub use domain::{HitSource, SpamCheckRequest, SpamHit, Verdict};
pub use fetcher::{FetchError, FetchedPage, Fetcher, HttpFetcher};
pub use links::{extract_urls, matches_any_domain, SpamDomains};
pub use resolver::{LinkResolver, VisitedSet};

