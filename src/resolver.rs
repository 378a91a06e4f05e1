//! Link resolution: decides whether a URL leads to a blocklisted domain.
//!
//! Each URL is checked by its own text first. If that is clean it is fetched
//! with a redirect budget equal to its remaining depth, the landing location
//! is checked, and the links in the body are checked directly. When depth
//! remains, those links are explored the same way with one unit less.
//!
//! Exploration runs off an explicit stack of depth-tagged URLs rather than
//! recursion, in the same depth-first order, stopping at the first hit.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::{
    domain::{HitSource, Resolution, SpamHit},
    fetcher::{FetchError, Fetcher},
    links::{extract_urls, SpamDomains},
};

/// URLs already explored during one top-level check, with the most remaining
/// depth each was explored at.
///
/// A URL is explored again only when a later path reaches it with strictly
/// more depth left, so a shorter path found late still gets its full budget.
/// Every re-exploration raises the recorded depth, which bounds cycles to at
/// most `depth + 1` fetches per URL.
#[derive(Debug, Default)]
pub struct VisitedSet {
    explored: HashMap<String, u32>,
    fetches: usize,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.explored.contains_key(url)
    }

    /// Most remaining depth `url` has been explored with.
    pub fn explored_depth(&self, url: &str) -> Option<u32> {
        self.explored.get(url).copied()
    }

    /// True if exploring `url` with `depth` left would add nothing.
    pub fn covers(&self, url: &str, depth: u32) -> bool {
        self.explored_depth(url).is_some_and(|seen| seen >= depth)
    }

    /// Records an exploration. Returns `false` if it was already covered.
    pub fn mark(&mut self, url: &str, depth: u32) -> bool {
        if self.covers(url, depth) {
            return false;
        }
        self.explored.insert(url.to_string(), depth);
        self.fetches += 1;
        true
    }

    /// Distinct URLs explored.
    pub fn len(&self) -> usize {
        self.explored.len()
    }

    pub fn is_empty(&self) -> bool {
        self.explored.is_empty()
    }

    /// Explorations recorded, counting re-explorations at greater depth.
    pub fn fetches(&self) -> usize {
        self.fetches
    }
}

struct Pending {
    url: String,
    remaining_depth: u32,
}

pub struct LinkResolver<F> {
    fetcher: F,
}

impl<F: Fetcher> LinkResolver<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Resolves a single URL.
    pub async fn resolve(
        &self,
        url: &str,
        domains: &SpamDomains,
        remaining_depth: u32,
        visited: &mut VisitedSet,
    ) -> Resolution {
        let stack = vec![Pending {
            url: url.to_string(),
            remaining_depth,
        }];
        self.explore(stack, domains, visited).await
    }

    /// Resolves `urls` in order, sharing `visited`, stopping at the first hit.
    pub async fn resolve_all(
        &self,
        urls: &[String],
        domains: &SpamDomains,
        depth: u32,
        visited: &mut VisitedSet,
    ) -> Resolution {
        let stack = urls
            .iter()
            .rev()
            .map(|url| Pending {
                url: url.clone(),
                remaining_depth: depth,
            })
            .collect();
        self.explore(stack, domains, visited).await
    }

    async fn explore(
        &self,
        mut stack: Vec<Pending>,
        domains: &SpamDomains,
        visited: &mut VisitedSet,
    ) -> Resolution {
        while let Some(Pending {
            url,
            remaining_depth,
        }) = stack.pop()
        {
            if visited.covers(&url, remaining_depth) {
                continue;
            }

            if let Some(hit) = domain_hit(&url, domains, HitSource::Link) {
                return spam(hit);
            }

            visited.mark(&url, remaining_depth);
            debug!(target: "resolver", url = %url, remaining_depth, "fetching");

            let page = match self.fetcher.fetch(&url, remaining_depth).await {
                Ok(page) => page,
                Err(err) => {
                    if let Some(hit) = failure_hit(&err, domains) {
                        return spam(hit);
                    }
                    debug!(
                        target: "resolver",
                        url = %url,
                        error = %err,
                        "fetch failed, branch is clean"
                    );
                    continue;
                }
            };

            if let Some(hit) = page
                .final_url
                .as_deref()
                .and_then(|final_url| domain_hit(final_url, domains, HitSource::FinalUrl))
            {
                return spam(hit);
            }

            // Links already explored with at least the depth they would get
            // from here were checked then.
            let child_depth = remaining_depth.saturating_sub(1);
            let candidates: Vec<String> = extract_urls(&page.body)
                .into_iter()
                .filter(|candidate| !visited.covers(candidate, child_depth))
                .collect();

            if let Some(hit) = candidates
                .iter()
                .find_map(|candidate| domain_hit(candidate, domains, HitSource::BodyLink))
            {
                return spam(hit);
            }

            if remaining_depth > 0 {
                // Reversed so the first link is explored first.
                stack.extend(candidates.into_iter().rev().map(|candidate| Pending {
                    url: candidate,
                    remaining_depth: child_depth,
                }));
            }
        }

        Resolution::Clean
    }
}

fn domain_hit(url: &str, domains: &SpamDomains, source: HitSource) -> Option<SpamHit> {
    domains.matching_domain(url).map(|domain| SpamHit {
        url: url.to_string(),
        domain: domain.to_string(),
        source,
    })
}

fn failure_hit(err: &FetchError, domains: &SpamDomains) -> Option<SpamHit> {
    let source = match err {
        FetchError::RedirectLimitExceeded { .. } => HitSource::RedirectLimit,
        _ => HitSource::FailedFetch,
    };
    err.attempted_url()
        .and_then(|url| domain_hit(url, domains, source))
}

fn spam(hit: SpamHit) -> Resolution {
    info!(
        target: "resolver",
        url = %hit.url,
        domain = %hit.domain,
        source = ?hit.source,
        "spam domain matched"
    );
    Resolution::Spam(hit)
}
