use tracing::debug;

use crate::{
    config::FetchConfig,
    domain::{Resolution, SpamCheckRequest, Verdict},
    fetcher::{Fetcher, HttpFetcher},
    links::{extract_urls, SpamDomains},
    resolver::{LinkResolver, VisitedSet},
};

/// Decides whether a piece of content links, directly or through
/// redirects and linked pages, to a blocklisted domain.
///
/// A checker holds no per-check state, so one instance can serve any number
/// of concurrent checks.
pub struct LinkSpamChecker<F> {
    resolver: LinkResolver<F>,
}

impl LinkSpamChecker<HttpFetcher> {
    pub fn from_config(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(HttpFetcher::new(config)?))
    }
}

impl<F: Fetcher> LinkSpamChecker<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            resolver: LinkResolver::new(fetcher),
        }
    }

    pub fn resolver(&self) -> &LinkResolver<F> {
        &self.resolver
    }

    pub async fn is_spam(&self, request: &SpamCheckRequest) -> bool {
        self.check(request).await.spam
    }

    /// Same decision as [`Self::is_spam`], plus what triggered it.
    pub async fn check(&self, request: &SpamCheckRequest) -> Verdict {
        let urls = extract_urls(&request.content);
        if urls.is_empty() {
            return Verdict {
                spam: false,
                hit: None,
                urls_found: 0,
                urls_fetched: 0,
            };
        }

        let domains = SpamDomains::new(&request.spam_link_domains);
        let mut visited = VisitedSet::new();
        let resolution = self
            .resolver
            .resolve_all(&urls, &domains, request.redirect_depth, &mut visited)
            .await;

        debug!(
            target: "resolver",
            urls = urls.len(),
            fetched = visited.fetches(),
            spam = resolution.is_spam(),
            "check finished"
        );

        let hit = match resolution {
            Resolution::Spam(hit) => Some(hit),
            Resolution::Clean => None,
        };
        Verdict {
            spam: hit.is_some(),
            hit,
            urls_found: urls.len(),
            urls_fetched: visited.fetches(),
        }
    }
}
