use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;

use crate::fetcher::{FetchError, FetchedPage, Fetcher};

enum Script {
    Page {
        hops: Vec<String>,
        body: String,
    },
    Timeout,
    Status { url: String, status: StatusCode },
}

/// In-memory link graph that records every fetch it serves.
#[derive(Default)]
pub(crate) struct ScriptedFetcher {
    scripts: HashMap<String, Script>,
    calls: Mutex<Vec<(String, u32)>>,
}

impl ScriptedFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A page served directly, without redirects.
    pub(crate) fn page(self, url: &str, body: &str) -> Self {
        self.redirects(url, &[], body)
    }

    /// A URL that redirects through `hops`, the last of which serves `body`.
    pub(crate) fn redirects(mut self, url: &str, hops: &[&str], body: &str) -> Self {
        self.scripts.insert(
            url.to_string(),
            Script::Page {
                hops: hops.iter().map(|h| h.to_string()).collect(),
                body: body.to_string(),
            },
        );
        self
    }

    /// A URL whose fetch times out with no URL attached to the error.
    pub(crate) fn timeout(mut self, url: &str) -> Self {
        self.scripts.insert(url.to_string(), Script::Timeout);
        self
    }

    /// A URL whose fetch ends on a non-success status at `failing_url`.
    pub(crate) fn status(mut self, url: &str, failing_url: &str, status: StatusCode) -> Self {
        self.scripts.insert(
            url.to_string(),
            Script::Status {
                url: failing_url.to_string(),
                status,
            },
        );
        self
    }

    pub(crate) fn calls(&self) -> Vec<(String, u32)> {
        self.calls.lock().clone()
    }

    pub(crate) fn fetched_urls(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(url, _)| url.clone()).collect()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str, max_redirects: u32) -> Result<FetchedPage, FetchError> {
        self.calls.lock().push((url.to_string(), max_redirects));

        match self.scripts.get(url) {
            Some(Script::Page { hops, body }) => {
                let budget = max_redirects as usize;
                if hops.len() > budget {
                    return Err(FetchError::RedirectLimitExceeded {
                        last_url: hops[budget].clone(),
                    });
                }
                Ok(FetchedPage {
                    final_url: Some(hops.last().map_or_else(|| url.to_string(), Clone::clone)),
                    body: body.clone(),
                })
            }
            Some(Script::Timeout) => Err(FetchError::Timeout { url: None }),
            Some(Script::Status { url, status }) => Err(FetchError::HttpStatus {
                url: url.clone(),
                status: *status,
            }),
            None => Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: StatusCode::NOT_FOUND,
            }),
        }
    }
}
