use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{header::LOCATION, redirect::Policy, Client, StatusCode};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::FetchConfig;

/// What a successful fetch produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Location after following redirects, when the transport knows it.
    pub final_url: Option<String>,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("redirect limit exceeded while pointing at {last_url}")]
    RedirectLimitExceeded { last_url: String },
    #[error("invalid url {url}")]
    InvalidUrl { url: String },
    #[error("http status {status} from {url}")]
    HttpStatus { url: String, status: StatusCode },
    #[error("request timed out")]
    Timeout { url: Option<String> },
    #[error("network error: {source}")]
    Network {
        url: Option<String>,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// The URL the transport was working on when it gave up, if known.
    pub fn attempted_url(&self) -> Option<&str> {
        match self {
            FetchError::RedirectLimitExceeded { last_url } => Some(last_url),
            FetchError::InvalidUrl { url } | FetchError::HttpStatus { url, .. } => Some(url),
            FetchError::Timeout { url } | FetchError::Network { url, .. } => url.as_deref(),
        }
    }

    fn from_reqwest(err: reqwest::Error, current: &Url) -> Self {
        let url = Some(
            err.url()
                .map(|u| u.to_string())
                .unwrap_or_else(|| current.to_string()),
        );
        if err.is_timeout() {
            FetchError::Timeout { url }
        } else {
            FetchError::Network { url, source: err }
        }
    }
}

/// Transport capability used by the resolver.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url`, following at most `max_redirects` redirects.
    async fn fetch(&self, url: &str, max_redirects: u32) -> Result<FetchedPage, FetchError>;
}

#[async_trait]
impl<T: Fetcher + ?Sized> Fetcher for Arc<T> {
    async fn fetch(&self, url: &str, max_redirects: u32) -> Result<FetchedPage, FetchError> {
        (**self).fetch(url, max_redirects).await
    }
}

pub struct HttpFetcher {
    client: Client,
    max_body_length: usize,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        // Redirects are walked by hand so the hop budget and the last
        // location are both under our control.
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .redirect(Policy::none())
            .build()?;

        Ok(Self {
            client,
            max_body_length: config.max_body_length,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, raw_url: &str, max_redirects: u32) -> Result<FetchedPage, FetchError> {
        let mut current = match Url::parse(raw_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => url,
            _ => {
                return Err(FetchError::InvalidUrl {
                    url: raw_url.to_string(),
                })
            }
        };
        let mut hops = 0u32;

        loop {
            let mut response = self
                .client
                .get(current.clone())
                .send()
                .await
                .map_err(|err| FetchError::from_reqwest(err, &current))?;
            let status = response.status();

            if status.is_redirection() {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .filter(|v| !v.is_empty());

                if let Some(location) = location {
                    let next = current.join(location).map_err(|_| FetchError::InvalidUrl {
                        url: location.to_string(),
                    })?;
                    hops += 1;
                    if hops > max_redirects {
                        debug!(
                            target: "fetch",
                            url = %raw_url,
                            last_url = %next,
                            max_redirects,
                            "redirect limit exceeded"
                        );
                        return Err(FetchError::RedirectLimitExceeded {
                            last_url: next.to_string(),
                        });
                    }
                    debug!(
                        target: "fetch",
                        from = %current,
                        to = %next,
                        hop = hops,
                        "following redirect"
                    );
                    current = next;
                    continue;
                }
            }

            if !status.is_success() {
                return Err(FetchError::HttpStatus {
                    url: current.to_string(),
                    status,
                });
            }

            // Stop reading at the cap; a page that never ends must still
            // yield its first bytes.
            let mut bytes: Vec<u8> = Vec::new();
            while let Some(chunk) = response
                .chunk()
                .await
                .map_err(|err| FetchError::from_reqwest(err, &current))?
            {
                let room = self.max_body_length - bytes.len();
                if chunk.len() >= room {
                    bytes.extend_from_slice(&chunk[..room]);
                    break;
                }
                bytes.extend_from_slice(&chunk);
            }
            let body = decode_body(bytes);

            return Ok(FetchedPage {
                final_url: Some(current.to_string()),
                body,
            });
        }
    }
}

/// Lossy UTF-8, dropping a character split by the length cap.
fn decode_body(mut bytes: Vec<u8>) -> String {
    if let Err(err) = std::str::from_utf8(&bytes) {
        if err.error_len().is_none() {
            bytes.truncate(err.valid_up_to());
        }
    }
    match String::from_utf8(bytes) {
        Ok(body) => body,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    }
}
