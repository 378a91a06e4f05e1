use serde::{Deserialize, Serialize};

/// One top-level spam check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpamCheckRequest {
    pub content: String,
    #[serde(alias = "spamDomains")]
    pub spam_link_domains: Vec<String>,
    pub redirect_depth: u32,
}

impl SpamCheckRequest {
    pub fn new<I, S>(content: impl Into<String>, spam_link_domains: I, redirect_depth: u32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            content: content.into(),
            spam_link_domains: spam_link_domains.into_iter().map(Into::into).collect(),
            redirect_depth,
        }
    }
}

/// Where in the traversal a blocklisted domain turned up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HitSource {
    /// The link text itself.
    Link,
    /// The location reached after following redirects.
    FinalUrl,
    /// A link found in a fetched page.
    BodyLink,
    /// The location a redirect chain pointed at when it ran out of budget.
    RedirectLimit,
    /// The URL a failed fetch was attempting.
    FailedFetch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpamHit {
    pub url: String,
    pub domain: String,
    pub source: HitSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Clean,
    Spam(SpamHit),
}

impl Resolution {
    pub fn is_spam(&self) -> bool {
        matches!(self, Resolution::Spam(_))
    }
}

/// Outcome of a check, with enough detail to explain it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub spam: bool,
    pub hit: Option<SpamHit>,
    pub urls_found: usize,
    pub urls_fetched: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_accepts_camel_case_fields() {
        let request: SpamCheckRequest = serde_json::from_str(
            r#"{"content": "hi", "spamLinkDomains": ["bad.example"], "redirectDepth": 1}"#,
        )
        .unwrap();
        assert_eq!(request, SpamCheckRequest::new("hi", ["bad.example"], 1));

        let request: SpamCheckRequest = serde_json::from_str(
            r#"{"content": "", "spamDomains": [], "redirectDepth": 0}"#,
        )
        .unwrap();
        assert!(request.spam_link_domains.is_empty());
    }

    #[test]
    fn request_rejects_negative_depth() {
        let parsed = serde_json::from_str::<SpamCheckRequest>(
            r#"{"content": "", "spamLinkDomains": [], "redirectDepth": -1}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn verdict_serializes_hit_source() {
        let verdict = Verdict {
            spam: true,
            hit: Some(SpamHit {
                url: "http://bad.example".into(),
                domain: "bad.example".into(),
                source: HitSource::FinalUrl,
            }),
            urls_found: 1,
            urls_fetched: 1,
        };
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["hit"]["source"], "final_url");
        assert_eq!(json["spam"], true);
    }
}
