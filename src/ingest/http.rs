/// Blocking text-document fetcher shared by every feed.
///
/// Feeds never talk to reqwest directly; they go through [`TextFetcher`],
/// which lets tests substitute canned documents and count calls.

use std::time::Duration;

use reqwest::header::{ACCEPT, USER_AGENT};

use crate::config::HttpConfig;
use crate::model::FetchError;

/// Status code and body of a fetched document.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedDocument {
    pub status: u16,
    pub body: String,
}

impl FetchedDocument {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Body of a 200 response, otherwise an `HttpStatus` error.
    pub fn into_body(self, url: &str) -> Result<String, FetchError> {
        if self.is_ok() {
            Ok(self.body)
        } else {
            Err(FetchError::HttpStatus {
                status: self.status,
                url: url.to_string(),
            })
        }
    }
}

/// Fetches a document by URL with a per-request timeout.
///
/// Transport failures are errors; any HTTP status, including 4xx/5xx, is
/// returned as a document so the caller decides what counts as usable.
pub trait TextFetcher {
    fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchedDocument, FetchError>;
}

/// Live fetcher backed by `reqwest::blocking`.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    user_agent: String,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.feed_timeout())
            .build()?;

        Ok(Self {
            client,
            user_agent: config.user_agent.clone(),
        })
    }
}

impl TextFetcher for HttpFetcher {
    fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchedDocument, FetchError> {
        log::debug!("Fetching: {}", url);

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, "application/geo+json, application/json, text/plain, */*")
            .timeout(timeout)
            .send()?;

        let status = response.status().as_u16();
        let body = response.text()?;

        Ok(FetchedDocument { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_body_accepts_only_200() {
        let ok = FetchedDocument { status: 200, body: "text".to_string() };
        assert_eq!(ok.into_body("http://x").unwrap(), "text");

        let missing = FetchedDocument { status: 404, body: String::new() };
        let err = missing.into_body("http://x/missing").unwrap_err();
        assert!(matches!(err, FetchError::HttpStatus { status: 404, .. }));
        assert!(err.to_string().contains("http://x/missing"));
    }

    #[test]
    fn test_http_fetcher_builds_from_default_config() {
        let fetcher = HttpFetcher::new(&HttpConfig::default());
        assert!(fetcher.is_ok());
    }
}
