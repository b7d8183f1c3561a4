//! HTTP page retrieval behind a small trait, so scrapers can be exercised
//! against canned pages.

use crate::error::{NewsError, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use std::time::Duration;
use tracing::{debug, instrument};

/// Something that can GET a page and hand back its body as text.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url`, failing on transport errors, timeouts and non-2xx statuses.
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String>;
}

/// [`PageFetcher`] backed by a shared `reqwest` client that presents itself
/// as a desktop browser.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("ko-KR,ko;q=0.9,en-US;q=0.8"));

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self, timeout), fields(timeout_ms = timeout.as_millis() as u64))]
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String> {
        let response = self.client.get(url).timeout(timeout).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NewsError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.text().await?;
        debug!(bytes = body.len(), "Fetched page");
        Ok(body)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Canned-page fetcher shared by scraper and pipeline tests.

    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    pub struct FakeFetcher {
        pages: HashMap<String, String>,
        requests: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_page(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), body.to_string());
            self
        }

        /// URLs requested so far, in order.
        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for FakeFetcher {
        async fn fetch(&self, url: &str, _timeout: Duration) -> Result<String> {
            self.requests.lock().unwrap().push(url.to_string());
            self.pages.get(url).cloned().ok_or_else(|| NewsError::HttpStatus {
                status: 404,
                url: url.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeFetcher;
    use super::*;

    #[test]
    fn test_http_fetcher_builds() {
        assert!(HttpFetcher::new(crate::config::BROWSER_USER_AGENT).is_ok());
    }

    #[tokio::test]
    async fn test_fake_fetcher_records_requests() {
        let fetcher = FakeFetcher::new().with_page("https://a.example/1", "<p>hi</p>");

        let ok = fetcher.fetch("https://a.example/1", Duration::from_secs(1)).await;
        let missing = fetcher.fetch("https://a.example/2", Duration::from_secs(1)).await;

        assert_eq!(ok.unwrap(), "<p>hi</p>");
        assert!(matches!(missing, Err(NewsError::HttpStatus { status: 404, .. })));
        assert_eq!(fetcher.requests(), vec!["https://a.example/1", "https://a.example/2"]);
    }
}
