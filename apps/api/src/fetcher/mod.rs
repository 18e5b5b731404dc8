//! Content Fetcher — retrieves a job-description page and turns it into plain text.
//!
//! Transient failures are surfaced to the caller, never retried here.

pub mod extract;
pub mod handlers;
pub mod url;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

use crate::fetcher::extract::{scrape_page, visible_text, ScrapedPage};
use crate::fetcher::url::is_valid_url;

/// Desktop browser user agent; many career sites refuse obvious bot agents.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),

    #[error("Failed to fetch URL: {0}")]
    FetchFailed(String),
}

/// Source of job-description text for a URL.
///
/// Carried by the pipeline as `Arc<dyn ContentSource>` so tests can swap in a fake.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// HTTP-backed content source.
#[derive(Clone)]
pub struct ContentFetcher {
    client: Client,
}

impl ContentFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .map_err(|e| FetchError::FetchFailed(format!("could not build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Downloads `url` and returns its body; any non-2xx status is a failure.
    async fn get_html(&self, url: &str) -> Result<String, FetchError> {
        if !is_valid_url(url) {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!("Fetch of {url} failed: {e}");
            FetchError::FetchFailed(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Fetch of {url} returned {status}");
            return Err(FetchError::FetchFailed(format!("HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::FetchFailed(format!("failed to read body: {e}")))
    }

    /// Returns all text and links of a page, without noise stripping.
    pub async fn scrape(&self, url: &str) -> Result<ScrapedPage, FetchError> {
        let html = self.get_html(url).await?;
        let page = scrape_page(&html);
        debug!(
            "Scraped {url}: {} chars of text, {} links",
            page.text.len(),
            page.links.len()
        );
        Ok(page)
    }
}

#[async_trait]
impl ContentSource for ContentFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let html = self.get_html(url).await?;
        let text = visible_text(&html);

        if text.is_empty() {
            return Err(FetchError::FetchFailed(
                "page contained no extractable text".to_string(),
            ));
        }

        debug!("Extracted {} chars of visible text from {url}", text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const JOB_HTML: &str =
        "<html><body><script>x</script><p>Backend Engineer, 3 years Java</p></body></html>";

    #[tokio::test]
    async fn test_fetch_extracts_visible_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jobs/42"))
            .respond_with(ResponseTemplate::new(200).set_body_string(JOB_HTML))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = ContentFetcher::new().unwrap();
        let text = fetcher
            .fetch(&format!("{}/jobs/42", server.uri()))
            .await
            .unwrap();

        assert_eq!(text, "Backend Engineer, 3 years Java");

        let requests = server.received_requests().await.unwrap();
        let user_agent = requests[0]
            .headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok());
        assert_eq!(user_agent, Some(BROWSER_USER_AGENT));
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_is_fetch_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = ContentFetcher::new().unwrap();
        let err = fetcher
            .fetch(&format!("{}/missing", server.uri()))
            .await
            .unwrap_err();

        match err {
            FetchError::FetchFailed(reason) => assert!(reason.contains("404")),
            other => panic!("expected FetchFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_invalid_url_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(JOB_HTML))
            .expect(0)
            .mount(&server)
            .await;

        let fetcher = ContentFetcher::new().unwrap();
        let err = fetcher.fetch("not a url").await.unwrap_err();

        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_fetch_page_without_visible_text_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><body><nav>Menu</nav></body></html>"),
            )
            .mount(&server)
            .await;

        let fetcher = ContentFetcher::new().unwrap();
        let err = fetcher.fetch(&server.uri()).await.unwrap_err();

        assert!(matches!(err, FetchError::FetchFailed(_)));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_is_fetch_failed() {
        // Port 9 (discard) on localhost is not expected to accept HTTP connections.
        let fetcher = ContentFetcher::new().unwrap();
        let err = fetcher.fetch("http://127.0.0.1:9/job").await.unwrap_err();

        assert!(matches!(err, FetchError::FetchFailed(_)));
    }

    #[tokio::test]
    async fn test_scrape_returns_text_and_links() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/catalog"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<html><body><p>Catalog</p><a href="/p/1">One</a></body></html>"#,
            ))
            .mount(&server)
            .await;

        let fetcher = ContentFetcher::new().unwrap();
        let page = fetcher
            .scrape(&format!("{}/catalog", server.uri()))
            .await
            .unwrap();

        assert_eq!(page.text, "Catalog\nOne");
        assert_eq!(page.links, vec!["/p/1".to_string()]);
    }
}
