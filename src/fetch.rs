use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use url::Url;

// ── Constants ────────────────────────────────────────────────────────────────

pub const DEFAULT_SITE_DOMAIN: &str = "hh.ru";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36";
const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const BROWSER_ACCEPT_LANGUAGE: &str = "ru-RU,ru;q=0.9,en-US;q=0.8,en;q=0.7";
const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

// ── Error type ───────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("{0}")]
    Validation(String),
    #[error("Ошибка сети: {0}")]
    Network(String),
}

// ── Public types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Substring every accepted URL must contain.
    pub site_domain: String,
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            site_domain: DEFAULT_SITE_DOMAIN.to_string(),
            timeout: FETCH_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub status: u16,
    pub body: String,
}

/// Single-shot HTML fetcher for pages of one recruitment site.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
    site_domain: String,
}

impl PageFetcher {
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE),
        );

        let client = reqwest::ClientBuilder::new()
            .timeout(config.timeout)
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self {
            client,
            site_domain: config.site_domain,
        })
    }

    pub fn site_domain(&self) -> &str {
        &self.site_domain
    }

    // ── URL validation ───────────────────────────────────────────────────────

    pub fn validate_url(&self, url: &str) -> Result<Url, FetchError> {
        if !url.contains(&self.site_domain) {
            return Err(FetchError::Validation(format!(
                "Поддерживаются только ссылки с {}",
                self.site_domain
            )));
        }
        Url::parse(url.trim())
            .map_err(|_| FetchError::Validation("Некорректная ссылка".to_string()))
    }

    // ── HTTP fetch ───────────────────────────────────────────────────────────

    /// Validates `url`, then performs exactly one GET. Non-2xx is a network failure.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let parsed = self.validate_url(url)?;
        tracing::info!(url = %parsed, "fetching page");

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(describe_request_error)?;

        let response = response.error_for_status().map_err(|e| {
            tracing::warn!(url, error = %e, "upstream returned an error status");
            FetchError::Network(e.to_string())
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(describe_request_error)?;
        tracing::debug!(url, status, bytes = body.len(), "page fetched");

        Ok(FetchedPage {
            url: url.to_string(),
            status,
            body,
        })
    }
}

fn describe_request_error(e: reqwest::Error) -> FetchError {
    let message = if e.is_timeout() {
        format!("TimeoutError: {}", e)
    } else if e.is_connect() {
        format!("ConnectError: {}", e)
    } else {
        format!("RequestError: {}", e)
    };
    tracing::warn!("{}", message);
    FetchError::Network(message)
}
