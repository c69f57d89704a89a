//! GitHub API client implementation

use crate::config::GitHubConfig;
use crate::core::{UpdateError, UpdateResult};
use crate::di::traits::GitHubProvider;
use crate::github::types::GitHubRelease;
use async_trait::async_trait;
use reqwest::{header, Client as HttpClient};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;

/// GitHub API client
pub struct GitHubClient {
    http_client: HttpClient,
    api_url: String,
    token: Option<String>,
    rate_limiter: Arc<RateLimiter>,
}

/// Client-side view of the GitHub API quota
struct RateLimiter {
    window: Mutex<RateWindow>,
}

#[derive(Clone, Copy)]
struct RateWindow {
    remaining: u64,
    resets_at: SystemTime,
}

impl GitHubClient {
    /// Create a new GitHub client
    pub fn new(config: &GitHubConfig) -> UpdateResult<Self> {
        let token = std::env::var("GITHUB_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .or_else(|| config.token.clone());

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("update-server"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github.v3+json"),
        );

        if let Some(ref token) = token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("token {}", token))
                    .map_err(|e| UpdateError::Config(format!("Invalid GitHub token: {}", e)))?,
            );
        }

        let http_client = HttpClient::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| UpdateError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            rate_limiter: Arc::new(RateLimiter::new(token.is_some())),
            token,
        })
    }

    /// Get the most recent releases for a repository
    pub async fn get_releases(
        &self,
        owner: &str,
        repo: &str,
        per_page: u32,
    ) -> UpdateResult<Vec<GitHubRelease>> {
        let url = format!(
            "{}/repos/{}/{}/releases?per_page={}",
            self.api_url,
            urlencoding::encode(owner),
            urlencoding::encode(repo),
            per_page
        );
        self.api_get(&url).await
    }

    async fn api_request(&self, url: &str) -> UpdateResult<reqwest::Response> {
        self.rate_limiter.check(self.token.is_some()).await?;
        tracing::trace!("GET {}", url);

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| UpdateError::UpstreamApi(format!("GitHub API request failed: {}", e)))?;

        self.rate_limiter.record(response.headers()).await;

        if !response.status().is_success() {
            return Err(UpdateError::UpstreamApi(format!(
                "GitHub API error: HTTP {}",
                response.status()
            )));
        }

        Ok(response)
    }

    async fn api_get<T: serde::de::DeserializeOwned>(&self, url: &str) -> UpdateResult<T> {
        let response = self.api_request(url).await?;

        response.json().await.map_err(|e| {
            UpdateError::UpstreamApi(format!("Failed to parse GitHub API response: {}", e))
        })
    }
}

impl RateLimiter {
    fn new(authenticated: bool) -> Self {
        Self {
            window: Mutex::new(RateWindow {
                remaining: if authenticated { 5000 } else { 60 },
                resets_at: SystemTime::now() + Duration::from_secs(3600),
            }),
        }
    }

    /// Refuse to call while the quota is spent and the window still open
    async fn check(&self, authenticated: bool) -> UpdateResult<()> {
        let window = *self.window.lock().await;
        if window.remaining > 0 {
            return Ok(());
        }

        let Ok(wait) = window.resets_at.duration_since(SystemTime::now()) else {
            return Ok(());
        };
        let hint = if authenticated {
            ""
        } else {
            " Set GITHUB_TOKEN to raise the limit to 5000/hour."
        };
        Err(UpdateError::UpstreamApi(format!(
            "GitHub API rate limit exceeded, resets in {}s.{}",
            wait.as_secs(),
            hint
        )))
    }

    /// Track the quota GitHub reports on every response
    async fn record(&self, headers: &header::HeaderMap) {
        let read = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
        };

        let mut window = self.window.lock().await;
        if let Some(remaining) = read("x-ratelimit-remaining") {
            window.remaining = remaining;
        }
        if let Some(reset) = read("x-ratelimit-reset") {
            window.resets_at = SystemTime::UNIX_EPOCH + Duration::from_secs(reset);
        }
    }
}

#[async_trait]
impl GitHubProvider for GitHubClient {
    async fn get_releases(
        &self,
        owner: &str,
        repo: &str,
        per_page: u32,
    ) -> UpdateResult<Vec<GitHubRelease>> {
        Self::get_releases(self, owner, repo, per_page).await
    }
}
