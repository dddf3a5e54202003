//! `EpgClient` - HTTP client for the static EPG document.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::Client;
use tracing::instrument;
use url::Url;

use super::api::EpgApi;
use super::types::EpgGuide;

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum number of body characters quoted in decode errors.
const BODY_PREVIEW_LEN: usize = 500;

/// EPG document client.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct EpgClient {
    /// HTTP client (reqwest, gzip enabled).
    http_client: Client,
    /// Location of the EPG document.
    url: Url,
}

/// Builder for `EpgClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct EpgClientBuilder {
    url: Option<Url>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
}

impl EpgClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            url: None,
            user_agent: None,
            timeout: None,
        }
    }

    /// Sets the EPG document URL (required).
    #[must_use]
    pub fn url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the request timeout (default: 10s).
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `url` or `user_agent` is not set.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<EpgClient> {
        let url = self.url.context("url is required")?;
        let user_agent = self.user_agent.context("user_agent is required")?;

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .gzip(true)
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()
            .context("failed to build HTTP client")?;

        Ok(EpgClient { http_client, url })
    }
}

impl EpgClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> EpgClientBuilder {
        EpgClientBuilder::new()
    }

    /// Returns the EPG document URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Parses an EPG JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error quoting the start of the body if decoding fails.
    pub fn parse_guide(json: &str) -> Result<EpgGuide> {
        serde_json::from_str(json).with_context(|| {
            format!(
                "EPG JSON decoding failed (len={}): {}",
                json.len(),
                json.chars().take(BODY_PREVIEW_LEN).collect::<String>()
            )
        })
    }
}

impl EpgApi for EpgClient {
    #[instrument(skip_all, fields(url = %self.url))]
    async fn fetch_guide(&self) -> Result<EpgGuide> {
        let response = self
            .http_client
            .get(self.url.clone())
            .send()
            .await
            .context("EPG request failed")?;

        let status = response.status();
        tracing::trace!(%status, headers = ?response.headers(), "Response headers");

        if !status.is_success() {
            bail!("EPG request failed (HTTP {status})");
        }

        let body = response
            .text()
            .await
            .context("failed to read EPG response")?;
        tracing::debug!(body_len = body.len(), "EPG body received");

        let guide = Self::parse_guide(&body)?;
        tracing::debug!(channels = guide.channel_count(), "EPG guide parsed");
        Ok(guide)
    }
}
