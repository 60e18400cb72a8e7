use std::time::Duration;

use async_trait::async_trait;
use mimic_core::{Error, Result};

use crate::handler::DictionarySource;

/// Word list fetched over HTTP(S). An optional `url:` prefix is accepted.
pub struct UrlSource {
    timeout: Duration,
}

impl UrlSource {
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn url(location: &str) -> &str {
        location.strip_prefix("url:").unwrap_or(location).trim()
    }
}

impl Default for UrlSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DictionarySource for UrlSource {
    fn can_handle(&self, location: &str) -> bool {
        let url = Self::url(location);
        url.starts_with("http://") || url.starts_with("https://")
    }

    async fn load(&self, location: &str) -> Result<String> {
        let url = Self::url(location);
        let client = reqwest::Client::builder()
            .user_agent(concat!("mimic/", env!("CARGO_PKG_VERSION")))
            .timeout(self.timeout)
            .build()
            .map_err(|e| Error::Other(anyhow::anyhow!("Failed to create HTTP client: {}", e)))?;

        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Other(anyhow::anyhow!("Failed to fetch {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::Other(anyhow::anyhow!(
                "HTTP error {}: {}",
                response.status().as_u16(),
                url
            )));
        }

        response
            .text()
            .await
            .map_err(|e| Error::Other(anyhow::anyhow!("Failed to read response: {}", e)))
    }
}
