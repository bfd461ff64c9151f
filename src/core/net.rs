// src/core/net.rs

// Page loading. The poll loop only sees `PageSource`, so tests can hand it
// a canned document instead of going to the network.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::consts::USER_AGENT;
use crate::error::{Result, ScrapeError};

#[async_trait]
pub trait PageSource: Send + Sync {
    /// Where the page comes from, for log lines.
    fn describe(&self) -> &str;

    /// Full body of the page.
    async fn fetch(&self) -> Result<String>;
}

/// Plain HTTP GET with a request timeout.
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ScrapeError::Config(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { client, url: url.into() })
    }
}

#[async_trait]
impl PageSource for HttpSource {
    fn describe(&self) -> &str { &self.url }

    async fn fetch(&self) -> Result<String> {
        let fetch_err = |source: reqwest::Error| ScrapeError::Fetch { url: self.url.clone(), source };

        let resp = self.client.get(&self.url).send().await.map_err(fetch_err)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::Status { url: self.url.clone(), status: status.as_u16() });
        }
        resp.text().await.map_err(fetch_err)
    }
}

/// A fixed document, served as-is on every fetch.
pub struct StaticPage {
    label: String,
    body: String,
}

impl StaticPage {
    pub fn new(label: impl Into<String>, body: impl Into<String>) -> Self {
        Self { label: label.into(), body: body.into() }
    }
}

#[async_trait]
impl PageSource for StaticPage {
    fn describe(&self) -> &str { &self.label }

    async fn fetch(&self) -> Result<String> {
        Ok(self.body.clone())
    }
}
