//! Upstream transport.
//!
//! Fetchers only need "GET this URL, give me JSON". The `Upstream` trait is
//! that seam; `HttpUpstream` is the blocking reqwest implementation used in
//! production, and tests substitute an in-memory one.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::{AppError, FetchError};

pub trait Upstream: Send + Sync {
    /// GET `url` and parse the body as JSON. `bearer` is sent as an
    /// `Authorization: Bearer` header when present.
    fn get_json(&self, url: &str, bearer: Option<&str>) -> Result<Value, FetchError>;
}

pub struct HttpUpstream {
    client: Client,
}

impl HttpUpstream {
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("gridmix/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::new(4, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl Upstream for HttpUpstream {
    fn get_json(&self, url: &str, bearer: Option<&str>) -> Result<Value, FetchError> {
        debug!(url, "GET");
        let mut req = self.client.get(url).header("Accept", "application/json");
        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }

        let resp = req
            .send()
            .map_err(|e| FetchError::Transport(format!("request to {url} failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(FetchError::HttpStatus(resp.status().as_u16()));
        }

        let body = resp
            .text()
            .map_err(|e| FetchError::Transport(format!("failed to read body from {url}: {e}")))?;

        serde_json::from_str(&body).map_err(|e| FetchError::malformed(format!("invalid JSON from {url}: {e}")))
    }
}
