use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;

use crate::model::AppState;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:4000";

/// Env var overriding the API base URL.
pub const BASE_URL_ENV: &str = "ROADMAP_API_URL";

/// Blocking client for the single-document state endpoint. All calls run on
/// background threads; the UI thread never blocks on the network.
#[derive(Debug, Clone)]
pub struct StateClient {
    client: Client,
    base_url: String,
}

impl StateClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Build a client from `ROADMAP_API_URL`, falling back to localhost.
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    fn state_url(&self) -> String {
        format!("{}/api/state", self.base_url.trim_end_matches('/'))
    }

    /// `GET /api/state`. A missing document (`404` or a JSON `null` body)
    /// is `Ok(None)`, not an error.
    pub fn load(&self) -> Result<Option<AppState>> {
        let response = self
            .client
            .get(self.state_url())
            .send()
            .context("GET /api/state failed")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response
            .error_for_status()
            .context("GET /api/state returned an error status")?;
        response
            .json::<Option<AppState>>()
            .context("Failed to decode state document")
    }

    /// `POST /api/state` with the whole document. Last write wins; there is
    /// no version check against concurrent writers.
    pub fn save(&self, state: &AppState) -> Result<()> {
        self.client
            .post(self.state_url())
            .json(state)
            .send()
            .context("POST /api/state failed")?
            .error_for_status()
            .context("POST /api/state returned an error status")?;
        Ok(())
    }
}
