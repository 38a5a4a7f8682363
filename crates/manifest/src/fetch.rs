use std::time::Duration;

use tracing::{debug, warn};

use crate::error::ManifestError;
use crate::types::ManifestPayload;

/// Where manifests come from. The HTTP implementation is the production
/// path; tests substitute in-memory sources.
pub trait ManifestSource: Send + Sync {
    fn fetch(&self, locator: &str) -> Result<ManifestPayload, ManifestError>;
}

/// Reject locators before any network access: non-empty, HTTP scheme.
pub fn validate_locator(locator: &str) -> Result<(), ManifestError> {
    let trimmed = locator.trim();
    if trimmed.is_empty() {
        return Err(ManifestError::InvalidLocator(
            "locator must not be empty".into(),
        ));
    }
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(ManifestError::InvalidLocator(format!(
            "locator must use an http(s) scheme: {trimmed}"
        )));
    }
    Ok(())
}

/// Fetch behavior configuration.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Timeout for the direct fetch.
    pub timeout: Duration,
    /// Optional relay endpoint retried once after a direct failure; the
    /// original locator is passed as a `url` query parameter.
    pub relay_url: Option<String>,
    /// Independent timeout for the relay attempt.
    pub relay_timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            relay_url: None,
            relay_timeout: Duration::from_secs(30),
        }
    }
}

impl FetchConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_relay(mut self, relay_url: impl Into<String>) -> Self {
        self.relay_url = Some(relay_url.into());
        self
    }

    pub fn with_relay_timeout(mut self, timeout: Duration) -> Self {
        self.relay_timeout = timeout;
        self
    }
}

/// Blocking HTTP manifest source with one relay retry.
pub struct HttpManifestSource {
    client: reqwest::blocking::Client,
    cfg: FetchConfig,
}

impl HttpManifestSource {
    pub fn new(cfg: FetchConfig) -> Result<Self, ManifestError> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|err| ManifestError::Fetch(err.to_string()))?;
        Ok(Self { client, cfg })
    }

    fn fetch_direct(&self, locator: &str) -> Result<ManifestPayload, ManifestError> {
        let response = self
            .client
            .get(locator)
            .timeout(self.cfg.timeout)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|err| ManifestError::Fetch(err.to_string()))?;
        response
            .json()
            .map_err(|err| ManifestError::Parse(err.to_string()))
    }

    fn fetch_via_relay(&self, relay: &str, locator: &str) -> Result<ManifestPayload, ManifestError> {
        let response = self
            .client
            .get(relay)
            .query(&[("url", locator)])
            .timeout(self.cfg.relay_timeout)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|err| ManifestError::Fetch(err.to_string()))?;
        response
            .json()
            .map_err(|err| ManifestError::Parse(err.to_string()))
    }
}

impl ManifestSource for HttpManifestSource {
    /// Direct fetch first; on any fetch or parse failure, one retry through
    /// the relay path when configured.
    fn fetch(&self, locator: &str) -> Result<ManifestPayload, ManifestError> {
        validate_locator(locator)?;
        match self.fetch_direct(locator) {
            Ok(payload) => {
                debug!(locator, "manifest fetched directly");
                Ok(payload)
            }
            Err(direct_err) => {
                let Some(relay) = self.cfg.relay_url.as_deref() else {
                    return Err(direct_err);
                };
                warn!(locator, error = %direct_err, "direct fetch failed, retrying via relay");
                self.fetch_via_relay(relay, locator).map_err(|relay_err| {
                    ManifestError::Fetch(format!(
                        "direct: {direct_err}; relay: {relay_err}"
                    ))
                })
            }
        }
    }
}
