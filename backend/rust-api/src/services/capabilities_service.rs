use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::CapabilitiesError;
use crate::metrics::{record_cache_hit, record_cache_miss, CAPABILITY_FETCHES_TOTAL};
use crate::models::capabilities::{Capabilities, CallableRequest, CallableResponse};
use crate::utils::retry::{retry_async_with_config, RetryConfig};
use crate::utils::ttl_cache::{Clock, TtlCache};

const CACHE_KEY: &str = "capabilities";

/// Source of deployment capabilities.
#[async_trait]
pub trait CapabilitiesProvider: Send + Sync {
    async fn fetch(&self) -> Result<Capabilities, CapabilitiesError>;
}

/// Calls the `getCapabilities` callable Cloud Function over HTTPS.
pub struct HttpCapabilitiesProvider {
    client: Client,
    function_url: Option<String>,
    retry: RetryConfig,
}

impl HttpCapabilitiesProvider {
    pub fn new(
        function_url: Option<String>,
        timeout: Duration,
        max_attempts: usize,
    ) -> Result<Self, CapabilitiesError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            function_url,
            retry: RetryConfig::with_attempts(max_attempts),
        })
    }

    async fn call_once(&self, url: &str) -> Result<Capabilities, CapabilitiesError> {
        let response = self
            .client
            .post(url)
            .json(&CallableRequest {
                data: serde_json::json!({}),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CapabilitiesError::Status(response.status().as_u16()));
        }

        let body: CallableResponse<Capabilities> = response.json().await?;
        Ok(body.result)
    }
}

#[async_trait]
impl CapabilitiesProvider for HttpCapabilitiesProvider {
    async fn fetch(&self) -> Result<Capabilities, CapabilitiesError> {
        let url = self
            .function_url
            .as_deref()
            .ok_or(CapabilitiesError::NotConfigured)?;

        retry_async_with_config(
            self.retry.clone(),
            CapabilitiesError::is_retryable,
            || self.call_once(url),
        )
        .await
    }
}

/// Caches the capabilities document for the configured TTL.
///
/// Concurrent misses may each hit the provider; the last writer wins.
pub struct CapabilitiesService {
    provider: Arc<dyn CapabilitiesProvider>,
    cache: TtlCache<&'static str, Capabilities>,
}

impl CapabilitiesService {
    pub fn new(provider: Arc<dyn CapabilitiesProvider>, ttl: Duration) -> Self {
        Self {
            provider,
            cache: TtlCache::new(ttl),
        }
    }

    pub fn with_clock(
        provider: Arc<dyn CapabilitiesProvider>,
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            provider,
            cache: TtlCache::with_clock(ttl, clock),
        }
    }

    /// Returns the capabilities and whether they came from cache.
    pub async fn get(&self) -> Result<(Capabilities, bool), CapabilitiesError> {
        if let Some(cached) = self.cache.get(&CACHE_KEY) {
            record_cache_hit();
            return Ok((cached, true));
        }
        record_cache_miss();

        match self.provider.fetch().await {
            Ok(capabilities) => {
                CAPABILITY_FETCHES_TOTAL.with_label_values(&["success"]).inc();
                self.cache.set(CACHE_KEY, capabilities.clone());
                tracing::info!(
                    "Capabilities refreshed, cached for {:?}",
                    self.cache.ttl()
                );
                Ok((capabilities, false))
            }
            Err(e) => {
                CAPABILITY_FETCHES_TOTAL.with_label_values(&["error"]).inc();
                tracing::error!("Failed to fetch capabilities: {}", e);
                Err(e)
            }
        }
    }

    pub fn invalidate(&self) -> bool {
        let removed = self.cache.invalidate(&CACHE_KEY);
        tracing::info!("Capabilities cache invalidated (had entry: {})", removed);
        removed
    }
}
