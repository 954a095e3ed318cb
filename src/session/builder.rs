//! Builder for configuring [`Enmet`] sessions

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::Enmet;
use crate::cache::{CacheConfig, DEFAULT_DOCUMENT_CACHE_CAPACITY};
use crate::fetch::{DEFAULT_BASE_URL, DEFAULT_QUERY_RATE, PageFetcher};
use crate::transport::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, HttpTransport, Transport};
use crate::{EnmetError, Result};

/// Builder for configuring sessions.
pub struct EnmetBuilder {
    base_url: Option<String>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    query_rate: f64,
    document_cache_capacity: u64,
    response_cache: Option<CacheConfig>,
    transport: Option<Arc<dyn Transport>>,
}

impl EnmetBuilder {
    pub fn new() -> Self {
        Self {
            base_url: None,
            user_agent: None,
            timeout: None,
            query_rate: DEFAULT_QUERY_RATE,
            document_cache_capacity: DEFAULT_DOCUMENT_CACHE_CAPACITY,
            response_cache: None,
            transport: None,
        }
    }

    /// Site root (default: the public catalog site).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// User-Agent header for the built-in HTTP transport.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Request timeout for the built-in HTTP transport (default: 30s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Maximum uncached requests per second (default: 3). `0` disables throttling.
    pub fn query_rate(mut self, rate: f64) -> Self {
        self.query_rate = rate;
        self
    }

    /// Number of parsed pages kept in memory (default: 100).
    pub fn document_cache_capacity(mut self, capacity: u64) -> Self {
        self.document_cache_capacity = capacity;
        self
    }

    /// Response cache configuration (default: sqlite in the user cache directory).
    pub fn response_cache(mut self, config: CacheConfig) -> Self {
        self.response_cache = Some(config);
        self
    }

    /// Replace the HTTP transport entirely.
    ///
    /// `user_agent` and `timeout` only apply to the built-in transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the session.
    ///
    /// Nothing is fetched and the response cache is not opened yet; both
    /// happen on the first entity read.
    pub fn build(self) -> Result<Enmet> {
        if !self.query_rate.is_finite() || self.query_rate < 0.0 {
            return Err(EnmetError::Configuration(format!(
                "query rate must be a non-negative number, got {}",
                self.query_rate
            )));
        }

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(
                self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT),
                self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            )?),
        };
        let base_url = self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let response_cache = self.response_cache.unwrap_or_default();
        debug!(
            %base_url,
            query_rate = self.query_rate,
            backend = ?response_cache.backend,
            "building session"
        );

        let fetcher = PageFetcher::new(
            base_url,
            transport,
            response_cache,
            self.document_cache_capacity,
            self.query_rate,
        )?;
        Ok(Enmet::from_fetcher(fetcher))
    }
}

impl Default for EnmetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HttpResponse;

    struct Unreachable;

    impl Transport for Unreachable {
        fn get(&self, url: &str, _query: &[(String, String)]) -> Result<HttpResponse> {
            Err(EnmetError::Http(format!("unreachable: {url}")))
        }
    }

    fn builder(query_rate: f64) -> EnmetBuilder {
        EnmetBuilder::new()
            .query_rate(query_rate)
            .response_cache(CacheConfig::disabled())
            .transport(Arc::new(Unreachable))
    }

    #[test]
    fn accepts_usual_query_rates() {
        assert!(builder(0.0).build().is_ok());
        assert!(builder(3.0).build().is_ok());
        assert!(builder(0.01).build().is_ok());
    }

    #[test]
    fn rejects_negative_and_non_finite_rates() {
        for rate in [-1.0, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(builder(rate).build(), Err(EnmetError::Configuration(_))),
                "{rate} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_rates_whose_interval_overflows() {
        for rate in [1e-300, f64::MIN_POSITIVE] {
            assert!(
                matches!(builder(rate).build(), Err(EnmetError::Configuration(_))),
                "{rate} should be rejected"
            );
        }
    }
}
