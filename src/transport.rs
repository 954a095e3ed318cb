//! Blocking HTTP transport.
//!
//! [`Transport`] is the seam between the page fetcher and the network.
//! [`HttpTransport`] is the real implementation; tests substitute fixtures.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT_ENCODING, HeaderMap, HeaderValue, USER_AGENT};

use crate::{EnmetError, Result};

/// The site answers 4xx to unknown clients, so a browser User-Agent is sent.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A completed HTTP exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    /// Final URL, after redirects.
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// 200 response with an empty header list.
    pub fn ok(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: 200,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn non-2xx responses into [`EnmetError::Status`].
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(EnmetError::Status {
                status: self.status,
                url: self.url,
            })
        }
    }
}

/// Blocking GET against the catalog site.
///
/// Implementations return non-2xx responses as values; status handling is
/// the fetcher's job. Transport-level failures are [`EnmetError::Http`].
pub trait Transport: Send + Sync {
    fn get(&self, url: &str, query: &[(String, String)]) -> Result<HttpResponse>;
}

/// [`Transport`] over a `reqwest` blocking client.
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    /// Create a transport with the given User-Agent and timeout.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(user_agent)
            .map_err(|e| EnmetError::Configuration(format!("invalid user agent: {e}")))?;
        headers.insert(USER_AGENT, agent);
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| EnmetError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str, query: &[(String, String)]) -> Result<HttpResponse> {
        let response = self
            .http
            .get(url)
            .query(query)
            .send()?;

        let final_url = response.url().to_string();
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text()?;

        Ok(HttpResponse {
            url: final_url,
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_for_status_passes_success() {
        let response = HttpResponse::ok("u", "body");
        assert_eq!(response.clone().error_for_status().unwrap(), response);
    }

    #[test]
    fn error_for_status_maps_failures() {
        let response = HttpResponse {
            status: 404,
            ..HttpResponse::ok("https://x/y", "")
        };
        match response.error_for_status() {
            Err(EnmetError::Status { status, url }) => {
                assert_eq!(status, 404);
                assert_eq!(url, "https://x/y");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[test]
    fn invalid_user_agent_is_configuration_error() {
        let result = HttpTransport::new("bad\nagent", DEFAULT_TIMEOUT);
        assert!(matches!(result, Err(EnmetError::Configuration(_))));
    }
}
