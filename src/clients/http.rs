use crate::config::RetryConfig;
use crate::retry::retry_rate_limited;
use crate::{AtelierError, Result};
use http_client::{HttpClient, Request};
use http_types::{Method, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;

const USER_AGENT: &str = concat!("atelier-lucide/", env!("CARGO_PKG_VERSION"));

/// Seconds to wait when a 429 response carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER: u64 = 5;

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.clone())
            .map_err(|e| AtelierError::Parse(format!("Response is not UTF-8: {e}")))
    }

    /// Deserialize the body into a typed record.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| AtelierError::Parse(format!("Unexpected JSON response: {e}")))
    }

    /// Fail with [`AtelierError::Http`] unless the status is 2xx.
    pub fn error_for_status(self, context: &str) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(AtelierError::Http(format!(
                "{context} failed with status {}",
                self.status
            )))
        }
    }
}

/// Shared HTTP plumbing of every collaborator client.
///
/// Wraps any [`HttpClient`] implementation. Rate-limit responses (429) are
/// turned into [`AtelierError::RateLimit`] and retried according to the
/// [`RetryConfig`]; every other status is handed back to the caller.
#[derive(Clone)]
pub struct HttpTransport {
    client: Arc<dyn HttpClient + Send + Sync>,
    retry: RetryConfig,
}

impl HttpTransport {
    pub fn new(client: Arc<dyn HttpClient + Send + Sync>) -> Self {
        Self {
            client,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// GET `url` with extra headers.
    pub async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse> {
        self.send_with_retry(Method::Get, url, headers, None).await
    }

    /// POST an `application/x-www-form-urlencoded` body.
    pub async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse> {
        let body = encode_form(form);
        self.send_with_retry(Method::Post, url, headers, Some(&body))
            .await
    }

    async fn send_with_retry(
        &self,
        method: Method,
        url: &str,
        headers: &[(&str, &str)],
        body: Option<&str>,
    ) -> Result<HttpResponse> {
        let transport = self;
        let operation = format!("{method} {}", strip_query(url));
        let outcome = retry_rate_limited(&self.retry, &operation, move || {
            transport.send_once(method, url, headers, body)
        })
        .await?;
        Ok(outcome.value)
    }

    async fn send_once(
        &self,
        method: Method,
        url: &str,
        headers: &[(&str, &str)],
        body: Option<&str>,
    ) -> Result<HttpResponse> {
        let parsed = url
            .parse::<Url>()
            .map_err(|e| AtelierError::Http(format!("Invalid URL {url}: {e}")))?;

        let mut request = Request::new(method, parsed);
        let _ = request.insert_header("User-Agent", USER_AGENT);
        for (name, value) in headers {
            let _ = request.insert_header(*name, *value);
        }
        if let Some(body) = body {
            let _ = request.insert_header("Content-Type", "application/x-www-form-urlencoded");
            request.set_body(body.to_string());
        }

        log::debug!("{method} {}", strip_query(url));
        let mut response = self
            .client
            .send(request)
            .await
            .map_err(|e| AtelierError::Http(e.to_string()))?;
        log::trace!("Response status: {}", response.status());

        if response.status() == 429 {
            let retry_after = response
                .header("retry-after")
                .and_then(|values| values.get(0))
                .and_then(|value| parse_retry_after(value.as_str()))
                .unwrap_or(DEFAULT_RETRY_AFTER);
            return Err(AtelierError::RateLimit { retry_after });
        }

        let status = u16::from(response.status());
        let body = response
            .body_bytes()
            .await
            .map_err(|e| AtelierError::Http(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}

/// `Retry-After` in delta-seconds form.
pub fn parse_retry_after(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

/// URL without its query string, for logs that must not leak API keys.
pub fn strip_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

/// `key=value&...` with both sides percent-encoded.
pub fn encode_form(form: &[(&str, &str)]) -> String {
    form.iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}
