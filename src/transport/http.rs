use super::{join_url, retry_after_header, user_agent, AsyncExchange, ExchangeRequest, RawResponse, TransportError};
use crate::client::ClientConfig;
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Proxy;
use std::time::Duration;

/// Async reqwest session. One per [`crate::VectorClient`]; cheap to share.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .user_agent(user_agent())
            .default_headers(headers)
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .pool_max_idle_per_host(32)
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Some(proxy_url) = &config.proxy {
            let proxy = Proxy::all(proxy_url).map_err(|e| {
                Error::validation_with_context(
                    format!("Invalid proxy URL: {}", e),
                    ErrorContext::new().with_field_path("proxy").with_source("transport"),
                )
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().map_err(|e| {
            Error::network_with_context(
                format!("Failed to create HTTP client: {}", e),
                ErrorContext::new().with_source("transport"),
            )
        })?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl AsyncExchange for HttpTransport {
    async fn exchange(
        &self,
        request: &ExchangeRequest,
        timeout: Duration,
    ) -> std::result::Result<RawResponse, TransportError> {
        let url = join_url(&self.base_url, &request.path);
        let mut req = self
            .client
            .request(request.method.clone(), &url)
            .bearer_auth(&self.api_key)
            .header("x-request-id", request.request_id.as_str())
            .timeout(timeout);
        if let Some(body) = &request.body {
            req = req.json(body);
        }

        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let retry_after = retry_after_header(resp.headers());
        let body = resp.text().await?;

        Ok(RawResponse {
            status,
            retry_after,
            body,
        })
    }
}
