//! reqwest-backed implementation of the [`HttpTransport`] seam.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use crate::contract::{HttpResponse, HttpTransport, TransportError};

/// Per-request timeout. A bounded timeout does not change happy-path
/// semantics; it only turns a hung connection into a transport error.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        tracing::debug!(url = %url, "GET");
        let response =
            self.client
                .get(url)
                .send()
                .await
                .map_err(|e| TransportError::Request {
                    url: url.to_string(),
                    source: Box::new(e),
                })?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| TransportError::Body {
            url: url.to_string(),
            source: Box::new(e),
        })?;
        tracing::debug!(url = %url, status, bytes = body.len(), "GET completed");
        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }

    async fn post(
        &self,
        url: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<HttpResponse, TransportError> {
        tracing::debug!(url = %url, bytes = body.len(), "POST");
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| TransportError::Request {
                url: url.to_string(),
                source: Box::new(e),
            })?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| TransportError::Body {
            url: url.to_string(),
            source: Box::new(e),
        })?;
        tracing::debug!(url = %url, status, "POST completed");
        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}
