//! The network seam.
//!
//! One trait, one production implementation. The dispatcher is generic
//! over [`Transport`] so tests can script exchanges without a network.

use std::collections::HashMap;
use std::future::Future;

use reqwest::Client;
use tokio_util::sync::CancellationToken;

use crate::error::Error;

/// One HTTP exchange as seen by the dispatcher: status line, lowercased
/// headers, raw body bytes.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

/// A single request/response exchange against the catalog endpoint.
pub trait Transport: Send + Sync {
    /// POST `body` to `url` with the given headers. Must observe `cancel`
    /// and unwind with [`Error::Canceled`] without completing the
    /// exchange.
    fn send(
        &self,
        url: &str,
        body: String,
        headers: &[(&str, &str)],
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<RawResponse, Error>> + Send;
}

/// Production transport backed by `reqwest`.
#[derive(Debug, Default)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }
}

impl Transport for HttpTransport {
    async fn send(
        &self,
        url: &str,
        body: String,
        headers: &[(&str, &str)],
        cancel: &CancellationToken,
    ) -> Result<RawResponse, Error> {
        let mut request = self.http.post(url).body(body);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(Error::Canceled),
            response = request.send() => response?,
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        let body = tokio::select! {
            _ = cancel.cancelled() => return Err(Error::Canceled),
            bytes = response.bytes() => bytes?.to_vec(),
        };

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}
