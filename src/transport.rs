use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;

use crate::{SqlGateError, TransportOptions};

/// Failure reported by a [`Transport`].
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request never produced a response (connect, timeout, body read).
    #[error("{0}")]
    Network(String),
    /// The gateway answered with a non-success status.
    #[error("http error {status}: {body}")]
    Status { status: u16, body: String },
}

impl From<TransportError> for SqlGateError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Network(message) => Self::Transport(message),
            TransportError::Status { status, body } => Self::Http { status, body },
        }
    }
}

/// Capability to POST a JSON body and read back the response body.
///
/// Implementations own connection reuse, TLS and timeouts.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, url: &str, body: String) -> Result<String, TransportError>;
}

/// [`Transport`] backed by `reqwest`.
#[derive(Clone, Debug, Default)]
pub struct HttpTransport {
    http: reqwest::Client,
    options: TransportOptions,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies transport options such as the request timeout.
    pub fn with_options(mut self, opts: TransportOptions) -> Self {
        self.options = opts;
        self
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, url: &str, body: String) -> Result<String, TransportError> {
        let response = self
            .http
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .timeout(Duration::from_millis(self.options.timeout_ms))
            .body(body)
            .send()
            .await
            .map_err(|err| TransportError::Network(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| TransportError::Network(err.to_string()))?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}
