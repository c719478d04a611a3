//! Destinations for metric samples.

use std::io::Write;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::models::metric::MetricSample;

pub const API_KEY_HEADER: &str = "X-Api-Key";

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("{status}: backend rejected metric: {body}")]
    Rejected { status: StatusCode, body: String },
    #[error("failed to write metric: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode metric: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Something that accepts one metric sample for a logical namespace.
#[allow(async_fn_in_trait)]
pub trait MetricSink {
    async fn submit(&self, namespace: &str, sample: &MetricSample) -> Result<(), TransportError>;
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct MetricPayload<'a> {
    namespace: &'a str,
    metric_data: [&'a MetricSample; 1],
}

/// Posts each sample as JSON to a metrics intake endpoint.
#[derive(Clone)]
pub struct HttpSink {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpSink {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, TransportError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(TransportError::Client)?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }
}

impl MetricSink for HttpSink {
    async fn submit(&self, namespace: &str, sample: &MetricSample) -> Result<(), TransportError> {
        let payload = MetricPayload {
            namespace,
            metric_data: [sample],
        };
        let mut request = self.client.post(&self.endpoint).json(&payload);
        if let Some(api_key) = &self.api_key {
            request = request.header(API_KEY_HEADER, api_key);
        }

        let response = request.send().await.map_err(TransportError::Request)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Rejected { status, body });
        }

        debug!(endpoint = %self.endpoint, %status, "metric accepted");
        Ok(())
    }
}

/// Prints each sample as a JSON line instead of sending it anywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl MetricSink for StdoutSink {
    async fn submit(&self, namespace: &str, sample: &MetricSample) -> Result<(), TransportError> {
        let line = serde_json::to_string(&MetricPayload {
            namespace,
            metric_data: [sample],
        })?;
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", line)?;
        Ok(())
    }
}
