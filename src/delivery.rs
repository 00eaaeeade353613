//! Delivery of synthesized documents to the docs aggregator.

use crate::config::AutoDocConfig;
use crate::error::{DeliveryFailure, Error, Result};
use crate::openapi_builder::OpenApiDocument;
use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Body POSTed to the aggregator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryPayload {
    pub service_name: String,
    /// Reachable base URL of the documented service
    pub url: String,
    pub spec: OpenApiDocument,
}

impl DeliveryPayload {
    pub fn new(config: &AutoDocConfig, spec: OpenApiDocument) -> Self {
        Self {
            service_name: config.service_name.clone(),
            url: config.service_url.clone(),
            spec,
        }
    }
}

/// Somewhere a payload can be sent.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    /// Sends one payload; `Ok` means the receiver accepted it.
    async fn deliver(&self, payload: &DeliveryPayload) -> Result<()>;

    /// Human-readable destination, used in log lines
    fn endpoint(&self) -> &str;
}

/// Sends payloads to an aggregator over HTTP.
pub struct AggregatorClient {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
    verbose: bool,
}

impl AggregatorClient {
    /// Create a new aggregator client
    pub fn new(client: reqwest::Client, config: &AutoDocConfig) -> Self {
        Self {
            client,
            endpoint: config.aggregator_url.clone(),
            timeout: config.request_timeout,
            verbose: config.debug,
        }
    }

    fn failure(&self, failure: DeliveryFailure) -> Error {
        Error::Delivery {
            endpoint: self.endpoint.clone(),
            failure,
        }
    }

    fn classify(&self, err: reqwest::Error) -> Error {
        let failure = if err.is_timeout() {
            DeliveryFailure::Timeout
        } else if err.is_connect() {
            DeliveryFailure::ConnectionRefused(err.to_string())
        } else {
            DeliveryFailure::Transport(err.to_string())
        };
        self.failure(failure)
    }
}

#[async_trait]
impl DocumentSink for AggregatorClient {
    async fn deliver(&self, payload: &DeliveryPayload) -> Result<()> {
        if self.verbose {
            debug!(
                "POST {} ({} operations for {})",
                self.endpoint,
                payload.spec.operation_count(),
                payload.service_name
            );
        }

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(payload)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if self.verbose {
            debug!("Aggregator response status: {}", status);
        }

        if !status.is_success() {
            return Err(self.failure(DeliveryFailure::Status(status.as_u16())));
        }

        Ok(())
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
