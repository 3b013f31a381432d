//! Delivery of shard payloads to nodes

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::config::DistributorConfig;
use crate::store::FlagShards;

use super::endpoint::NodeEndpoint;
use super::DispatchError;

/// Longest response body excerpt kept in an error message
const MAX_ERROR_BODY: usize = 200;

/// Something able to hand a payload to a node and get its archive password back
#[async_trait]
pub trait ShardSender: Send + Sync {
    /// Deliver `payload` to `node`, returning the password the node chose
    async fn send(&self, node: &NodeEndpoint, payload: &FlagShards)
        -> Result<String, DispatchError>;
}

/// Body returned by a node's ingestion endpoint
#[derive(Debug, Deserialize)]
struct IngestResponse {
    zip_password: Option<String>,
}

/// [`ShardSender`] posting JSON over HTTP with reqwest
#[derive(Debug, Clone)]
pub struct HttpSender {
    client: Client,
    ingest_path: String,
    timeout: Duration,
}

impl HttpSender {
    /// Create a sender from distributor settings
    pub fn new(config: &DistributorConfig) -> Result<Self, DispatchError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| DispatchError::Init(e.to_string()))?;

        Ok(Self {
            client,
            ingest_path: config.ingest_path.clone(),
            timeout: config.request_timeout(),
        })
    }
}

#[async_trait]
impl ShardSender for HttpSender {
    async fn send(
        &self,
        node: &NodeEndpoint,
        payload: &FlagShards,
    ) -> Result<String, DispatchError> {
        let url = node.url_for(&self.ingest_path)?;

        tracing::debug!(node = %node, url = %url, "Posting shard payload");

        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DispatchError::HttpStatus {
                status: status.as_u16(),
                message: truncate(&body, MAX_ERROR_BODY),
            });
        }

        let body: IngestResponse = response
            .json()
            .await
            .map_err(|e| DispatchError::MalformedResponse(e.to_string()))?;

        body.zip_password.ok_or_else(|| {
            DispatchError::MalformedResponse("missing zip_password field".to_string())
        })
    }
}

impl HttpSender {
    fn classify(&self, err: reqwest::Error) -> DispatchError {
        if err.is_timeout() {
            DispatchError::Timeout(self.timeout)
        } else {
            DispatchError::Network(err.to_string())
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
