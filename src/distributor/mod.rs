//! Flag distribution across worker nodes
//!
//! A distribution round splits the three secrets into one shard per node
//! and posts each node its triple concurrently. Every node yields exactly
//! one [`DistributionResult`]; a slow or dead node costs at most the
//! per-request timeout and never holds back its siblings.
//!
//! # Flow
//!
//! ```text
//! secrets ──split──▶ [shards_0, shards_1, ..., shards_n-1]
//!                         │          │               │
//!                      node 0     node 1   ...    node n-1     (concurrent)
//!                         │          │               │
//!                         └──────────┴─── join ──────┘
//!                                     │
//!                            DistributionReport (node order)
//! ```

pub mod endpoint;
pub mod report;
pub mod sender;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::config::DistributorConfig;
use crate::splitter::split;
use crate::store::FlagShards;

pub use endpoint::NodeEndpoint;
pub use report::{DistributionReport, DistributionResult, NodeOutcome};
pub use sender::{HttpSender, ShardSender};

// ============================================================================
// Errors
// ============================================================================

/// Errors raised while dispatching to nodes
#[derive(Error, Debug, Clone)]
pub enum DispatchError {
    /// HTTP client could not be built
    #[error("Initialization error: {0}")]
    Init(String),

    /// Node address could not be understood
    #[error("Invalid node address: {0}")]
    InvalidEndpoint(String),

    /// Connection refused, DNS failure, reset...
    #[error("Network error: {0}")]
    Network(String),

    /// No response within the per-request timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Node answered with a non-2xx status
    #[error("HTTP error ({status}): {message}")]
    HttpStatus { status: u16, message: String },

    /// Node answered 2xx without a usable password
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A round was requested with no nodes at all
    #[error("No target nodes configured")]
    NoTargets,
}

// ============================================================================
// Secrets
// ============================================================================

/// The three whole secrets of one round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secrets {
    pub zip: String,
    pub web: String,
    pub curl: String,
}

/// Split every secret into `nodes` shards and group them per node.
///
/// Entry `i` holds the `i`-th shard of each secret.
pub fn plan(secrets: &Secrets, nodes: usize) -> Vec<FlagShards> {
    let zip = split(&secrets.zip, nodes);
    let web = split(&secrets.web, nodes);
    let curl = split(&secrets.curl, nodes);

    zip.into_iter()
        .zip(web)
        .zip(curl)
        .map(|((zip, web), curl)| FlagShards { zip, web, curl })
        .collect()
}

// ============================================================================
// Distributor
// ============================================================================

/// Fans shard payloads out to nodes and collects the outcomes
pub struct Distributor<S = HttpSender> {
    sender: S,
    timeout: Duration,
}

impl Distributor<HttpSender> {
    /// Create a distributor talking HTTP to the nodes
    pub fn new(config: &DistributorConfig) -> Result<Self, DispatchError> {
        config
            .validate()
            .map_err(|e| DispatchError::Init(e.to_string()))?;
        let sender = HttpSender::new(config)?;
        Ok(Self::with_sender(sender, config.request_timeout()))
    }
}

impl<S: ShardSender> Distributor<S> {
    /// Create a distributor around any [`ShardSender`]
    pub fn with_sender(sender: S, timeout: Duration) -> Self {
        Self { sender, timeout }
    }

    /// Run one distribution round.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::NoTargets`] without touching the network when
    /// `nodes` is empty. Per-node failures are never returned as errors; they
    /// are recorded in the report.
    pub async fn distribute(
        &self,
        secrets: &Secrets,
        nodes: &[NodeEndpoint],
    ) -> Result<DistributionReport, DispatchError> {
        let targets = nodes
            .iter()
            .map(|node| (node.label().to_string(), Ok(node.clone())))
            .collect();
        self.run(secrets, targets).await
    }

    /// Run one distribution round against configured addresses.
    ///
    /// An address that cannot be parsed is recorded as a failure at its
    /// position; shard `i` still goes to address `i`.
    pub async fn distribute_to<A: AsRef<str>>(
        &self,
        secrets: &Secrets,
        addrs: &[A],
    ) -> Result<DistributionReport, DispatchError> {
        let targets = addrs
            .iter()
            .map(|addr| {
                let addr = addr.as_ref();
                (addr.trim().to_string(), NodeEndpoint::parse(addr))
            })
            .collect();
        self.run(secrets, targets).await
    }

    async fn run(
        &self,
        secrets: &Secrets,
        targets: Vec<(String, Result<NodeEndpoint, DispatchError>)>,
    ) -> Result<DistributionReport, DispatchError> {
        if targets.is_empty() {
            tracing::warn!("No nodes configured, nothing to distribute");
            return Err(DispatchError::NoTargets);
        }

        let round_id = Uuid::new_v4();
        let started_at = Utc::now();
        let payloads = plan(secrets, targets.len());

        tracing::info!(round = %round_id, nodes = targets.len(), "Distributing flag shards");

        let futures = targets
            .into_iter()
            .zip(payloads)
            .enumerate()
            .map(|(index, ((label, target), payload))| self.dispatch(index, label, target, payload));

        // join_all keeps input order regardless of completion order
        let results = futures::future::join_all(futures).await;

        let report = DistributionReport {
            round_id,
            started_at,
            finished_at: Utc::now(),
            results,
        };

        tracing::info!(
            round = %round_id,
            succeeded = report.succeeded(),
            failed = report.failed(),
            "Distribution round finished"
        );

        Ok(report)
    }

    async fn dispatch(
        &self,
        index: usize,
        label: String,
        target: Result<NodeEndpoint, DispatchError>,
        payload: FlagShards,
    ) -> DistributionResult {
        let sent = match &target {
            Ok(node) => tokio::time::timeout(self.timeout, self.sender.send(node, &payload))
                .await
                .unwrap_or(Err(DispatchError::Timeout(self.timeout))),
            Err(e) => Err(e.clone()),
        };

        let outcome = match sent {
            Ok(password) => {
                tracing::info!(node = %label, index, "Node accepted shards");
                NodeOutcome::Success { password }
            }
            Err(e) => {
                tracing::warn!(node = %label, index, error = %e, "Node failed");
                NodeOutcome::Failure {
                    reason: e.to_string(),
                }
            }
        };

        DistributionResult {
            node: label,
            index,
            outcome,
        }
    }
}
