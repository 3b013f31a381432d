//! flagshard - distribute a flag across worker nodes
//!
//! The flag is made of three independent secrets. Each is split into one
//! contiguous shard per node; every node seals its zip shard into an
//! AES-encrypted archive under a password drawn from a wordlist, and
//! serves its web and curl shards over HTTP depending on the client.
//!
//! # Architecture
//!
//! - [`splitter`] - Order-preserving, length-balanced string splitting
//! - [`secret`] - Wordlist loading and CSPRNG password selection
//! - [`archive`] - Atomic, single-entry AES zip generation
//! - [`store`] - Snapshot-swapping store of the node's current shards
//! - [`distributor`] - Concurrent fan-out of shards with per-node reporting
//! - [`node`] - Ingestion and exposure endpoints of a worker node
//! - [`manifest`] - Operator manifest (node list and secrets)
//! - [`config`] - Node and distributor configuration
//! - [`error`] - Unified error type
//!
//! # Example
//!
//! ```no_run
//! use flagshard::config::DistributorConfig;
//! use flagshard::distributor::Distributor;
//! use flagshard::manifest::Manifest;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let manifest = Manifest::load(Path::new("manifest.yaml"))?;
//!     let distributor = Distributor::new(&DistributorConfig::default())?;
//!     let report = distributor
//!         .distribute_to(&manifest.flag, &manifest.nodes)
//!         .await?;
//!     println!("{}", report.render_table());
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod config;
pub mod distributor;
pub mod error;
pub mod manifest;
pub mod node;
pub mod secret;
pub mod splitter;
pub mod store;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::archive::ArchiveBuilder;
    pub use crate::config::{DistributorConfig, NodeConfig};
    pub use crate::distributor::{Distributor, DistributionReport, NodeEndpoint, Secrets};
    pub use crate::error::{Error, ErrorCategory, Result};
    pub use crate::manifest::Manifest;
    pub use crate::node::NodeServer;
    pub use crate::store::{ConfigStore, FlagShards};
}
