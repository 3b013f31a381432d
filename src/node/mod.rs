//! Worker node: shard ingestion and exposure
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │             Node Server              │
//! │                                      │
//! │  POST /set-config                    │
//! │    validate ─▶ pick password ─▶      │
//! │    build archive ─▶ swap snapshot    │
//! │                                      │
//! │  GET /                               │
//! │    User-Agent ─▶ text or HTML        │
//! │                                      │
//! │  ┌───────────┐   ┌────────────────┐  │
//! │  │ConfigStore│   │ ArchiveBuilder │  │
//! │  └───────────┘   └────────────────┘  │
//! └──────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use flagshard::config::NodeConfig;
//! use flagshard::node::NodeServer;
//!
//! let server = NodeServer::new(NodeConfig::default())?;
//! server.start_with_shutdown(async { let _ = tokio::signal::ctrl_c().await; }).await?;
//! ```

pub mod api;
pub mod expose;
pub mod ingest;
pub mod server;
pub mod service;

// Re-export main types
pub use expose::{ClientKind, Exposure};
pub use ingest::{IngestRequest, IngestResponse, ValidationError};
pub use server::{AppState, NodeServer, ServerError};
pub use service::NodeService;
