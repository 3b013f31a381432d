//! Worker node server
//!
//! Wires the node service into an axum router and runs it.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::NodeConfig;

use super::api::create_router;
use super::service::NodeService;

// ============================================================================
// App State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Ingestion and exposure logic
    pub service: Arc<NodeService>,

    /// Server start time
    pub start_time: Instant,
}

// ============================================================================
// Node Server
// ============================================================================

/// HTTP server of one worker node
pub struct NodeServer {
    config: NodeConfig,
    state: AppState,
}

impl NodeServer {
    /// Create a node server, loading the wordlist from the configured path
    pub fn new(config: NodeConfig) -> Result<Self, ServerError> {
        config
            .validate()
            .map_err(|e| ServerError::ConfigError(e.to_string()))?;

        let service =
            NodeService::from_config(&config).map_err(|e| ServerError::InitError(e.to_string()))?;

        Ok(Self::with_service(config, service))
    }

    /// Create a node server around an already built service
    pub fn with_service(config: NodeConfig, service: NodeService) -> Self {
        let state = AppState {
            service: Arc::new(service),
            start_time: Instant::now(),
        };
        Self { config, state }
    }

    /// Get the application state
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Build the router with all routes and layers
    pub fn build_router(&self) -> Router {
        let mut router = create_router(self.state.clone())
            .layer(DefaultBodyLimit::max(self.config.max_body_bytes));

        if self.config.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        if self.config.enable_request_logging {
            router = router.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));
        }

        router
    }

    /// Bind the configured address and serve until `shutdown_signal` resolves
    pub async fn start_with_shutdown(
        &self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let addr = self.config.bind_address;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(format!("{addr}: {e}")))?;

        self.serve(listener, shutdown_signal).await
    }

    /// Serve on an already bound listener until `shutdown_signal` resolves
    pub async fn serve(
        &self,
        listener: TcpListener,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let router = self.build_router();
        let local = listener
            .local_addr()
            .map_err(|e| ServerError::BindError(e.to_string()))?;

        tracing::info!(
            addr = %local,
            archive = %self.config.archive_path().display(),
            "Node server listening"
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| ServerError::ServeError(e.to_string()))?;

        tracing::info!("Node server shutdown complete");
        Ok(())
    }

    /// Get server info
    pub fn info(&self) -> ServerInfo {
        ServerInfo {
            bind_address: self.config.bind_address,
            archive_path: self.config.archive_path().display().to_string(),
            wordlist_size: self.state.service.wordlist_size(),
            request_logging_enabled: self.config.enable_request_logging,
        }
    }
}

/// Server information
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub bind_address: SocketAddr,
    pub archive_path: String,
    pub wordlist_size: usize,
    pub request_logging_enabled: bool,
}

impl ServerInfo {
    /// Format as display string
    pub fn display(&self) -> String {
        format!(
            "Flagshard Node\n\
             {:-<40}\n\
             Bind Address: {}\n\
             Archive: {}\n\
             Wordlist Size: {}\n\
             Request Logging: {}",
            "",
            self.bind_address,
            self.archive_path,
            self.wordlist_size,
            if self.request_logging_enabled { "enabled" } else { "disabled" }
        )
    }
}

// ============================================================================
// Server Errors
// ============================================================================

/// Server errors
#[derive(Debug, Clone)]
pub enum ServerError {
    /// Configuration error
    ConfigError(String),

    /// Initialization error
    InitError(String),

    /// Failed to bind to address
    BindError(String),

    /// Server error
    ServeError(String),
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Self::InitError(msg) => write!(f, "Initialization error: {}", msg),
            Self::BindError(msg) => write!(f, "Failed to bind: {}", msg),
            Self::ServeError(msg) => write!(f, "Server error: {}", msg),
        }
    }
}

impl std::error::Error for ServerError {}
