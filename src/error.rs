//! Unified error handling for the flagshard crate
//!
//! Each module owns a focused error enum. [`Error`] wraps the ones the
//! node service can hit so the HTTP layer maps a single type to a status.
//! The CLI reports the remaining ones through `anyhow`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use flagshard::error::{Error, ErrorCategory};
//!
//! fn status_for(err: &Error) -> u16 {
//!     match err.category() {
//!         ErrorCategory::Validation => 400,
//!         _ => 500,
//!     }
//! }
//! ```

use thiserror::Error;

pub use crate::archive::ArchiveError;
pub use crate::config::ConfigError;
pub use crate::distributor::DispatchError;
pub use crate::manifest::ManifestError;
pub use crate::node::ingest::ValidationError;
pub use crate::secret::WordlistError;

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Rejected client input
    Validation,
    /// Archive and file system errors
    Storage,
    /// Wordlist and template defects
    Config,
}

/// Unified error type of the node service
#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("Wordlist error: {0}")]
    Wordlist(#[from] WordlistError),

    /// Page template failed to compile or render
    #[error("Template error: {0}")]
    Template(String),
}

impl Error {
    /// Get the error category for handling strategies
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Archive(_) => ErrorCategory::Storage,
            Self::Wordlist(_) | Self::Template(_) => ErrorCategory::Config,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
