pub mod distribute;
pub mod serve;

// Re-export command functions for convenience
pub use distribute::{distribute, DistributeParams};
pub use serve::{serve, ServeParams};
