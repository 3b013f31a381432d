//! Node addresses
//!
//! Manifests usually list bare `host:port` pairs; those are treated as
//! plain HTTP. Full `http://` or `https://` URLs are accepted as well.

use std::fmt;
use url::Url;

use super::DispatchError;

/// Address of one worker node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeEndpoint {
    /// The address as configured, trimmed
    label: String,

    /// Base URL, always ending in `/`
    base: Url,
}

impl NodeEndpoint {
    /// Parse a configured node address
    pub fn parse(addr: &str) -> Result<Self, DispatchError> {
        let label = addr.trim();
        if label.is_empty() {
            return Err(DispatchError::InvalidEndpoint("empty address".to_string()));
        }

        let candidate = if label.contains("://") {
            label.to_string()
        } else {
            format!("http://{label}")
        };

        let mut base = Url::parse(&candidate)
            .map_err(|e| DispatchError::InvalidEndpoint(format!("{label}: {e}")))?;

        if !matches!(base.scheme(), "http" | "https") {
            return Err(DispatchError::InvalidEndpoint(format!(
                "{label}: unsupported scheme '{}'",
                base.scheme()
            )));
        }
        if base.host_str().is_none() {
            return Err(DispatchError::InvalidEndpoint(format!("{label}: missing host")));
        }

        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            label: label.to_string(),
            base,
        })
    }

    /// Address as configured
    pub fn label(&self) -> &str {
        &self.label
    }

    /// URL of an endpoint on this node, relative to its base
    pub fn url_for(&self, path: &str) -> Result<Url, DispatchError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| DispatchError::InvalidEndpoint(format!("{}: {e}", self.label)))
    }
}

impl fmt::Display for NodeEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}
