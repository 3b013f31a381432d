//! Operator manifest: node addresses plus the three secrets
//!
//! ```yaml
//! rpi:
//!   - 10.0.0.11:8080
//!   - 10.0.0.12:8080
//! flag:
//!   zip: "FLAG{zip-part}"
//!   web: "FLAG{web-part}"
//!   curl: "FLAG{curl-part}"
//! ```
//!
//! YAML is chosen for `.yaml`/`.yml` files, TOML for everything else.
//! `nodes` is accepted as an alias of `rpi`.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::distributor::Secrets;

/// Errors raised while loading a manifest
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("manifest not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML manifest {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid TOML manifest {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Supported manifest encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Yaml,
    Toml,
}

impl ManifestFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Toml,
        }
    }
}

/// Parsed manifest
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    /// Node addresses, unparsed; shard `i` goes to node `i`
    #[serde(alias = "rpi", default)]
    pub nodes: Vec<String>,

    /// Secrets to split
    pub flag: Secrets,
}

impl Manifest {
    /// Load a manifest from disk
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ManifestError::NotFound(path.to_path_buf())
            } else {
                ManifestError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        Self::parse(&content, ManifestFormat::from_path(path)).map_err(|e| match e {
            ParseFailure::Yaml(source) => ManifestError::Yaml {
                path: path.to_path_buf(),
                source,
            },
            ParseFailure::Toml(source) => ManifestError::Toml {
                path: path.to_path_buf(),
                source,
            },
        })
    }

    /// Parse manifest text in the given format
    fn parse(content: &str, format: ManifestFormat) -> Result<Self, ParseFailure> {
        match format {
            ManifestFormat::Yaml => serde_yaml::from_str(content).map_err(ParseFailure::Yaml),
            ManifestFormat::Toml => toml::from_str(content).map_err(ParseFailure::Toml),
        }
    }
}

enum ParseFailure {
    Yaml(serde_yaml::Error),
    Toml(toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_yaml_with_rpi_key() {
        let file = write_temp(
            ".yaml",
            "rpi:\n  - 10.0.0.11:8080\n  - 10.0.0.12:8080\nflag:\n  zip: ZIPFLAG\n  web: WEBFLAG\n  curl: CURLFLAG\n",
        );

        let manifest = Manifest::load(file.path()).unwrap();
        assert_eq!(manifest.nodes, vec!["10.0.0.11:8080", "10.0.0.12:8080"]);
        assert_eq!(manifest.flag.zip, "ZIPFLAG");
        assert_eq!(manifest.flag.curl, "CURLFLAG");
    }

    #[test]
    fn test_load_toml_with_nodes_key() {
        let file = write_temp(
            ".toml",
            "nodes = [\"pi-1:8080\"]\n\n[flag]\nzip = \"Z\"\nweb = \"W\"\ncurl = \"C\"\n",
        );

        let manifest = Manifest::load(file.path()).unwrap();
        assert_eq!(manifest.nodes, vec!["pi-1:8080"]);
        assert_eq!(manifest.flag.web, "W");
    }

    #[test]
    fn test_missing_nodes_means_empty_list() {
        let file = write_temp(".yml", "flag:\n  zip: a\n  web: b\n  curl: c\n");
        let manifest = Manifest::load(file.path()).unwrap();
        assert!(manifest.nodes.is_empty());
    }

    #[test]
    fn test_missing_flag_is_error() {
        let file = write_temp(".yaml", "rpi: []\n");
        assert!(matches!(
            Manifest::load(file.path()),
            Err(ManifestError::Yaml { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = Manifest::load(Path::new("/no/such/manifest.yaml"));
        assert!(matches!(result, Err(ManifestError::NotFound(_))));
    }

    #[test]
    fn test_bad_address_kept_verbatim() {
        let file = write_temp(
            ".yaml",
            "rpi: ['10.0.0.1:8080', 'ftp://nope']\nflag:\n  zip: a\n  web: b\n  curl: c\n",
        );
        let manifest = Manifest::load(file.path()).unwrap();
        assert_eq!(manifest.nodes, vec!["10.0.0.1:8080", "ftp://nope"]);
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(ManifestFormat::from_path(Path::new("m.YML")), ManifestFormat::Yaml);
        assert_eq!(ManifestFormat::from_path(Path::new("m.toml")), ManifestFormat::Toml);
        assert_eq!(ManifestFormat::from_path(Path::new("manifest")), ManifestFormat::Toml);
    }
}
