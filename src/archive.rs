//! Password-protected zip archive generation
//!
//! Each node keeps exactly one archive holding its zip shard as a single
//! deflated entry encrypted with WinZip AES-256. The archive is first
//! written to a temporary file next to the destination and only renamed
//! over the destination once it is complete and synced, so readers of the
//! fixed path see either the previous archive or the new one.

use std::fs;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{AesMode, CompressionMethod, ZipWriter};

/// Default archive file name
pub const DEFAULT_ARCHIVE_NAME: &str = "flag.zip";

/// Default name of the single entry inside the archive
pub const DEFAULT_ENTRY_NAME: &str = "flag.txt";

// ============================================================================
// Errors
// ============================================================================

/// Errors raised while producing an archive
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// Destination directory could not be created
    #[error("failed to create archive directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic I/O failure while writing
    #[error("archive I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Zip encoding failure
    #[error("zip encoding error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Finished archive could not be moved into place
    #[error("failed to move archive into {path}: {source}")]
    Persist {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Destination path has no file name or parent directory
    #[error("invalid archive destination: {0}")]
    InvalidDestination(String),

    /// Password is not usable as an AES zip password
    #[error("archive password must not be empty")]
    EmptyPassword,

    /// The blocking build task panicked or was cancelled
    #[error("archive task failed: {0}")]
    Task(String),
}

// ============================================================================
// Encoding
// ============================================================================

/// Write a single-entry AES-256 encrypted, deflated zip into `writer`.
///
/// Returns the writer after the central directory has been written.
pub fn write_archive<W: Write + Seek>(
    writer: W,
    entry_name: &str,
    content: &[u8],
    password: &str,
) -> Result<W, ArchiveError> {
    if password.is_empty() {
        return Err(ArchiveError::EmptyPassword);
    }

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .with_aes_encryption(AesMode::Aes256, password);

    let mut zip = ZipWriter::new(writer);
    zip.start_file(entry_name, options)?;
    zip.write_all(content)?;
    Ok(zip.finish()?)
}

// ============================================================================
// Archive Builder
// ============================================================================

/// Builds the node's archive at a fixed destination path
#[derive(Debug)]
pub struct ArchiveBuilder {
    /// Final location of the archive
    destination: PathBuf,

    /// Name of the single entry
    entry_name: String,

    /// Serialises builds targeting `destination`
    write_lock: Mutex<()>,
}

impl ArchiveBuilder {
    /// Create a builder writing to `destination` with the default entry name
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self::with_entry_name(destination, DEFAULT_ENTRY_NAME)
    }

    /// Create a builder with a custom entry name
    pub fn with_entry_name(destination: impl Into<PathBuf>, entry_name: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            entry_name: entry_name.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Archive destination
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Build the archive, replacing any previous one.
    ///
    /// This performs blocking file I/O; async callers should go through
    /// `tokio::task::spawn_blocking`.
    ///
    /// # Errors
    ///
    /// On any failure nothing is left at the destination besides the
    /// previous archive (if there was one); the temporary file is removed.
    pub fn build(&self, content: &[u8], password: &str) -> Result<PathBuf, ArchiveError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let dir = self.parent_dir()?;
        fs::create_dir_all(&dir).map_err(|source| ArchiveError::CreateDir {
            path: dir.display().to_string(),
            source,
        })?;

        // Dropping `temp` on an early return deletes the partial file
        let mut temp = NamedTempFile::new_in(&dir)?;
        write_archive(temp.as_file_mut(), &self.entry_name, content, password)?;
        temp.as_file().sync_all()?;

        temp.persist(&self.destination).map_err(|e| {
            tracing::error!(
                path = %self.destination.display(),
                error = %e.error,
                "Failed to move archive into place"
            );
            // PersistError hands the temp file back; dropping it removes it
            ArchiveError::Persist {
                path: self.destination.display().to_string(),
                source: e.error,
            }
        })?;

        tracing::info!(
            path = %self.destination.display(),
            entry = %self.entry_name,
            content_len = content.len(),
            "Archive written"
        );
        Ok(self.destination.clone())
    }

    fn parent_dir(&self) -> Result<PathBuf, ArchiveError> {
        if self.destination.file_name().is_none() {
            return Err(ArchiveError::InvalidDestination(
                self.destination.display().to_string(),
            ));
        }
        match self.destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => Ok(parent.to_path_buf()),
            _ => Ok(PathBuf::from(".")),
        }
    }
}
