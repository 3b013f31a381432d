//! Node-side ingestion and exposure logic, independent of HTTP

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::archive::{ArchiveBuilder, ArchiveError};
use crate::config::{FieldLimits, NodeConfig};
use crate::error::{Error, Result};
use crate::secret::{LoadOptions, SecretSelector, Wordlist};
use crate::store::{ConfigStore, FlagShards};

use super::expose::{ClientKind, Exposure, PageRenderer};
use super::ingest::IngestRequest;

/// Everything a node needs to ingest shards and serve them back
pub struct NodeService {
    store: Arc<ConfigStore>,
    selector: SecretSelector,
    archive: Arc<ArchiveBuilder>,
    renderer: PageRenderer,
    limits: FieldLimits,

    /// Held across archive build and store update
    ingest_lock: Arc<Mutex<()>>,
}

impl NodeService {
    /// Assemble a service from its parts
    pub fn new(
        store: Arc<ConfigStore>,
        selector: SecretSelector,
        archive: ArchiveBuilder,
        limits: FieldLimits,
    ) -> Result<Self> {
        Ok(Self {
            store,
            selector,
            archive: Arc::new(archive),
            renderer: PageRenderer::new()?,
            limits,
            ingest_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Build a service from node configuration, loading the wordlist
    pub fn from_config(config: &NodeConfig) -> Result<Self> {
        let wordlist = Wordlist::load_or_fallback(
            &config.wordlist_path,
            LoadOptions {
                ascii_only: config.ascii_only_wordlist,
            },
        )?;
        let archive = ArchiveBuilder::with_entry_name(config.archive_path(), &config.entry_name);

        Self::new(
            Arc::new(ConfigStore::new()),
            SecretSelector::new(wordlist),
            archive,
            config.limits,
        )
    }

    /// Shared shard store
    pub fn store(&self) -> &Arc<ConfigStore> {
        &self.store
    }

    /// Archive builder in use
    pub fn archive(&self) -> &ArchiveBuilder {
        &self.archive
    }

    /// Number of password candidates
    pub fn wordlist_size(&self) -> usize {
        self.selector.wordlist().len()
    }

    /// Accept a new shard triple.
    ///
    /// Validates and trims the payload, seals the zip shard into a fresh
    /// archive under a randomly chosen password and, only if that worked,
    /// publishes the three shards. Returns the password.
    ///
    /// Archive build and publication run in a spawned task and complete even
    /// if the returned future is dropped.
    pub async fn ingest(&self, request: IngestRequest) -> Result<String> {
        let shards = request.validate(&self.limits)?;
        let password = self.selector.choose()?;

        let lock = Arc::clone(&self.ingest_lock);
        let store = Arc::clone(&self.store);
        let archive = Arc::clone(&self.archive);
        let build_password = password.clone();

        let update = tokio::spawn(async move {
            let _guard = lock.lock_owned().await;

            let content = shards.zip.clone().into_bytes();
            tokio::task::spawn_blocking(move || archive.build(&content, &build_password))
                .await
                .map_err(|e| ArchiveError::Task(e.to_string()))??;

            tracing::info!(
                zip_len = shards.zip.chars().count(),
                web_set = !shards.web.is_empty(),
                curl_set = !shards.curl.is_empty(),
                "Shards ingested"
            );
            store.write(shards).await;
            Ok::<(), Error>(())
        });

        update
            .await
            .map_err(|e| ArchiveError::Task(e.to_string()))??;

        Ok(password)
    }

    /// Render the current shards for a client
    pub async fn expose(&self, user_agent: Option<&str>) -> Result<Exposure> {
        let kind = ClientKind::from_user_agent(user_agent);
        let shards: Arc<FlagShards> = self.store.read().await;
        self.renderer.expose(kind, &shards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    fn service(dir: &TempDir, words: &[&str]) -> NodeService {
        let wordlist = Wordlist::new(words.iter().map(|w| w.to_string()).collect()).unwrap();
        NodeService::new(
            Arc::new(ConfigStore::new()),
            SecretSelector::new(wordlist),
            ArchiveBuilder::new(dir.path().join("secret").join("flag.zip")),
            FieldLimits::default(),
        )
        .unwrap()
    }

    fn request(zip: &str, web: &str, curl: &str) -> IngestRequest {
        IngestRequest {
            zip: zip.to_string(),
            web: web.to_string(),
            curl: curl.to_string(),
        }
    }

    #[tokio::test]
    async fn test_ingest_builds_archive_and_updates_store() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, &["letmein"]);

        let password = service.ingest(request(" zz ", "ww", "cc")).await.unwrap();
        assert_eq!(password, "letmein");

        let current = service.store().read().await;
        assert_eq!(current.zip, "zz");
        assert_eq!(current.web, "ww");
        assert_eq!(current.curl, "cc");

        let file = std::fs::File::open(service.archive().destination()).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        let mut entry = archive.by_name_decrypt("flag.txt", b"letmein").unwrap();
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        assert_eq!(content, "zz");
    }

    #[tokio::test]
    async fn test_invalid_payload_leaves_state_untouched() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, &["pw"]);

        let err = service.ingest(request("", "w", "c")).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(service.store().read().await.web, "None");
        assert!(!service.archive().destination().exists());
    }

    #[tokio::test]
    async fn test_archive_failure_leaves_store_untouched() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("secret"), b"blocks the directory").unwrap();
        let service = service(&dir, &["pw"]);

        let err = service.ingest(request("z", "w", "c")).await.unwrap_err();
        assert!(matches!(err, Error::Archive(_)));

        let current = service.store().read().await;
        assert_eq!(*current, FlagShards::default());
    }

    #[tokio::test]
    async fn test_abandoned_ingestion_still_publishes() {
        let dir = TempDir::new().unwrap();
        let service = Arc::new(service(&dir, &["pw"]));

        // Hold the lock so the update task is parked when the caller goes away
        let guard = service.ingest_lock.clone().lock_owned().await;

        let caller = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.ingest(request("zz", "ww", "cc")).await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        caller.abort();
        assert!(caller.await.unwrap_err().is_cancelled());
        drop(guard);

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while service.store().read().await.curl != "cc" {
            assert!(std::time::Instant::now() < deadline, "store never updated");
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(service.store().read().await.zip, "zz");
        assert!(service.archive().destination().exists());
    }

    #[tokio::test]
    async fn test_expose_defaults_then_latest() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, &["pw"]);

        let before = service.expose(Some("curl/8.0")).await.unwrap();
        assert_eq!(before.body(), "flag: None\n");

        service.ingest(request("z", "web-1", "curl-1")).await.unwrap();
        service.ingest(request("z", "web-2", "curl-2")).await.unwrap();

        let after = service.expose(Some("curl/8.0")).await.unwrap();
        assert_eq!(after.body(), "flag: curl-2\n");

        let html = service.expose(Some("Mozilla/5.0")).await.unwrap();
        assert!(matches!(html, Exposure::Html(_)));
        assert!(html.body().contains("FLAG{web-2}"));
    }
}
