//! Common test utilities

use std::io::Read;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use flagshard::config::NodeConfig;
use flagshard::node::NodeServer;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// A node server running on an ephemeral port
pub struct TestNode {
    pub addr: SocketAddr,
    pub archive_path: PathBuf,
    shutdown: Option<oneshot::Sender<()>>,
    _dir: TempDir,
}

impl TestNode {
    /// Base URL, e.g. `http://127.0.0.1:41234`
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestNode {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Start a node whose wordlist holds exactly `words`
pub async fn spawn_node(words: &[&str]) -> TestNode {
    let dir = TempDir::new().unwrap();
    let wordlist = dir.path().join("rockyou.txt");
    std::fs::write(&wordlist, words.join("\n")).unwrap();

    let config = NodeConfig::builder()
        .bind_address_str("127.0.0.1:0")
        .unwrap()
        .wordlist_path(&wordlist)
        .archive_dir(dir.path().join("secret"))
        .enable_request_logging(false)
        .build()
        .unwrap();
    let archive_path = config.archive_path();

    let server = NodeServer::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        let _ = server
            .serve(listener, async move {
                let _ = rx.await;
            })
            .await;
    });

    TestNode {
        addr,
        archive_path,
        shutdown: Some(tx),
        _dir: dir,
    }
}

/// Decrypt the single `flag.txt` entry of an archive
pub fn read_archive(path: &Path, password: &str) -> String {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    assert_eq!(archive.len(), 1, "archive must hold exactly one entry");

    let mut entry = archive
        .by_name_decrypt("flag.txt", password.as_bytes())
        .unwrap();
    let mut content = String::new();
    entry.read_to_string(&mut content).unwrap();
    content
}
