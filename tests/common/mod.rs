#![allow(dead_code)]

use async_trait::async_trait;
use promptfs::config::Config;
use promptfs::error::Result;
use promptfs::store::{ByteStream, Entry, FileStore};
use promptfs::to_static;
use rand::{distributions::Alphanumeric, Rng};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// A live server over the local disk, patterns only. Returns (url, scratch dir).
/// The scratch dir doubles as the static directory.
pub async fn spawn_server() -> (String, TempDir) {
    let dir = TempDir::new().unwrap();
    let url = spawn_server_with(dir.path().to_path_buf()).await;
    (url, dir)
}

/// A live server serving pages from `static_dir`.
pub async fn spawn_server_with(static_dir: PathBuf) -> String {
    let config: &'static Config = to_static!(Config {
        http_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        static_dir,
        model: None,
    });
    let api = promptfs::assemble(config).unwrap();
    let listener = TcpListener::bind(config.http_addr).await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(api.serve_on(listener));
    url
}

/// Absolute path under the scratch dir, as a string.
pub fn at(dir: &TempDir, rel: &str) -> String {
    dir.path().join(rel).to_string_lossy().into_owned()
}

/// Generate a random String with length n.
pub fn random_string(n: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(n)
        .map(char::from)
        .collect()
}

/// Records every call and succeeds without touching the disk.
#[derive(Default)]
pub struct RecordingStore {
    pub calls: Mutex<Vec<String>>,
}

impl RecordingStore {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl FileStore for RecordingStore {
    fn drives(&self) -> Vec<String> {
        vec!["/".to_string()]
    }
    async fn list(&self, path: &str) -> Result<Vec<Entry>> {
        self.record(format!("list({})", path));
        Ok(vec![])
    }
    async fn read(&self, path: &str) -> Result<String> {
        self.record(format!("read({})", path));
        Ok(String::new())
    }
    async fn write(&self, path: &str, content: &str) -> Result<String> {
        self.record(format!("write({}, {})", path, content));
        Ok(path.to_string())
    }
    async fn append(&self, path: &str, content: &str) -> Result<String> {
        self.record(format!("append({}, {})", path, content));
        Ok(path.to_string())
    }
    async fn create_file(&self, path: &str) -> Result<String> {
        self.record(format!("create_file({})", path));
        Ok(path.to_string())
    }
    async fn create_folder(&self, path: &str) -> Result<String> {
        self.record(format!("create_folder({})", path));
        Ok(path.to_string())
    }
    async fn delete(&self, path: &str) -> Result<String> {
        self.record(format!("delete({})", path));
        Ok(path.to_string())
    }
    async fn rename(&self, old: &str, new: &str) -> Result<(String, String)> {
        self.record(format!("rename({}, {})", old, new));
        Ok((old.to_string(), new.to_string()))
    }
    async fn save_upload(&self, path: &str, _raw: ByteStream) -> Result<(String, u64)> {
        self.record(format!("save_upload({})", path));
        Ok((path.to_string(), 0))
    }
    async fn open(&self, path: &str) -> Result<(String, ByteStream)> {
        self.record(format!("open({})", path));
        Ok((path.to_string(), Box::pin(tokio_stream::empty())))
    }
}
