//! File Store
//!
//! Primitive filesystem operations on absolute, user-expanded paths.
//! No sandbox: every path the process can reach is fair game.
//! No locking either. Concurrent writers race and the last one wins.

use crate::error::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use std::pin::Pin;
use std::{env, io};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_stream::{Stream, StreamExt};
use tokio_util::io::ReaderStream;
use tracing::debug;

/// Raw bytes flowing in (upload) or out (download).
pub type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Entry {
    pub name: String,
    pub path: String,
    pub is_dir: bool,
    /// None for directories.
    pub size: Option<u64>,
}

/// Every operation resolves its path with [`norm_path`] and reports the
/// resolved path back.
#[async_trait]
pub trait FileStore: Send + Sync {
    fn drives(&self) -> Vec<String>;
    async fn list(&self, path: &str) -> Result<Vec<Entry>>;
    async fn read(&self, path: &str) -> Result<String>;
    async fn write(&self, path: &str, content: &str) -> Result<String>;
    async fn append(&self, path: &str, content: &str) -> Result<String>;
    async fn create_file(&self, path: &str) -> Result<String>;
    async fn create_folder(&self, path: &str) -> Result<String>;
    async fn delete(&self, path: &str) -> Result<String>;
    async fn rename(&self, old: &str, new: &str) -> Result<(String, String)>;
    /// Returns the resolved path and the number of bytes written.
    async fn save_upload(&self, path: &str, raw: ByteStream) -> Result<(String, u64)>;
    /// Returns the file name and its content as a stream.
    async fn open(&self, path: &str) -> Result<(String, ByteStream)>;
}

/// The local disk.
#[derive(Default)]
pub struct LocalStore;

impl LocalStore {
    pub fn new() -> LocalStore {
        LocalStore
    }
}

#[async_trait]
impl FileStore for LocalStore {
    fn drives(&self) -> Vec<String> {
        if cfg!(windows) {
            ('A'..='Z')
                .map(|letter| format!("{}:\\", letter))
                .filter(|d| Path::new(d).exists())
                .collect()
        } else {
            vec!["/".to_string()]
        }
    }

    async fn list(&self, path: &str) -> Result<Vec<Entry>> {
        let (p, shown) = resolve(path);
        let meta = fs::metadata(&p).await.map_err(|e| Error::from_io(e, &shown))?;
        if !meta.is_dir() {
            return Err(Error::IoFailure {
                path: shown,
                reason: "not a directory".to_string(),
            });
        }
        let mut items = Vec::new();
        let mut dir = fs::read_dir(&p).await.map_err(|e| Error::from_io(e, &shown))?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| Error::from_io(e, &shown))?
        {
            // Follows symlinks, a dangling one shows up as an empty file.
            let is_dir = fs::metadata(entry.path())
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false);
            let size = match is_dir {
                true => None,
                false => Some(entry.metadata().await.map(|m| m.len()).unwrap_or(0)),
            };
            items.push(Entry {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: entry.path().to_string_lossy().into_owned(),
                is_dir,
                size,
            });
        }
        sort_entries(&mut items);
        Ok(items)
    }

    async fn read(&self, path: &str) -> Result<String> {
        let (p, shown) = resolve(path);
        let meta = fs::metadata(&p).await.map_err(|e| Error::from_io(e, &shown))?;
        if meta.is_dir() {
            return Err(Error::IsDirectory(shown));
        }
        let raw = fs::read(&p).await.map_err(|e| Error::from_io(e, &shown))?;
        Ok(String::from_utf8_lossy(&raw).into_owned())
    }

    async fn write(&self, path: &str, content: &str) -> Result<String> {
        let (p, shown) = resolve(path);
        make_parent(&p, &shown).await?;
        fs::write(&p, content)
            .await
            .map_err(|e| Error::from_io(e, &shown))?;
        debug!(path = %shown, bytes = content.len(), "wrote file");
        Ok(shown)
    }

    async fn append(&self, path: &str, content: &str) -> Result<String> {
        let (p, shown) = resolve(path);
        make_parent(&p, &shown).await?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&p)
            .await
            .map_err(|e| Error::from_io(e, &shown))?;
        file.write_all(content.as_bytes())
            .await
            .map_err(|e| Error::from_io(e, &shown))?;
        file.flush().await.map_err(|e| Error::from_io(e, &shown))?;
        debug!(path = %shown, bytes = content.len(), "appended to file");
        Ok(shown)
    }

    async fn create_file(&self, path: &str) -> Result<String> {
        let (p, shown) = resolve(path);
        make_parent(&p, &shown).await?;
        // Append mode keeps whatever is already there.
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&p)
            .await
            .map_err(|e| Error::from_io(e, &shown))?;
        Ok(shown)
    }

    async fn create_folder(&self, path: &str) -> Result<String> {
        let (p, shown) = resolve(path);
        fs::create_dir_all(&p)
            .await
            .map_err(|e| Error::from_io(e, &shown))?;
        Ok(shown)
    }

    async fn delete(&self, path: &str) -> Result<String> {
        let (p, shown) = resolve(path);
        let meta = fs::symlink_metadata(&p)
            .await
            .map_err(|e| Error::from_io(e, &shown))?;
        let removed = if meta.is_dir() {
            let mut dir = fs::read_dir(&p).await.map_err(|e| Error::from_io(e, &shown))?;
            let empty = dir
                .next_entry()
                .await
                .map_err(|e| Error::from_io(e, &shown))?
                .is_none();
            if empty {
                fs::remove_dir(&p).await
            } else {
                fs::remove_dir_all(&p).await
            }
        } else {
            fs::remove_file(&p).await
        };
        removed.map_err(|e| Error::from_io(e, &shown))?;
        debug!(path = %shown, "deleted");
        Ok(shown)
    }

    async fn rename(&self, old: &str, new: &str) -> Result<(String, String)> {
        let (from, from_shown) = resolve(old);
        let (to, to_shown) = resolve(new);
        make_parent(&to, &to_shown).await?;
        fs::rename(&from, &to)
            .await
            .map_err(|e| Error::from_io(e, &from_shown))?;
        debug!(from = %from_shown, to = %to_shown, "renamed");
        Ok((from_shown, to_shown))
    }

    async fn save_upload(&self, path: &str, mut raw: ByteStream) -> Result<(String, u64)> {
        let (p, shown) = resolve(path);
        make_parent(&p, &shown).await?;
        let mut file = fs::File::create(&p)
            .await
            .map_err(|e| Error::from_io(e, &shown))?;
        let mut size = 0_u64;
        while let Some(chunk) = raw.next().await {
            let chunk = chunk.map_err(|e| Error::from_io(e, &shown))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| Error::from_io(e, &shown))?;
            size += chunk.len() as u64;
        }
        file.flush().await.map_err(|e| Error::from_io(e, &shown))?;
        debug!(path = %shown, size, "saved upload");
        Ok((shown, size))
    }

    async fn open(&self, path: &str) -> Result<(String, ByteStream)> {
        let (p, shown) = resolve(path);
        let meta = fs::metadata(&p).await.map_err(|e| Error::from_io(e, &shown))?;
        if meta.is_dir() {
            return Err(Error::IsDirectory(shown));
        }
        let file = fs::File::open(&p)
            .await
            .map_err(|e| Error::from_io(e, &shown))?;
        let name = p
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "download".to_string());
        Ok((name, Box::pin(ReaderStream::new(file))))
    }
}

/// Directories first, then case-insensitive name order.
pub fn sort_entries(items: &mut [Entry]) {
    items.sort_by(|a, b| {
        b.is_dir
            .cmp(&a.is_dir)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
}

/// Expand `~`, make absolute against the working directory, collapse `.` and `..`.
pub fn norm_path(path: &str) -> PathBuf {
    let expanded = expand_home(path);
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        env::current_dir().unwrap_or_default().join(expanded)
    };
    collapse(&absolute)
}

fn resolve(path: &str) -> (PathBuf, String) {
    let p = norm_path(path);
    let shown = p.to_string_lossy().into_owned();
    (p, shown)
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

fn expand_home(path: &str) -> PathBuf {
    let rest = if path == "~" {
        Some("")
    } else {
        path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\"))
    };
    match (rest, home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

fn collapse(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

async fn make_parent(p: &Path, shown: &str) -> Result<()> {
    match p.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::from_io(e, shown)),
        _ => Ok(()),
    }
}
