//! The handler layer turns queries into replies.
//! CRUD goes straight to the store, prompts go through the dispatcher.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::interpret::Dispatch;
use crate::message::{Query, Reply};
use crate::store::FileStore;
use std::path::{Component, Path, PathBuf};

pub struct Handler {
    store: &'static dyn FileStore,
    dispatch: &'static Dispatch,
    static_dir: PathBuf,
}

impl Handler {
    pub fn new(
        config: &Config,
        store: &'static dyn FileStore,
        dispatch: &'static Dispatch,
    ) -> Handler {
        Handler {
            store,
            dispatch,
            static_dir: config.static_dir.clone(),
        }
    }

    pub async fn handle(&self, query: Query) -> Result<Reply> {
        let store = self.store;
        match query {
            Query::Ping => Ok(Reply::Pong),
            Query::Static { file } => self.page(&file).await,
            Query::Drives => Ok(Reply::Drives {
                drives: store.drives(),
            }),
            Query::Browse { path } => Ok(Reply::Items {
                items: store.list(&path).await?,
            }),
            Query::Read { path } => Ok(Reply::Content {
                content: store.read(&path).await?,
            }),
            Query::Save { path, content } => Ok(Reply::Status {
                status: "ok",
                path: store.write(&path, &content).await?,
            }),
            Query::Create { path } => Ok(Reply::Status {
                status: "created",
                path: store.create_file(&path).await?,
            }),
            Query::Mkdir { path } => Ok(Reply::Status {
                status: "created_folder",
                path: store.create_folder(&path).await?,
            }),
            Query::Delete { path } => Ok(Reply::Status {
                status: "deleted",
                path: store.delete(&path).await?,
            }),
            Query::Rename { old, new } => {
                let (from, to) = store.rename(&old, &new).await?;
                Ok(Reply::Renamed { from, to })
            }
            Query::Upload { path, raw } => {
                let (path, size) = store.save_upload(&path, raw).await?;
                Ok(Reply::Uploaded { path, size })
            }
            Query::Download { path } => {
                let (name, raw) = store.open(&path).await?;
                Ok(Reply::Download { name, raw })
            }
            Query::Prompt { prompt } => Ok(Reply::Prompt {
                outcome: self.dispatch.handle(&prompt).await,
            }),
        }
    }

    /// A file under the static directory, never above it.
    async fn page(&self, file: &str) -> Result<Reply> {
        let rel = Path::new(file);
        if file.is_empty() || !rel.components().all(|c| matches!(c, Component::Normal(_))) {
            return Err(Error::ApiBadPath(file.to_string()));
        }
        let full = self.static_dir.join(rel);
        let raw = tokio::fs::read(&full)
            .await
            .map_err(|e| Error::from_io(e, file))?;
        let mime = mime_guess::from_path(&full)
            .first_or_octet_stream()
            .to_string();
        Ok(Reply::Page { mime, raw })
    }
}
