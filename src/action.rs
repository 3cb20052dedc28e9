//! Action descriptors.
//!
//! Both interpreters produce an [`Action`]; applying it is one File Store call.

use crate::error::Result;
use crate::store::FileStore;
use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumString};

/// Action names as the model is told to spell them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ActionKind {
    CreateFile,
    WriteFile,
    AppendFile,
    Delete,
    #[strum(serialize = "mkdir")]
    CreateFolder,
    Rename,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    CreateFile { path: String, content: String },
    /// Overwrites.
    WriteFile { path: String, content: String },
    AppendFile { path: String, content: String },
    Delete { path: String },
    CreateFolder { path: String },
    Rename { old_path: String, new_path: String },
}

/// Success half of an outcome: a message plus the paths involved.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Report {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

impl Report {
    fn on(message: String, path: &str) -> Report {
        Report {
            message,
            path: Some(path.to_string()),
            from: None,
            to: None,
        }
    }
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::CreateFile { .. } => ActionKind::CreateFile,
            Action::WriteFile { .. } => ActionKind::WriteFile,
            Action::AppendFile { .. } => ActionKind::AppendFile,
            Action::Delete { .. } => ActionKind::Delete,
            Action::CreateFolder { .. } => ActionKind::CreateFolder,
            Action::Rename { .. } => ActionKind::Rename,
        }
    }

    /// Exactly one store call. Store errors pass through untouched.
    pub async fn apply(&self, store: &dyn FileStore) -> Result<Report> {
        match self {
            // Creating with content is a write; the store makes the parents.
            Action::CreateFile { path, content } => {
                store.write(path, content).await?;
                Ok(Report::on(format!("Created file {}", path), path))
            }
            Action::WriteFile { path, content } => {
                store.write(path, content).await?;
                Ok(Report::on(format!("Wrote file {}", path), path))
            }
            Action::AppendFile { path, content } => {
                store.append(path, content).await?;
                Ok(Report::on(format!("Appended to {}", path), path))
            }
            Action::Delete { path } => {
                store.delete(path).await?;
                Ok(Report::on(format!("Deleted {}", path), path))
            }
            Action::CreateFolder { path } => {
                store.create_folder(path).await?;
                Ok(Report::on(format!("Created folder {}", path), path))
            }
            Action::Rename { old_path, new_path } => {
                store.rename(old_path, new_path).await?;
                Ok(Report {
                    message: format!("Renamed {} -> {}", old_path, new_path),
                    path: None,
                    from: Some(old_path.clone()),
                    to: Some(new_path.clone()),
                })
            }
        }
    }
}

/// Strip surrounding quotes and whitespace from a path taken out of text.
pub fn clean_path(raw: &str) -> &str {
    raw.trim_matches(|c: char| c.is_whitespace() || c == '\'' || c == '"')
}
