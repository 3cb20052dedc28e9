use super::{field, Client, Result};
use crate::handle_error;
use reqwest::Body;
use serde_json::{json, Value};
use std::io::{Read, Write};
use std::process::exit;
use tokio_util::io::ReaderStream;

impl Client {
    pub async fn drives(&self) -> Result<String> {
        let response = self.get("drives").send().await?;
        handle_error!(response);
        let v: Value = response.json().await?;
        let drives: Vec<String> = serde_json::from_value(v["drives"].clone())?;
        Ok(drives.join("\n"))
    }

    /// Directories get a trailing slash, files their size.
    pub async fn ls(&self, path: String) -> Result<String> {
        let response = self.get("browse").query(&[("path", path)]).send().await?;
        handle_error!(response);
        let v: Value = response.json().await?;
        let lines: Vec<String> = v["items"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .map(|item| match item["is_dir"].as_bool() {
                        Some(true) => format!("{}/", field(item, "name")),
                        _ => format!("{}\t{}", field(item, "name"), field(item, "size")),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(lines.join("\n"))
    }

    pub async fn cat(&self, path: String) -> Result<String> {
        let response = self.get("read").query(&[("path", path)]).send().await?;
        handle_error!(response);
        let v: Value = response.json().await?;
        Ok(field(&v, "content"))
    }

    /// Save the content of FILE, or stdin, to PATH.
    pub async fn save(&self, path: String, file: Option<String>) -> Result<String> {
        let content = match file {
            Some(file) => std::fs::read_to_string(file)?,
            None => {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            }
        };
        let response = self
            .post("save")
            .json(&json!({ "path": path, "content": content }))
            .send()
            .await?;
        handle_error!(response);
        let v: Value = response.json().await?;
        Ok(format!("Saved {}", field(&v, "path")))
    }

    pub async fn touch(&self, path: String) -> Result<String> {
        let response = self.post("create").form(&[("path", path)]).send().await?;
        handle_error!(response);
        let v: Value = response.json().await?;
        Ok(format!("Created file {}", field(&v, "path")))
    }

    pub async fn mkdir(&self, path: String) -> Result<String> {
        let response = self.post("mkdir").form(&[("path", path)]).send().await?;
        handle_error!(response);
        let v: Value = response.json().await?;
        Ok(format!("Created folder {}", field(&v, "path")))
    }

    pub async fn rm(&self, path: String) -> Result<String> {
        let response = self.delete("delete").query(&[("path", path)]).send().await?;
        handle_error!(response);
        let v: Value = response.json().await?;
        Ok(format!("Deleted {}", field(&v, "path")))
    }

    pub async fn mv(&self, old: String, new: String) -> Result<String> {
        let response = self
            .post("rename")
            .form(&[("old", old), ("new", new)])
            .send()
            .await?;
        handle_error!(response);
        let v: Value = response.json().await?;
        Ok(format!("Renamed {} -> {}", field(&v, "from"), field(&v, "to")))
    }

    /// The file is streamed, never held in memory whole.
    pub async fn upload(&self, file: String, path: String) -> Result<String> {
        let file = tokio::fs::File::open(file).await?;
        let response = self
            .post("upload")
            .query(&[("path", path)])
            .body(Body::wrap_stream(ReaderStream::new(file)))
            .send()
            .await?;
        handle_error!(response);
        let v: Value = response.json().await?;
        Ok(format!(
            "Uploaded {} bytes to {}",
            field(&v, "size"),
            field(&v, "path")
        ))
    }

    /// Download PATH to FILE, or to stdout.
    pub async fn download(&self, path: String, file: Option<String>) -> Result<String> {
        let response = self.get("download").query(&[("path", path)]).send().await?;
        handle_error!(response);
        let raw = response.bytes().await?;
        match file {
            Some(file) => {
                tokio::fs::write(&file, &raw).await?;
                Ok(format!("Downloaded {} bytes to {}", raw.len(), file))
            }
            None => {
                std::io::stdout().write_all(&raw)?;
                exit(0);
            }
        }
    }

    /// A failed instruction still comes back as 200, with an error field.
    pub async fn prompt(&self, words: Vec<String>) -> Result<String> {
        let response = self
            .post("prompt")
            .json(&json!({ "prompt": words.join(" ") }))
            .send()
            .await?;
        handle_error!(response);
        let v: Value = response.json().await?;
        if let Some(e) = v["error"].as_str() {
            eprintln!("{}", e);
            exit(1);
        }
        Ok(field(&v, "message"))
    }
}
