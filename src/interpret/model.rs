//! Model-backed interpreter
//!
//! The model must answer with exactly one JSON object:
//! `{"action": ..., "path": ..., "content"?: ..., "new_path"?: ...}`.
//! Anything else is an error the dispatcher recovers from.

use crate::action::{clean_path, Action, ActionKind, Report};
use crate::error::{Error, Result};
use crate::llm::{LlmClient, LlmRequest};
use crate::store::FileStore;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

pub const SYSTEM_INSTRUCTION: &str = "You are a file system assistant. \
Parse the user's natural language instruction and return a single JSON object with keys: \
action (one of create_file, write_file, append_file, delete, mkdir, rename), \
path (string), content (optional), new_path (optional). \
Only output valid JSON. Do not add any commentary.";

#[derive(Deserialize, Debug)]
struct Descriptor {
    action: Option<String>,
    path: Option<String>,
    content: Option<String>,
    new_path: Option<String>,
}

pub struct ModelInterpreter {
    client: Box<dyn LlmClient>,
    model: String,
    timeout: Duration,
}

impl ModelInterpreter {
    pub fn new(client: Box<dyn LlmClient>, model: &str, timeout: Duration) -> ModelInterpreter {
        ModelInterpreter {
            client,
            model: model.to_string(),
            timeout,
        }
    }

    /// Ask the model, bounded by the timeout.
    pub async fn parse(&self, instruction: &str) -> Result<Action> {
        let request = LlmRequest {
            system: SYSTEM_INSTRUCTION.to_string(),
            user: instruction.to_string(),
            model: self.model.clone(),
            temperature: 0.0,
        };
        let text = tokio::time::timeout(self.timeout, self.client.complete(request))
            .await
            .map_err(|_| Error::BackendUnavailable(format!("timed out after {:?}", self.timeout)))?
            .map_err(|e| Error::BackendUnavailable(e.to_string()))?;
        debug!(output = %text, "model answered");
        decode(&text)
    }

    pub async fn interpret(&self, instruction: &str, store: &dyn FileStore) -> Result<Report> {
        let action = self.parse(instruction).await?;
        debug!(kind = %action.kind(), ?action, "model action");
        action.apply(store).await
    }
}

/// Strict: the whole text, whitespace aside, must be the JSON object.
pub fn decode(text: &str) -> Result<Action> {
    let d: Descriptor =
        serde_json::from_str(text.trim()).map_err(|e| Error::ModelOutput(e.to_string()))?;
    let name = d.action.ok_or(Error::MissingField("action"))?;
    let kind =
        ActionKind::from_str(name.trim()).map_err(|_| Error::UnrecognizedAction(name.clone()))?;
    let path = required(d.path, "path")?;
    let content = d.content.unwrap_or_default();
    Ok(match kind {
        ActionKind::CreateFile => Action::CreateFile { path, content },
        ActionKind::WriteFile => Action::WriteFile { path, content },
        ActionKind::AppendFile => Action::AppendFile { path, content },
        ActionKind::Delete => Action::Delete { path },
        ActionKind::CreateFolder => Action::CreateFolder { path },
        ActionKind::Rename => Action::Rename {
            old_path: path,
            new_path: required(d.new_path, "new_path")?,
        },
    })
}

fn required(value: Option<String>, field: &'static str) -> Result<String> {
    value
        .as_deref()
        .map(clean_path)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .ok_or(Error::MissingField(field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;
    use async_trait::async_trait;

    struct Canned(&'static str);

    #[async_trait]
    impl LlmClient for Canned {
        async fn complete(&self, request: LlmRequest) -> std::result::Result<String, LlmError> {
            assert_eq!(request.system, SYSTEM_INSTRUCTION);
            Ok(self.0.to_string())
        }
    }

    struct Hung;

    #[async_trait]
    impl LlmClient for Hung {
        async fn complete(&self, _: LlmRequest) -> std::result::Result<String, LlmError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(String::new())
        }
    }

    #[test]
    fn decodes_every_action() {
        assert_eq!(
            decode(r#"{"action":"create_file","path":"/tmp/a.txt","content":"hi"}"#).unwrap(),
            Action::CreateFile {
                path: "/tmp/a.txt".into(),
                content: "hi".into()
            }
        );
        assert_eq!(
            decode(r#" {"action":"write_file","path":"/tmp/a.txt"} "#).unwrap(),
            Action::WriteFile {
                path: "/tmp/a.txt".into(),
                content: "".into()
            }
        );
        assert_eq!(
            decode(r#"{"action":"append_file","path":"/a","content":"x"}"#).unwrap(),
            Action::AppendFile {
                path: "/a".into(),
                content: "x".into()
            }
        );
        assert_eq!(
            decode(r#"{"action":"delete","path":"'/a'"}"#).unwrap(),
            Action::Delete { path: "/a".into() }
        );
        assert_eq!(
            decode(r#"{"action":"mkdir","path":"/d"}"#).unwrap(),
            Action::CreateFolder { path: "/d".into() }
        );
        assert_eq!(
            decode(r#"{"action":"rename","path":"/a","new_path":"/b"}"#).unwrap(),
            Action::Rename {
                old_path: "/a".into(),
                new_path: "/b".into()
            }
        );
    }

    #[test]
    fn rejects_bad_output() {
        assert!(matches!(
            decode("Sure! Here is the JSON: {}"),
            Err(Error::ModelOutput(_))
        ));
        assert!(matches!(
            decode("```json\n{\"action\":\"mkdir\",\"path\":\"/d\"}\n```"),
            Err(Error::ModelOutput(_))
        ));
        assert!(matches!(
            decode(r#"{"action":"teleport_file","path":"/a"}"#),
            Err(Error::UnrecognizedAction(a)) if a == "teleport_file"
        ));
        assert!(matches!(
            decode(r#"{"action":"delete"}"#),
            Err(Error::MissingField("path"))
        ));
        assert!(matches!(
            decode(r#"{"action":"rename","path":"/a"}"#),
            Err(Error::MissingField("new_path"))
        ));
        assert!(matches!(
            decode(r#"{"path":"/a"}"#),
            Err(Error::MissingField("action"))
        ));
    }

    #[tokio::test]
    async fn parse_goes_through_client() {
        let model = ModelInterpreter::new(
            Box::new(Canned(r#"{"action":"mkdir","path":"/tmp/m"}"#)),
            "gemini-pro",
            Duration::from_secs(5),
        );
        assert_eq!(
            model.parse("make me a folder").await.unwrap(),
            Action::CreateFolder {
                path: "/tmp/m".into()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn hung_backend_times_out() {
        let model = ModelInterpreter::new(Box::new(Hung), "gemini-pro", Duration::from_secs(2));
        let err = model.parse("anything").await.unwrap_err();
        assert!(matches!(err, Error::BackendUnavailable(_)));
    }
}
