use async_trait::async_trait;
use promptfs::error::Error;
use promptfs::interpret::{Dispatch, Mode, ModelInterpreter, Outcome, PatternInterpreter};
use promptfs::llm::{LlmClient, LlmError, LlmRequest};
use promptfs::store::{FileStore, LocalStore};
use promptfs::to_static;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

mod common;
use common::{at, RecordingStore};

/// Answers with a fixed text and counts the calls.
struct Canned {
    text: &'static str,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl LlmClient for Canned {
    async fn complete(&self, _: LlmRequest) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.to_string())
    }
}

struct Offline;

#[async_trait]
impl LlmClient for Offline {
    async fn complete(&self, _: LlmRequest) -> Result<String, LlmError> {
        Err(LlmError::Http("connection refused".to_string()))
    }
}

fn model(client: impl LlmClient + 'static) -> Option<ModelInterpreter> {
    Some(ModelInterpreter::new(
        Box::new(client),
        "gemini-pro",
        Duration::from_secs(5),
    ))
}

/// A model answer deleting `path`, leaked to fit `Canned`.
fn delete_reply(path: &str) -> &'static str {
    let escaped = path.replace('\\', "\\\\");
    Box::leak(format!(r#"{{"action":"delete","path":"{}"}}"#, escaped).into_boxed_str())
}

fn dispatch(store: &'static dyn FileStore, model: Option<ModelInterpreter>) -> Dispatch {
    Dispatch::new(store, PatternInterpreter::new().unwrap(), model)
}

#[tokio::test]
async fn scenario_a_create_file() {
    let store: &'static RecordingStore = to_static!(RecordingStore::default());
    let d = dispatch(store, None);
    assert_eq!(d.mode(), Mode::PatternOnly);
    let outcome = d
        .handle("create file /tmp/a.txt with content: hello world")
        .await;
    assert_eq!(store.calls(), vec!["write(/tmp/a.txt, hello world)"]);
    match outcome {
        Outcome::Done(report) => assert_eq!(report.message, "Created file /tmp/a.txt"),
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn scenario_b_rename() {
    let store: &'static RecordingStore = to_static!(RecordingStore::default());
    let outcome = dispatch(store, None)
        .handle("rename /tmp/a.txt to /tmp/b.txt")
        .await;
    assert_eq!(store.calls(), vec!["rename(/tmp/a.txt, /tmp/b.txt)"]);
    match outcome {
        Outcome::Done(report) => {
            assert!(report.message.contains("/tmp/a.txt"));
            assert!(report.message.contains("/tmp/b.txt"));
            assert_eq!(report.from.as_deref(), Some("/tmp/a.txt"));
            assert_eq!(report.to.as_deref(), Some("/tmp/b.txt"));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn scenario_c_vague_text_is_a_parse_failure() {
    let store: &'static RecordingStore = to_static!(RecordingStore::default());
    let outcome = dispatch(store, None).handle("do something vague").await;
    assert_eq!(
        outcome,
        Outcome::Failed {
            error: Error::ParseFailure.to_string()
        }
    );
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn scenario_d_offline_model_falls_back() {
    let store: &'static RecordingStore = to_static!(RecordingStore::default());
    let d = dispatch(store, model(Offline));
    assert_eq!(d.mode(), Mode::ModelFirst);
    let outcome = d
        .handle("create file /tmp/a.txt with content: hello world")
        .await;
    assert!(!outcome.is_error());
    assert_eq!(store.calls(), vec!["write(/tmp/a.txt, hello world)"]);
}

#[tokio::test]
async fn scenario_e_unknown_action_falls_back_to_parse_failure() {
    let store: &'static RecordingStore = to_static!(RecordingStore::default());
    let calls = Arc::new(AtomicUsize::new(0));
    let canned = Canned {
        text: r#"{"action":"teleport_file","path":"/tmp/a.txt"}"#,
        calls: calls.clone(),
    };
    let outcome = dispatch(store, model(canned))
        .handle("beam my notes somewhere nice")
        .await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        outcome,
        Outcome::Failed {
            error: Error::ParseFailure.to_string()
        }
    );
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn model_success_skips_patterns() {
    let store: &'static RecordingStore = to_static!(RecordingStore::default());
    let canned = Canned {
        text: r#"{"action":"append_file","path":"/tmp/log.txt","content":"from model"}"#,
        calls: Arc::new(AtomicUsize::new(0)),
    };
    // The pattern reading of this text would be a folder.
    let outcome = dispatch(store, model(canned))
        .handle("make folder /tmp/other")
        .await;
    assert_eq!(store.calls(), vec!["append(/tmp/log.txt, from model)"]);
    match outcome {
        Outcome::Done(report) => assert_eq!(report.message, "Appended to /tmp/log.txt"),
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn model_store_error_falls_back_to_patterns() {
    let dir = tempfile::TempDir::new().unwrap();
    let store: &'static LocalStore = to_static!(LocalStore::new());
    let ghost = at(&dir, "ghost.txt");
    let text = delete_reply(&ghost);
    let calls = Arc::new(AtomicUsize::new(0));
    let canned = Canned {
        text,
        calls: calls.clone(),
    };
    // The model misreads the instruction as deleting a missing file.
    let made = at(&dir, "made");
    let outcome = dispatch(store, model(canned))
        .handle(&format!("make folder {}", made))
        .await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    match outcome {
        Outcome::Done(report) => assert_eq!(report.message, format!("Created folder {}", made)),
        other => panic!("unexpected {:?}", other),
    }
    assert!(dir.path().join("made").is_dir());
}

#[tokio::test]
async fn model_store_error_then_pattern_miss_is_a_parse_failure() {
    let dir = tempfile::TempDir::new().unwrap();
    let store: &'static LocalStore = to_static!(LocalStore::new());
    let ghost = at(&dir, "ghost.txt");
    let text = delete_reply(&ghost);
    let canned = Canned {
        text,
        calls: Arc::new(AtomicUsize::new(0)),
    };
    let outcome = dispatch(store, model(canned))
        .handle("get rid of that ghost file")
        .await;
    assert_eq!(
        outcome,
        Outcome::Failed {
            error: Error::ParseFailure.to_string()
        }
    );
}

#[tokio::test]
async fn pattern_store_error_surfaces() {
    let dir = tempfile::TempDir::new().unwrap();
    let store: &'static LocalStore = to_static!(LocalStore::new());
    let outcome = dispatch(store, None)
        .handle(&format!("rename {} to {}", at(&dir, "nope.txt"), at(&dir, "b.txt")))
        .await;
    match outcome {
        Outcome::Failed { error } => assert!(error.starts_with("Not found")),
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn prompts_drive_the_local_disk() {
    let dir = tempfile::TempDir::new().unwrap();
    let store: &'static LocalStore = to_static!(LocalStore::new());
    let d = dispatch(store, None);
    let file = at(&dir, "notes/today.txt");
    let folder = at(&dir, "archive");

    assert!(!d
        .handle(&format!("create file {} with content: first", file))
        .await
        .is_error());
    assert!(!d
        .handle(&format!("append to file {} with: \nsecond", file))
        .await
        .is_error());
    assert_eq!(store.read(&file).await.unwrap(), "firstsecond");

    assert!(!d
        .handle(&format!("write {} with content: replaced", file))
        .await
        .is_error());
    assert_eq!(store.read(&file).await.unwrap(), "replaced");

    // Twice: the folder already existing is fine.
    for _ in 0..2 {
        assert!(!d
            .handle(&format!("make a folder {}", folder))
            .await
            .is_error());
    }

    let moved = at(&dir, "archive/today.txt");
    assert!(!d
        .handle(&format!("rename {} to {}", file, moved))
        .await
        .is_error());
    assert_eq!(store.read(&moved).await.unwrap(), "replaced");

    assert!(!d
        .handle(&format!("delete file {}", folder))
        .await
        .is_error());
    assert!(store.list(&at(&dir, "")).await.unwrap().iter().all(|e| e.name != "archive"));
}
