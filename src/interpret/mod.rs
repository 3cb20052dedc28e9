//! Instruction interpretation.
//!
//! With a model configured the model goes first and the patterns catch
//! whatever it fails on. Without one, the patterns are all there is.
//! Any model error, File Store errors included, hands the instruction to the
//! patterns. The answer is always exactly one interpreter's outcome.

pub mod model;
pub mod pattern;

pub use model::ModelInterpreter;
pub use pattern::PatternInterpreter;

use crate::action::Report;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::llm::GeminiClient;
use crate::store::FileStore;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Outcome {
    Done(Report),
    Failed { error: String },
}

impl Outcome {
    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

impl From<Result<Report>> for Outcome {
    fn from(result: Result<Report>) -> Self {
        match result {
            Ok(report) => Outcome::Done(report),
            Err(error) => Outcome::Failed {
                error: error.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    ModelFirst,
    PatternOnly,
}

pub struct Dispatch {
    store: &'static dyn FileStore,
    pattern: PatternInterpreter,
    model: Option<ModelInterpreter>,
}

impl Dispatch {
    pub fn new(
        store: &'static dyn FileStore,
        pattern: PatternInterpreter,
        model: Option<ModelInterpreter>,
    ) -> Dispatch {
        Dispatch {
            store,
            pattern,
            model,
        }
    }

    /// Gemini when a key is configured, patterns only otherwise.
    pub fn from_config(config: &Config, store: &'static dyn FileStore) -> Result<Dispatch> {
        let pattern = PatternInterpreter::new()?;
        let model = match &config.model {
            Some(m) => {
                let client =
                    GeminiClient::new(m).map_err(|e| Error::BackendUnavailable(e.to_string()))?;
                Some(ModelInterpreter::new(Box::new(client), &m.model, m.timeout))
            }
            None => None,
        };
        let dispatch = Dispatch::new(store, pattern, model);
        info!(mode = ?dispatch.mode(), "interpreter ready");
        Ok(dispatch)
    }

    pub fn mode(&self) -> Mode {
        match self.model {
            Some(_) => Mode::ModelFirst,
            None => Mode::PatternOnly,
        }
    }

    /// Never fails: errors become `Outcome::Failed`.
    pub async fn handle(&self, instruction: &str) -> Outcome {
        if let Some(model) = &self.model {
            match model.interpret(instruction, self.store).await {
                Ok(report) => {
                    info!(interpreter = "model", reply = %report.message, "prompt handled");
                    return Outcome::Done(report);
                }
                Err(error) => warn!(%error, "model interpreter failed, trying patterns"),
            }
        }
        let outcome = Outcome::from(self.pattern.interpret(instruction, self.store).await);
        match &outcome {
            Outcome::Done(report) => {
                info!(interpreter = "pattern", reply = %report.message, "prompt handled")
            }
            Outcome::Failed { error } => info!(interpreter = "pattern", %error, "prompt failed"),
        }
        outcome
    }
}
