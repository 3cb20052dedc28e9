//! Pattern interpreter
//!
//! An ordered rule table. Each rule is a regex, an optional guard and a
//! builder from captures to an [`Action`]. Rules overlap lexically, so the
//! order is the disambiguation policy: the first rule that builds wins.
//!
//! Content rules end the path at the first content introducer. Anything after
//! it, further introducers and colons included, is content. Paths may hold
//! colons, so `C:\notes.txt` survives.

use crate::action::{clean_path, Action, Report};
use crate::error::{Error, Result};
use crate::store::FileStore;
use regex::{Captures, Regex};
use tracing::debug;

/// Path of a content rule: shortest run on one line before the introducer.
const LINE_PATH: &str = r#"(?P<path>[^\n]+?)"#;
/// Path of a bare rule: a quoted string, else a run of non-space characters.
const WORD_PATH: &str = r#"(?:"[^"]+"|'[^']+'|\S+)"#;

struct Rule {
    name: &'static str,
    regex: Regex,
    /// Must match too. The rule regex then runs from the guard's position.
    guard: Option<Regex>,
    build: fn(&Captures) -> Option<Action>,
}

impl Rule {
    fn apply(&self, instruction: &str) -> Option<Action> {
        let haystack = match &self.guard {
            Some(guard) => &instruction[guard.find(instruction)?.start()..],
            None => instruction,
        };
        (self.build)(&self.regex.captures(haystack)?)
    }
}

pub struct PatternInterpreter {
    rules: Vec<Rule>,
}

impl PatternInterpreter {
    pub fn new() -> std::result::Result<PatternInterpreter, regex::Error> {
        let rules = vec![
            Rule {
                name: "create_file",
                regex: Regex::new(&format!(
                    r"(?is)\bcreate\s+(?:a\s+)?file\s+(?:at\s+)?{}\s*with\s+content\s*[:\-]\s*(?P<content>.*)",
                    LINE_PATH
                ))?,
                guard: None,
                build: |c| {
                    Some(Action::CreateFile {
                        path: path(c, "path")?,
                        content: content(c),
                    })
                },
            },
            Rule {
                name: "write_file",
                regex: Regex::new(&format!(
                    r"(?is)\b(?:write|save|update|edit)\s+(?:file\s+)?{}\s*(?:with\s+content\s*:|with\s*:)\s*(?P<content>.*)",
                    LINE_PATH
                ))?,
                guard: None,
                build: |c| {
                    Some(Action::WriteFile {
                        path: path(c, "path")?,
                        content: content(c),
                    })
                },
            },
            Rule {
                name: "append_file",
                regex: Regex::new(&format!(
                    r"(?is)\b(?:append|add)\s+to\s+(?:file\s+)?{}\s*(?:with\s+content\s*:|with\s*:)\s*(?P<content>.*)",
                    LINE_PATH
                ))?,
                guard: None,
                build: |c| {
                    Some(Action::AppendFile {
                        path: path(c, "path")?,
                        content: content(c),
                    })
                },
            },
            Rule {
                name: "delete",
                regex: Regex::new(&format!(
                    r"(?i)\b(?:delete|remove)\s+(?:file\s+)?(?P<path>{})",
                    WORD_PATH
                ))?,
                // Bare "delete"/"remove" shows up in too many sentences.
                guard: Some(Regex::new(r"(?i)\b(?:delete|remove) file")?),
                build: |c| {
                    Some(Action::Delete {
                        path: path(c, "path")?,
                    })
                },
            },
            Rule {
                name: "create_folder",
                regex: Regex::new(&format!(
                    r"(?i)\b(?:create|make)\s+(?:a\s+)?folder\s+(?:at\s+)?(?P<path>{})",
                    WORD_PATH
                ))?,
                guard: None,
                build: |c| {
                    Some(Action::CreateFolder {
                        path: path(c, "path")?,
                    })
                },
            },
            Rule {
                name: "rename",
                regex: Regex::new(&format!(
                    r"(?i)\brename\s+(?P<old>{})\s+(?:to|as)\s+(?P<new>{})",
                    WORD_PATH, WORD_PATH
                ))?,
                guard: None,
                build: |c| {
                    Some(Action::Rename {
                        old_path: path(c, "old")?,
                        new_path: path(c, "new")?,
                    })
                },
            },
        ];
        Ok(PatternInterpreter { rules })
    }

    /// First rule that matches, with its name. None is an ordinary answer.
    pub fn parse(&self, instruction: &str) -> Option<(&'static str, Action)> {
        let instruction = instruction.trim();
        self.rules
            .iter()
            .find_map(|rule| rule.apply(instruction).map(|action| (rule.name, action)))
    }

    pub async fn interpret(&self, instruction: &str, store: &dyn FileStore) -> Result<Report> {
        let (rule, action) = self.parse(instruction).ok_or(Error::ParseFailure)?;
        debug!(rule, kind = %action.kind(), "pattern matched");
        action.apply(store).await
    }
}

/// Cleaned, non-empty path capture.
fn path(c: &Captures, name: &str) -> Option<String> {
    let p = clean_path(c.name(name)?.as_str());
    match p.is_empty() {
        true => None,
        false => Some(p.to_string()),
    }
}

fn content(c: &Captures) -> String {
    c.name("content")
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}
