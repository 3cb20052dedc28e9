use hyper::StatusCode;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("missing parameter: {0}")]
    ApiMissingParam(&'static str),
    #[error("bad request body: {0}")]
    ApiBadBody(String),
    #[error("no such endpoint: {0}")]
    ApiNotFound(String),
    #[error("method not allowed")]
    ApiMethod,
    #[error("bad path: {0}")]
    ApiBadPath(String),

    #[error("Could not parse prompt. Try: create file /path/to/file with content: ...")]
    ParseFailure,
    #[error("unparsable model output: {0}")]
    ModelOutput(String),
    #[error("model output is missing {0}")]
    MissingField(&'static str),
    #[error("Unrecognized action from model: {0}")]
    UnrecognizedAction(String),
    #[error("model backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Path is a directory: {0}")]
    IsDirectory(String),
    #[error("I/O failure on {path}: {reason}")]
    IoFailure { path: String, reason: String },

    #[error("hyper: {0}")]
    Hyper(#[from] hyper::Error),
    #[error("regex: {0}")]
    Regex(#[from] regex::Error),
}

impl Error {
    /// Classify an io error raised while touching `path`.
    pub fn from_io(error: io::Error, path: &str) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Error::NotFound(path.to_string()),
            io::ErrorKind::PermissionDenied => Error::PermissionDenied(path.to_string()),
            _ => Error::IoFailure {
                path: path.to_string(),
                reason: error.to_string(),
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::ApiMissingParam(_)
            | Error::ApiBadBody(_)
            | Error::ApiBadPath(_)
            | Error::IsDirectory(_) => StatusCode::BAD_REQUEST,
            Error::ApiNotFound(_) | Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::ApiMethod => StatusCode::METHOD_NOT_ALLOWED,
            Error::PermissionDenied(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
