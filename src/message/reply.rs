use crate::body::ResponseBody as RB;
use crate::error::Error;
use crate::interpret::Outcome;
use crate::store::{ByteStream, Entry};
use http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use serde_json::{json, Value};

pub enum Reply {
    Error { error: Error },
    Pong,
    Page { mime: String, raw: Vec<u8> },
    Drives { drives: Vec<String> },
    Items { items: Vec<Entry> },
    Content { content: String },
    Status { status: &'static str, path: String },
    Renamed { from: String, to: String },
    Uploaded { path: String, size: u64 },
    Download { name: String, raw: ByteStream },
    Prompt { outcome: Outcome },
}

impl Reply {
    pub fn to_response(self) -> Response<RB> {
        fn json_response(status: StatusCode, value: Value) -> Response<RB> {
            Response::builder()
                .status(status)
                .header(CONTENT_TYPE, "application/json")
                .body(RB::full(value.to_string()))
                .unwrap()
        }

        // Safe to unwrap here. Builders are infallible with these headers.

        match self {
            Reply::Error { error } => {
                json_response(error.status(), json!({ "error": error.to_string() }))
            }
            Reply::Pong => Response::new(RB::full("PONG")),
            Reply::Page { mime, raw } => Response::builder()
                .header(CONTENT_TYPE, mime)
                .body(RB::full(raw))
                .unwrap(),
            Reply::Drives { drives } => json_response(StatusCode::OK, json!({ "drives": drives })),
            Reply::Items { items } => json_response(StatusCode::OK, json!({ "items": items })),
            Reply::Content { content } => {
                json_response(StatusCode::OK, json!({ "content": content }))
            }
            Reply::Status { status, path } => {
                json_response(StatusCode::OK, json!({ "status": status, "path": path }))
            }
            Reply::Renamed { from, to } => json_response(
                StatusCode::OK,
                json!({ "status": "renamed", "from": from, "to": to }),
            ),
            Reply::Uploaded { path, size } => json_response(
                StatusCode::OK,
                json!({ "status": "uploaded", "path": path, "size": size }),
            ),
            Reply::Download { name, raw } => Response::builder()
                .header(CONTENT_TYPE, "application/octet-stream")
                .header(
                    CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", header_safe(&name)),
                )
                .body(RB::stream(raw))
                .unwrap(),
            // Failed outcomes are answers too, so always 200.
            Reply::Prompt { outcome } => json_response(
                StatusCode::OK,
                serde_json::to_value(outcome).unwrap_or(Value::Null),
            ),
        }
    }
}

/// Drop what cannot sit inside a quoted header parameter.
fn header_safe(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
        .collect()
}
