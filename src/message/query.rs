use crate::error::{Error, Result};
use crate::store::ByteStream;
use http_body_util::{BodyExt, BodyStream};
use hyper::body::Incoming;
use hyper::{Method, Request};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::io;
use tokio_stream::StreamExt;

type Fields = HashMap<String, String>;

const ROUTES: [&str; 13] = [
    "/",
    "/api/ping",
    "/api/drives",
    "/api/browse",
    "/api/read",
    "/api/save",
    "/api/create",
    "/api/mkdir",
    "/api/delete",
    "/api/rename",
    "/api/upload",
    "/api/download",
    "/api/prompt",
];

pub enum Query {
    Ping,
    Static { file: String },
    Drives,
    Browse { path: String },
    Read { path: String },
    Save { path: String, content: String },
    Create { path: String },
    Mkdir { path: String },
    Delete { path: String },
    Rename { old: String, new: String },
    Upload { path: String, raw: ByteStream },
    Download { path: String },
    Prompt { prompt: String },
}

#[derive(Deserialize)]
struct SaveBody {
    path: Option<String>,
    content: Option<String>,
}

#[derive(Deserialize)]
struct PromptBody {
    prompt: String,
}

impl Query {
    /// Route and method pick the variant; parameters come from the query
    /// string, a JSON body or a urlencoded form depending on the endpoint.
    pub async fn parse(req: Request<Incoming>) -> Result<Query> {
        let route = req.uri().path().to_string();
        let params = fields(req.uri().query().unwrap_or("").as_bytes());
        match (req.method().clone(), route.as_str()) {
            (Method::GET, "/") => Ok(Query::Static {
                file: "index.html".to_string(),
            }),
            (Method::GET, p) if p.starts_with("/static/") => Ok(Query::Static {
                file: p["/static/".len()..].to_string(),
            }),
            (Method::GET, "/api/ping") => Ok(Query::Ping),
            (Method::GET, "/api/drives") => Ok(Query::Drives),
            (Method::GET, "/api/browse") => Ok(Query::Browse {
                path: take(&params, "path")?,
            }),
            (Method::GET, "/api/read") => Ok(Query::Read {
                path: take(&params, "path")?,
            }),
            (Method::POST, "/api/save") => {
                let body: SaveBody = json(req).await?;
                Ok(Query::Save {
                    path: body
                        .path
                        .filter(|p| !p.is_empty())
                        .ok_or(Error::ApiMissingParam("path"))?,
                    content: body.content.unwrap_or_default(),
                })
            }
            (Method::POST, "/api/create") => Ok(Query::Create {
                path: take(&form(req, params).await?, "path")?,
            }),
            (Method::POST, "/api/mkdir") => Ok(Query::Mkdir {
                path: take(&form(req, params).await?, "path")?,
            }),
            (Method::DELETE, "/api/delete") => Ok(Query::Delete {
                path: take(&params, "path")?,
            }),
            (Method::POST, "/api/rename") => {
                let form = form(req, params).await?;
                Ok(Query::Rename {
                    old: take(&form, "old")?,
                    new: take(&form, "new")?,
                })
            }
            (Method::POST, "/api/upload") => Ok(Query::Upload {
                path: take(&params, "path")?,
                raw: stream(req),
            }),
            (Method::GET, "/api/download") => Ok(Query::Download {
                path: take(&params, "path")?,
            }),
            (Method::POST, "/api/prompt") => {
                let body: PromptBody = json(req).await?;
                Ok(Query::Prompt {
                    prompt: body.prompt,
                })
            }
            (_, p) if ROUTES.contains(&p) || p.starts_with("/static/") => Err(Error::ApiMethod),
            (_, p) => Err(Error::ApiNotFound(p.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Query::Ping => "ping",
            Query::Static { .. } => "static",
            Query::Drives => "drives",
            Query::Browse { .. } => "browse",
            Query::Read { .. } => "read",
            Query::Save { .. } => "save",
            Query::Create { .. } => "create",
            Query::Mkdir { .. } => "mkdir",
            Query::Delete { .. } => "delete",
            Query::Rename { .. } => "rename",
            Query::Upload { .. } => "upload",
            Query::Download { .. } => "download",
            Query::Prompt { .. } => "prompt",
        }
    }
}

fn fields(raw: &[u8]) -> Fields {
    url::form_urlencoded::parse(raw).into_owned().collect()
}

/// Non-empty value by key.
fn take(fields: &Fields, key: &'static str) -> Result<String> {
    match fields.get(key) {
        Some(v) if !v.is_empty() => Ok(v.clone()),
        _ => Err(Error::ApiMissingParam(key)),
    }
}

async fn json<T: DeserializeOwned>(req: Request<Incoming>) -> Result<T> {
    let raw = req.into_body().collect().await?.to_bytes();
    serde_json::from_slice(&raw).map_err(|e| Error::ApiBadBody(e.to_string()))
}

/// Urlencoded body fields over query string fields.
async fn form(req: Request<Incoming>, mut params: Fields) -> Result<Fields> {
    let raw = req.into_body().collect().await?.to_bytes();
    params.extend(fields(&raw));
    Ok(params)
}

/// Data frames of the body, trailers dropped.
fn stream(req: Request<Incoming>) -> ByteStream {
    Box::pin(
        BodyStream::new(req.into_body()).filter_map(|frame| match frame {
            Ok(frame) => frame.into_data().ok().map(Ok),
            Err(e) => Some(Err(io::Error::new(io::ErrorKind::Other, e))),
        }),
    )
}
