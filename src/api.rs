//! Plain http endpoints.
//! Every connection gets its own task, requests share nothing mutable.

use crate::body::ResponseBody as RB;
use crate::config::Config;
use crate::handler::Handler;
use crate::message::{Query, Reply};
use hyper::server::conn::http1;
use hyper::{service::service_fn, Request, Response};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::error::Error;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio_stream::wrappers::TcpListenerStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, info, warn};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

pub struct Api {
    handler: &'static Handler,
    http_addr: SocketAddr,
}

/// Server endpoints.
impl Api {
    pub fn new(config: &Config, handler: &'static Handler) -> Api {
        Api {
            handler,
            http_addr: config.http_addr,
        }
    }

    /// Bind the configured address and serve.
    pub async fn serve(&'static self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let listener = TcpListener::bind(self.http_addr).await?;
        self.serve_on(listener).await
    }

    /// Serve on an already bound listener.
    pub async fn serve_on(
        &'static self,
        listener: TcpListener,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        info!(addr = %listener.local_addr()?, "listening");
        self.serve_incoming(TcpListenerStream::new(listener)).await;
        Ok(())
    }

    /// Serve every accepted connection. A failed accept is logged and skipped.
    pub async fn serve_incoming<S>(&'static self, mut incoming: S)
    where
        S: Stream<Item = io::Result<TcpStream>> + Unpin,
    {
        while let Some(accepted) = incoming.next().await {
            let stream = match accepted {
                Ok(stream) => stream,
                Err(err) => {
                    warn!(error = %err, "accept failed");
                    // Out of descriptors and the like.
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            };
            let peer = stream
                .peer_addr()
                .map(|a| a.to_string())
                .unwrap_or_default();
            let io = TokioIo::new(stream);
            tokio::task::spawn(async move {
                if let Err(err) = http1::Builder::new()
                    .serve_connection(io, service_fn(move |req| handle_http(req, self.handler)))
                    .await
                {
                    warn!(%peer, error = %err, "error serving connection");
                }
            });
        }
    }
}

async fn handle_http(
    req: Request<hyper::body::Incoming>,
    handler: &'static Handler,
) -> Result<Response<RB>, Infallible> {
    let method = req.method().clone();
    let route = req.uri().path().to_string();
    let reply = match Query::parse(req).await {
        Ok(query) => {
            debug!(%method, %route, query = query.name(), "request");
            handler
                .handle(query)
                .await
                .unwrap_or_else(|error| Reply::Error { error })
        }
        Err(error) => Reply::Error { error },
    };
    if let Reply::Error { error } = &reply {
        debug!(%method, %route, %error, "request failed");
    }
    Ok(reply.to_response())
}
