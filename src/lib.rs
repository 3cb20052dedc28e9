pub mod action;
pub mod api;
pub mod body;
pub mod config;
pub mod error;
pub mod handler;
pub mod interpret;
pub mod llm;
pub mod message;
pub mod store;

pub use error::{Error, Result};

use api::Api;
use config::Config;
use handler::Handler;
use interpret::Dispatch;
use store::{FileStore, LocalStore};

/// Leak a value for the lifetime of the process.
#[macro_export]
macro_rules! to_static {
    ($e:expr) => {
        Box::leak(Box::new($e))
    };
}

/// Wire the layers together over the local disk.
pub fn assemble(config: &'static Config) -> Result<&'static Api> {
    // Store: filesystem primitives
    let store: &'static dyn FileStore = to_static!(LocalStore::new());
    // Interpret: instruction to action
    let dispatch: &'static Dispatch = to_static!(Dispatch::from_config(config, store)?);
    // Handler: query to reply
    let handler: &'static Handler = to_static!(Handler::new(config, store, dispatch));
    // API: http
    Ok(to_static!(Api::new(config, handler)))
}

/// Read the environment, assemble and serve. Returns only on a fatal error.
pub async fn run() -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config: &'static Config = to_static!(Config::new());
    assemble(config)?.serve().await
}
