use std::process::exit;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
pub async fn main() {
    // Log: RUST_LOG, info by default
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    // Config, layers, serve
    if let Err(e) = promptfs::run().await {
        error!(error = %e, "server stopped");
        exit(1);
    }
}
