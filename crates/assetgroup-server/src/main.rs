//! Asset grouping server — application entry point.
//!
//! Serves the request boundary over stdin/stdout, one request per line,
//! one JSON response per line. Logs go to stderr.

mod api;
mod config;
mod error;

use assetgroup_core::repository::GroupingRepository;
use assetgroup_store::GroupingStore;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;
use crate::error::ServerError;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let config = ServerConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log_filter)?)
        .with_writer(std::io::stderr)
        .json()
        .init();

    tracing::info!(
        regroup_on_asset_update = config.grouping.regroup_on_asset_update,
        warn_on_multiple_matches = config.grouping.warn_on_multiple_matches,
        "Starting asset grouping server..."
    );

    let store = GroupingStore::new(config.grouping);
    serve(&store).await?;

    tracing::info!("Asset grouping server stopped.");
    Ok(())
}

async fn serve<R: GroupingRepository>(repo: &R) -> Result<(), ServerError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = match api::parse_request(&line) {
            Ok(request) => api::handle(repo, &request).await,
            Err(err) => api::ApiResponse::from_error(&err),
        };

        let mut encoded = serde_json::to_vec(&response)?;
        encoded.push(b'\n');
        stdout.write_all(&encoded).await?;
        stdout.flush().await?;
    }

    Ok(())
}
