//! Process-level error type.

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid log filter: {0}")]
    LogFilter(#[from] tracing_subscriber::filter::ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("response encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}
