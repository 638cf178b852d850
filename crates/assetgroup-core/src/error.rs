//! Error types for the asset grouping system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetGroupError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Invalid payload: {message}")]
    InvalidPayload { message: String },

    #[error("Not implemented: {operation}")]
    NotImplemented { operation: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AssetGroupError {
    pub fn asset_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            entity: "asset".into(),
            id: id.to_string(),
        }
    }

    pub fn rule_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            entity: "rule".into(),
            id: id.to_string(),
        }
    }
}

pub type AssetGroupResult<T> = Result<T, AssetGroupError>;
