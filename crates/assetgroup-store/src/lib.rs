//! Asset grouping store — in-memory implementation of
//! [`GroupingRepository`](assetgroup_core::repository::GroupingRepository).
//!
//! This crate provides:
//! - The store itself ([`GroupingStore`])
//! - Regrouping policy switches ([`GroupingConfig`])

mod config;
mod store;

pub use config::GroupingConfig;
pub use store::GroupingStore;
