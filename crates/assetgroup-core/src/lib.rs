//! Asset grouping core: domain models, error taxonomy, rule evaluation,
//! and the repository trait implemented by storage crates.

pub mod error;
pub mod evaluator;
pub mod grouping;
pub mod models;
pub mod repository;
