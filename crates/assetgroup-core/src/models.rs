//! Domain models for asset grouping.
//!
//! Assets are the records being classified; rules carry the conditions
//! that decide which group an asset lands in.

pub mod asset;
pub mod rule;
