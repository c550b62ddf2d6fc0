//! Shared types and logic for the Garden for All harvest tracker
//!
//! This crate contains the domain models, the unit normalizer and the
//! dashboard aggregation engine shared between the backend and the browser
//! (via WASM).

pub mod aggregation;
pub mod models;
pub mod normalize;
pub mod report;
pub mod types;
pub mod validation;

pub use aggregation::*;
pub use models::*;
pub use normalize::*;
pub use report::*;
pub use types::*;
pub use validation::*;
