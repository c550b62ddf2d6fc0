//! HTTP handlers

pub mod category;
pub mod dashboard;
pub mod harvest;
pub mod health;
pub mod pantry;
pub mod produce;
pub mod reporting;
pub mod seed;

pub use category::*;
pub use dashboard::*;
pub use harvest::*;
pub use health::*;
pub use pantry::*;
pub use produce::*;
pub use reporting::*;
pub use seed::*;
