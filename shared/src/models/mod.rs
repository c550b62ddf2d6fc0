//! Domain models for the Garden Harvest Tracker

mod category;
mod harvest;
mod pantry;
mod produce;

pub use category::*;
pub use harvest::*;
pub use pantry::*;
pub use produce::*;
