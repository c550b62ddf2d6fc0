//! Business logic services for the harvest tracker

pub mod category;
pub mod dashboard;
pub mod harvest;
pub mod pantry;
pub mod produce;
pub mod reporting;
pub mod seed;

pub use category::CategoryService;
pub use dashboard::DashboardService;
pub use harvest::HarvestService;
pub use pantry::PantryService;
pub use produce::ProduceService;
pub use reporting::ReportingService;
pub use seed::SeedService;
