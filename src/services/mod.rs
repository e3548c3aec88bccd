pub mod auth;
pub mod chart;
pub mod export;
pub mod statistics;

pub use auth::{AuthService, Claims, IssuedToken};
pub use export::ExportFormat;
pub use statistics::{Series, StatisticsReport, TimeRange};
