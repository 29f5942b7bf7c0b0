//! Revenue projection across daily cohorts and yearly RPD aggregation

mod cache;
mod engine;
mod rpd;
mod table;

pub use cache::{CurveCache, PricedCurve};
pub use engine::{project, ProjectionConfig, RevenueProjector, DEFAULT_BASE_REVENUE, DEFAULT_DAILY_ACTIVATIONS};
pub use rpd::{aggregate, aggregate_table, growth_rate, YearlyRpd};
pub use table::{CohortRow, RevenueTable};
