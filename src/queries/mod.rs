//! Query modules for the fuel market SDK.
//!
//! Each module provides a query struct that borrows the market data port
//! ([`MarketData`](crate::store::MarketData)) plus whatever configuration,
//! rank cache or translator it needs, fetches its inputs in bulk, and hands
//! them to the pure functions in [`analysis`](crate::analysis).

pub mod areas;
pub mod competitors;
pub mod heatmap;
pub mod market;
pub mod prices;
pub mod ranking;
pub mod recommendations;
pub mod spread;
pub mod trends;

pub use areas::AreaQuery;
pub use competitors::CompetitorQuery;
pub use heatmap::HeatMapQuery;
pub use market::MarketQuery;
pub use prices::PriceQuery;
pub use ranking::RankingQuery;
pub use recommendations::RecommendationQuery;
pub use spread::SpreadQuery;
pub use trends::TrendQuery;
