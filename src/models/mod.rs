pub mod area;
pub mod competitor;
pub mod heatmap;
pub mod market;
pub mod observation;
pub mod rank;
pub mod recommendation;
pub mod spread;
pub mod station;
pub mod trend;

pub use area::*;
pub use competitor::*;
pub use heatmap::*;
pub use market::*;
pub use observation::*;
pub use rank::*;
pub use recommendation::*;
pub use spread::*;
pub use station::*;
pub use trend::*;
