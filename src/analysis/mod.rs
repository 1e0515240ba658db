//! Pure analytics over already-fetched data.
//!
//! Nothing in here touches the store or the rank cache; the query wrappers in
//! [`crate::queries`] fetch inputs and hand them to these functions.

pub mod aggregate;
pub mod area;
pub mod correlation;
pub mod heatmap;
pub mod ranking;
pub mod recommendations;
pub mod spread;
pub mod trend;
