use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Station: read-only station directory entry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub municipality_id: String,
    pub region_id: String,
    pub brand: Option<String>,
    pub active: bool,
}
