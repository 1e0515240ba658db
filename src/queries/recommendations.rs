use crate::analysis::recommendations;
use crate::config::AnalyticsConfig;
use crate::error::Result;
use crate::locale::Translator;
use crate::models::Recommendation;
use crate::queries::spread::SpreadQuery;
use crate::store::MarketData;

pub struct RecommendationQuery<'a> {
    data: &'a dyn MarketData,
    translator: &'a dyn Translator,
    config: &'a AnalyticsConfig,
}

impl<'a> RecommendationQuery<'a> {
    pub fn new(
        data: &'a dyn MarketData,
        translator: &'a dyn Translator,
        config: &'a AnalyticsConfig,
    ) -> Self {
        Self {
            data,
            translator,
            config,
        }
    }

    /// Localized pricing recommendations from the station's spread against
    /// its radius competitors.
    pub fn for_station(&self, station_id: &str, radius_km: f64) -> Result<Vec<Recommendation>> {
        let spreads =
            SpreadQuery::new(self.data, self.config).for_station(station_id, radius_km)?;
        Ok(recommendations::recommend(&spreads, self.translator, self.config))
    }
}
