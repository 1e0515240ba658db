//! Pricing recommendations derived from per-fuel spread results.
//!
//! Rules are checked in order and the first match wins for each fuel:
//! outlier high, outlier low, above the average by more than the threshold,
//! below it by more than the threshold, then a lower-half advantage.

use crate::config::AnalyticsConfig;
use crate::locale::Translator;
use crate::models::{Priority, Recommendation, RecommendationKind, SpreadResult};
use crate::stats::round2;

/// Competitor count below which confidence is scaled down.
const FULL_CONFIDENCE_COMPETITORS: usize = 5;
/// Floor of the competitor-count scaling.
const MIN_CONFIDENCE_SCALE: f64 = 0.5;
/// Target discount applied when a station is already below the average.
const BELOW_AVERAGE_FACTOR: f64 = 0.99;

impl RecommendationKind {
    pub fn priority(&self) -> Priority {
        match self {
            RecommendationKind::OutlierHigh => Priority::Critical,
            RecommendationKind::OutlierLow | RecommendationKind::AboveAverage => Priority::High,
            RecommendationKind::BelowAverage => Priority::Medium,
            RecommendationKind::CompetitiveAdvantage => Priority::Low,
        }
    }

    fn base_confidence(&self) -> f64 {
        match self {
            RecommendationKind::OutlierHigh => 0.9,
            RecommendationKind::OutlierLow => 0.85,
            RecommendationKind::AboveAverage => 0.8,
            RecommendationKind::BelowAverage => 0.7,
            RecommendationKind::CompetitiveAdvantage => 0.6,
        }
    }
}

/// Matched rule with its suggested price, before localization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleMatch {
    pub kind: RecommendationKind,
    pub current_price: f64,
    pub suggested_price: f64,
}

/// First rule matching one spread result, if any.
pub fn evaluate(result: &SpreadResult, config: &AnalyticsConfig) -> Option<RuleMatch> {
    let price = result.position.user_price?;
    let avg = result.market.avg?;
    let stddev = result.market.stddev.unwrap_or(0.0);
    let from_avg_percent = result.position.from_avg_percent.unwrap_or(0.0);
    let threshold = config.recommendation_threshold_percent;

    let (kind, suggested) = if result.position.is_outlier && price > avg {
        (RecommendationKind::OutlierHigh, avg)
    } else if result.position.is_outlier && price < avg {
        (RecommendationKind::OutlierLow, avg - stddev)
    } else if from_avg_percent > threshold {
        (RecommendationKind::AboveAverage, avg)
    } else if from_avg_percent < -threshold {
        (RecommendationKind::BelowAverage, avg * BELOW_AVERAGE_FACTOR)
    } else if result
        .position
        .quartile
        .map(|q| q.is_lower_half())
        .unwrap_or(false)
    {
        (RecommendationKind::CompetitiveAdvantage, price)
    } else {
        return None;
    };

    Some(RuleMatch {
        kind,
        current_price: price,
        suggested_price: round2(suggested),
    })
}

/// Rule confidence scaled down for thin competitor sets.
pub fn confidence(kind: RecommendationKind, competitor_count: usize) -> f64 {
    let scale = if competitor_count >= FULL_CONFIDENCE_COMPETITORS {
        1.0
    } else {
        (competitor_count as f64 / FULL_CONFIDENCE_COMPETITORS as f64).max(MIN_CONFIDENCE_SCALE)
    };
    round2(kind.base_confidence() * scale)
}

fn money(value: f64) -> String {
    format!("{:.2}", value)
}

/// Recommendations for every fuel with a matching rule, most urgent first,
/// capped at `max_recommendations`.
pub fn recommend(
    results: &[SpreadResult],
    translator: &dyn Translator,
    config: &AnalyticsConfig,
) -> Vec<Recommendation> {
    let mut recommendations: Vec<Recommendation> = results
        .iter()
        .filter_map(|result| {
            let rule = evaluate(result, config)?;
            let avg = result.market.avg.unwrap_or(rule.current_price);
            let percent = result.position.from_avg_percent.unwrap_or(0.0).abs();
            let args = [
                ("fuel", translator.fuel_label(result.fuel_type)),
                ("price", money(rule.current_price)),
                ("avg", money(avg)),
                ("percent", money(percent)),
                ("suggested", money(rule.suggested_price)),
            ];
            let key = rule.kind.template_key();

            Some(Recommendation {
                fuel_type: result.fuel_type,
                kind: rule.kind,
                priority: rule.kind.priority(),
                title: translator.translate(&format!("{}.title", key), &args),
                message: translator.translate(&format!("{}.message", key), &args),
                current_price: rule.current_price,
                suggested_price: rule.suggested_price,
                confidence: confidence(rule.kind, result.competitor_count),
            })
        })
        .collect();

    // Stable: fuels keep their input order within one priority.
    recommendations.sort_by_key(|r| r.priority);
    recommendations.truncate(config.max_recommendations);
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::spread;
    use crate::locale::Catalog;
    use crate::models::FuelType;

    fn config() -> AnalyticsConfig {
        AnalyticsConfig::default()
    }

    const TIGHT_MARKET: [f64; 8] = [20.0, 20.1, 19.9, 20.0, 20.2, 19.8, 20.0, 20.1];

    #[test]
    fn far_above_market_is_critical() {
        let result = spread::analyze(FuelType::Regular, Some(23.0), &TIGHT_MARKET, &config());
        let rule = evaluate(&result, &config()).unwrap();
        assert_eq!(rule.kind, RecommendationKind::OutlierHigh);
        assert_eq!(rule.kind.priority(), Priority::Critical);
        assert_eq!(rule.suggested_price, result.market.avg.unwrap());
    }

    #[test]
    fn far_below_market_suggests_one_stddev_under_average() {
        let result = spread::analyze(FuelType::Regular, Some(17.0), &TIGHT_MARKET, &config());
        let rule = evaluate(&result, &config()).unwrap();
        assert_eq!(rule.kind, RecommendationKind::OutlierLow);
        let expected = round2(result.market.avg.unwrap() - result.market.stddev.unwrap());
        assert_eq!(rule.suggested_price, expected);
    }

    #[test]
    fn above_and_below_average_thresholds() {
        // Wide market so a 4% gap is not an outlier.
        let wide = [18.0, 19.0, 20.0, 21.0, 22.0];
        let above = spread::analyze(FuelType::Premium, Some(20.9), &wide, &config());
        assert_eq!(
            evaluate(&above, &config()).unwrap().kind,
            RecommendationKind::AboveAverage
        );

        let below = spread::analyze(FuelType::Premium, Some(19.2), &wide, &config());
        let rule = evaluate(&below, &config()).unwrap();
        assert_eq!(rule.kind, RecommendationKind::BelowAverage);
        assert_eq!(rule.suggested_price, 19.8);
    }

    #[test]
    fn lower_half_without_gap_is_an_advantage() {
        let result = spread::analyze(FuelType::Diesel, Some(19.95), &TIGHT_MARKET, &config());
        let rule = evaluate(&result, &config()).unwrap();
        assert_eq!(rule.kind, RecommendationKind::CompetitiveAdvantage);
        assert_eq!(rule.suggested_price, 19.95);
    }

    #[test]
    fn upper_half_without_gap_gets_nothing() {
        let result = spread::analyze(FuelType::Diesel, Some(20.15), &TIGHT_MARKET, &config());
        assert!(evaluate(&result, &config()).is_none());
    }

    #[test]
    fn empty_spread_gets_nothing() {
        let result = SpreadResult::empty(FuelType::Regular);
        assert!(evaluate(&result, &config()).is_none());
    }

    #[test]
    fn thin_markets_lower_confidence() {
        assert_eq!(confidence(RecommendationKind::OutlierHigh, 8), 0.9);
        assert_eq!(confidence(RecommendationKind::OutlierHigh, 4), 0.72);
        assert_eq!(confidence(RecommendationKind::OutlierHigh, 1), 0.45);
    }

    #[test]
    fn output_is_sorted_localized_and_capped() {
        let results = vec![
            spread::analyze(FuelType::Regular, Some(19.95), &TIGHT_MARKET, &config()),
            spread::analyze(FuelType::Premium, Some(23.0), &TIGHT_MARKET, &config()),
            spread::analyze(FuelType::Diesel, Some(17.0), &TIGHT_MARKET, &config()),
        ];
        let catalog = Catalog::spanish();
        let recs = recommend(&results, &catalog, &config());

        let kinds: Vec<RecommendationKind> = recs.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RecommendationKind::OutlierHigh,
                RecommendationKind::OutlierLow,
                RecommendationKind::CompetitiveAdvantage,
            ]
        );
        assert!(recs[0].title.contains("Premium"));
        assert!(recs[0].message.contains("23.00"));
        assert!(recs[2].title.contains("Magna"));

        let capped = AnalyticsConfig {
            max_recommendations: 1,
            ..config()
        };
        let recs = recommend(&results, &catalog, &capped);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].priority, Priority::Critical);
    }
}
