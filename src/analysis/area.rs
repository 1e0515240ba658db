//! Cross-area price comparison: per-area statistics, pairwise differences,
//! insights and an affordability ranking.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use crate::models::{
    Area, AreaDifference, AreaFuelStats, AreaInsights, AreaRanking, AreaReport, AreaStats,
    AreaValue, CompetitionIndex, FuelInsight, FuelType, PriceObservation,
};
use crate::stats::{self, round2};

/// Minimum number of areas before an across-area average is reported.
const MIN_AREAS_FOR_AVERAGE: usize = 3;

/// Per-fuel statistics of one area from the latest observation of each of its stations.
pub fn area_stats(area: &Area, latest: &[&PriceObservation]) -> AreaStats {
    let mut per_fuel: BTreeMap<FuelType, (Vec<f64>, HashSet<&str>)> = BTreeMap::new();
    for obs in latest.iter().filter(|o| o.price.is_finite()) {
        let entry = per_fuel.entry(obs.fuel_type).or_default();
        entry.0.push(obs.price);
        entry.1.insert(obs.station_id.as_str());
    }

    let fuels = per_fuel
        .into_iter()
        .filter_map(|(fuel_type, (prices, stations))| {
            let summary = stats::Summary::of(&prices)?;
            Some(AreaFuelStats {
                fuel_type,
                avg: round2(summary.avg),
                min: round2(summary.min),
                max: round2(summary.max),
                stddev: round2(summary.stddev),
                station_count: stations.len(),
            })
        })
        .collect();

    AreaStats {
        area: area.clone(),
        fuels,
    }
}

/// Build the full comparison report from already computed area statistics.
pub fn compare(areas: Vec<AreaStats>) -> AreaReport {
    let matrix = difference_matrix(&areas);
    let insights = insights(&areas);
    let ranking = ranking(&areas);
    AreaReport {
        areas,
        matrix,
        insights,
        ranking,
    }
}

/// Average differences for every ordered pair of distinct areas and every
/// fuel both of them price.
pub fn difference_matrix(areas: &[AreaStats]) -> Vec<AreaDifference> {
    let mut matrix = Vec::new();
    for (i, a) in areas.iter().enumerate() {
        for (j, b) in areas.iter().enumerate() {
            if i == j {
                continue;
            }
            for fuel in FuelType::ALL {
                let (Some(sa), Some(sb)) = (a.fuel(fuel), b.fuel(fuel)) else {
                    continue;
                };
                let difference = sa.avg - sb.avg;
                matrix.push(AreaDifference {
                    from: a.area.name.clone(),
                    to: b.area.name.clone(),
                    fuel_type: fuel,
                    difference: round2(difference),
                    difference_percent: (sb.avg != 0.0)
                        .then(|| round2(difference / sb.avg * 100.0)),
                });
            }
        }
    }
    matrix
}

fn by_value(a: &AreaValue, b: &AreaValue) -> Ordering {
    a.value.total_cmp(&b.value)
}

pub fn insights(areas: &[AreaStats]) -> AreaInsights {
    let mut fuels = Vec::new();
    for fuel in FuelType::ALL {
        let values: Vec<AreaValue> = areas
            .iter()
            .filter_map(|a| {
                a.fuel(fuel).map(|s| AreaValue {
                    area: a.area.name.clone(),
                    value: s.avg,
                })
            })
            .collect();

        let cheapest = values.iter().min_by(|a, b| by_value(a, b)).cloned();
        let most_expensive = values.iter().max_by(|a, b| by_value(a, b)).cloned();
        if let (Some(cheapest), Some(most_expensive)) = (cheapest, most_expensive) {
            let averages: Vec<f64> = values.iter().map(|v| v.value).collect();
            let average_across_areas = if values.len() >= MIN_AREAS_FOR_AVERAGE {
                stats::mean(&averages).map(round2)
            } else {
                None
            };
            fuels.push(FuelInsight {
                fuel_type: fuel,
                cheapest,
                most_expensive,
                average_across_areas,
            });
        }
    }

    let disparities: Vec<AreaValue> = areas
        .iter()
        .filter_map(|a| {
            a.fuel(FuelType::Regular).map(|s| AreaValue {
                area: a.area.name.clone(),
                value: round2(s.max - s.min),
            })
        })
        .collect();

    AreaInsights {
        fuels,
        highest_disparity: disparities.iter().max_by(|a, b| by_value(a, b)).cloned(),
        lowest_disparity: disparities.iter().min_by(|a, b| by_value(a, b)).cloned(),
        competition: competition_indexes(areas),
    }
}

/// Mean coefficient of variation across the fuels an area prices.
fn competition_indexes(areas: &[AreaStats]) -> Vec<CompetitionIndex> {
    let values: Vec<(String, f64)> = areas
        .iter()
        .filter_map(|a| {
            let cvs: Vec<f64> = a
                .fuels
                .iter()
                .filter(|s| s.avg != 0.0)
                .map(|s| s.stddev / s.avg)
                .collect();
            stats::mean(&cvs).map(|cv| (a.area.name.clone(), cv))
        })
        .collect();

    let highest = values.iter().map(|(_, v)| *v).fold(f64::NEG_INFINITY, f64::max);
    let lowest = values.iter().map(|(_, v)| *v).fold(f64::INFINITY, f64::min);

    values
        .into_iter()
        .map(|(area, index)| CompetitionIndex {
            area,
            index,
            is_highest: index == highest,
            is_lowest: index == lowest,
        })
        .collect()
}

/// Affordability score: the `sqrt(station_count)`-weighted mean of `100 / avg`.
pub fn area_score(stats: &AreaStats) -> f64 {
    let mut weighted = 0.0;
    let mut weights = 0.0;
    for s in stats.fuels.iter().filter(|s| s.avg > 0.0) {
        let weight = (s.station_count as f64).sqrt();
        weighted += 100.0 / s.avg * weight;
        weights += weight;
    }
    if weights == 0.0 {
        0.0
    } else {
        weighted / weights
    }
}

/// Areas ordered by descending score; areas without data score 0 and come last.
pub fn ranking(areas: &[AreaStats]) -> Vec<AreaRanking> {
    let mut scored: Vec<(String, f64)> = areas
        .iter()
        .map(|a| (a.area.name.clone(), area_score(a)))
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    scored
        .into_iter()
        .enumerate()
        .map(|(i, (area, score))| AreaRanking {
            rank: i + 1,
            area,
            score: round2(score),
        })
        .collect()
}
