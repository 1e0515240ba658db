//! Competition ranking ("1224" ranking) of a station among its competitors.

use std::cmp::Ordering;

/// One priced station taking part in a ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct RankEntry {
    pub station_id: String,
    pub price: f64,
}

impl RankEntry {
    pub fn new(station_id: &str, price: f64) -> Self {
        Self {
            station_id: station_id.to_string(),
            price,
        }
    }
}

/// A station's unrounded place in a ranking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankPosition {
    pub rank: usize,
    pub total: usize,
    pub percentile: f64,
    pub price: f64,
    pub diff_from_first: f64,
}

/// Ranks for prices already sorted ascending.
///
/// Ties share the lowest rank; the next distinct price takes its 1-based
/// index, so `[10, 10, 12]` ranks `[1, 1, 3]`.
pub fn competition_ranks(sorted_prices: &[f64]) -> Vec<usize> {
    let mut ranks = Vec::with_capacity(sorted_prices.len());
    let mut current_rank = 0;
    let mut previous: Option<f64> = None;

    for (index, price) in sorted_prices.iter().enumerate() {
        if previous != Some(*price) {
            current_rank = index + 1;
            previous = Some(*price);
        }
        ranks.push(current_rank);
    }
    ranks
}

/// `(rank - 1) / (total - 1) * 100`, or 0 when there is nobody to compare with.
pub fn rank_percentile(rank: usize, total: usize) -> f64 {
    if total <= 1 {
        return 0.0;
    }
    (rank.saturating_sub(1)) as f64 / (total - 1) as f64 * 100.0
}

/// Rank `station_id` among `entries` (which must include the station itself).
///
/// Entries with a non-finite price are dropped. Returns `None` when the
/// station is not among the priced entries.
pub fn rank_station(station_id: &str, entries: &[RankEntry]) -> Option<RankPosition> {
    let mut sorted: Vec<&RankEntry> = entries.iter().filter(|e| e.price.is_finite()).collect();
    sorted.sort_by(|a, b| {
        a.price
            .partial_cmp(&b.price)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.station_id.cmp(&b.station_id))
    });

    let prices: Vec<f64> = sorted.iter().map(|e| e.price).collect();
    let ranks = competition_ranks(&prices);
    let index = sorted.iter().position(|e| e.station_id == station_id)?;

    let total = sorted.len();
    let rank = ranks[index];
    let price = sorted[index].price;
    Some(RankPosition {
        rank,
        total,
        percentile: rank_percentile(rank, total),
        price,
        diff_from_first: price - prices[0],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_share_the_lowest_rank() {
        assert_eq!(competition_ranks(&[10.0, 10.0, 12.0]), vec![1, 1, 3]);
        assert_eq!(competition_ranks(&[1.0, 2.0, 2.0, 4.0]), vec![1, 2, 2, 4]);
        assert!(competition_ranks(&[]).is_empty());
    }

    #[test]
    fn percentile_of_first_place_is_zero() {
        assert_eq!(rank_percentile(1, 3), 0.0);
        assert_eq!(rank_percentile(3, 3), 100.0);
        assert_eq!(rank_percentile(2, 3), 50.0);
        assert_eq!(rank_percentile(1, 1), 0.0);
    }

    #[test]
    fn tied_station_takes_shared_rank() {
        let entries = vec![
            RankEntry::new("c", 12.0),
            RankEntry::new("a", 10.0),
            RankEntry::new("b", 10.0),
        ];
        let a = rank_station("a", &entries).unwrap();
        let b = rank_station("b", &entries).unwrap();
        let c = rank_station("c", &entries).unwrap();
        assert_eq!((a.rank, b.rank, c.rank), (1, 1, 3));
        assert_eq!(a.percentile, 0.0);
        assert_eq!(c.total, 3);
        assert_eq!(c.diff_from_first, 2.0);
    }

    #[test]
    fn lone_station_ranks_first() {
        let pos = rank_station("solo", &[RankEntry::new("solo", 21.5)]).unwrap();
        assert_eq!(pos.rank, 1);
        assert_eq!(pos.total, 1);
        assert_eq!(pos.percentile, 0.0);
        assert_eq!(pos.diff_from_first, 0.0);
    }

    #[test]
    fn unknown_station_is_none() {
        assert!(rank_station("ghost", &[RankEntry::new("a", 1.0)]).is_none());
    }

    #[test]
    fn rank_is_within_bounds() {
        let entries: Vec<RankEntry> = (0..20)
            .map(|i| RankEntry::new(&format!("s{}", i), 20.0 + (i % 5) as f64 * 0.1))
            .collect();
        for e in &entries {
            let pos = rank_station(&e.station_id, &entries).unwrap();
            assert!(pos.rank >= 1 && pos.rank <= pos.total);
            assert!((0.0..=100.0).contains(&pos.percentile));
        }
    }
}
