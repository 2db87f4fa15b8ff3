//! Support and resistance detection from swing pivots.
//!
//! A pivot low (high) is a candle whose low (high) is strictly below (above)
//! every neighbour within `window` candles on both sides. Pivot prices are then
//! grouped into clusters of nearby prices and each cluster becomes one level.

use crate::indicator::round_dp;
use crate::model::Candle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivotKind {
    Support,
    Resistance,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pivot {
    pub price: f64,
    pub kind: PivotKind,
    /// Index of the pivot candle in the series.
    pub index: usize,
}

/// A group of nearby pivot prices.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    members: Vec<f64>,
}

impl Cluster {
    fn new(first: f64) -> Self {
        Self {
            members: vec![first],
        }
    }

    pub fn mean(&self) -> f64 {
        self.members.iter().sum::<f64>() / self.members.len() as f64
    }

    /// Mean of the members rounded to cents.
    pub fn representative(&self) -> f64 {
        round_dp(self.mean(), 2)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Levels {
    pub support: Vec<f64>,
    pub resistance: Vec<f64>,
}

pub struct LevelDetector {
    window: usize,
    tolerance: f64,
    max_levels: usize,
}

impl LevelDetector {
    pub fn new(window: usize, tolerance: f64, max_levels: usize) -> Self {
        Self {
            window,
            tolerance,
            max_levels,
        }
    }

    /// Levels relative to the last close: supports strictly below it,
    /// resistances strictly above it, each list capped at `max_levels`.
    ///
    /// Order follows cluster size (largest first), not distance from price.
    pub fn detect(&self, candles: &[Candle]) -> Levels {
        let Some(current) = candles.last().map(|c| c.close) else {
            return Levels::default();
        };

        let pivots = self.find_pivots(candles);
        let prices_of = |kind: PivotKind| -> Vec<f64> {
            pivots
                .iter()
                .filter(|p| p.kind == kind)
                .map(|p| p.price)
                .collect()
        };

        let support = self
            .strongest_levels(prices_of(PivotKind::Support))
            .into_iter()
            .filter(|&level| level < current)
            .take(self.max_levels)
            .collect();
        let resistance = self
            .strongest_levels(prices_of(PivotKind::Resistance))
            .into_iter()
            .filter(|&level| level > current)
            .take(self.max_levels)
            .collect();

        Levels {
            support,
            resistance,
        }
    }

    /// Pivots in index order. A candle can be both a support and a resistance pivot.
    pub fn find_pivots(&self, candles: &[Candle]) -> Vec<Pivot> {
        let w = self.window;
        if candles.len() < 2 * w + 1 {
            return Vec::new();
        }

        let neighbours =
            move |i: usize| (i - w..i).chain(i + 1..=i + w).map(move |j| &candles[j]);

        let mut pivots = Vec::new();
        for i in w..candles.len() - w {
            let low = candles[i].low;
            if neighbours(i).all(|c| low < c.low) {
                pivots.push(Pivot {
                    price: low,
                    kind: PivotKind::Support,
                    index: i,
                });
            }

            let high = candles[i].high;
            if neighbours(i).all(|c| high > c.high) {
                pivots.push(Pivot {
                    price: high,
                    kind: PivotKind::Resistance,
                    index: i,
                });
            }
        }
        pivots
    }

    /// Group ascending prices: a price joins the last cluster when its
    /// relative distance from that cluster's running mean is below `tolerance`.
    pub fn cluster(&self, mut prices: Vec<f64>) -> Vec<Cluster> {
        prices.sort_by(f64::total_cmp);

        let mut clusters: Vec<Cluster> = Vec::new();
        for price in prices {
            match clusters.last_mut() {
                Some(last) if ((price - last.mean()).abs() / last.mean()) < self.tolerance => {
                    last.members.push(price);
                }
                _ => clusters.push(Cluster::new(price)),
            }
        }
        clusters
    }

    /// Representatives of the `max_levels` largest clusters. Equal-sized
    /// clusters keep their ascending price order.
    fn strongest_levels(&self, prices: Vec<f64>) -> Vec<f64> {
        let mut clusters = self.cluster(prices);
        clusters.sort_by(|a, b| b.members.len().cmp(&a.members.len()));
        clusters
            .iter()
            .take(self.max_levels)
            .map(Cluster::representative)
            .collect()
    }
}

impl Default for LevelDetector {
    fn default() -> Self {
        Self::new(2, 0.02, 3)
    }
}
