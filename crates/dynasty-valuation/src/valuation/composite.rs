// Cross-team percentile normalization and weighted composite ranking.
//
// Every raw component is turned into a percentile rank across the league,
// then combined with the configured weights. Percentiles (not min-max) keep
// the composite robust to outliers and comparable between leagues.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Composite weights. Any non-negative values with a positive total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeWeights {
    pub starters: f64,
    pub bench: f64,
    pub picks: f64,
    pub window: f64,
    pub age: f64,
}

impl Default for CompositeWeights {
    fn default() -> Self {
        CompositeWeights {
            starters: 40.0,
            bench: 10.0,
            picks: 15.0,
            window: 20.0,
            age: 15.0,
        }
    }
}

impl CompositeWeights {
    pub fn total(&self) -> f64 {
        self.starters + self.bench + self.picks + self.window + self.age
    }

    /// Named weights, for validation and display.
    pub fn named(&self) -> [(&'static str, f64); 5] {
        [
            ("starters", self.starters),
            ("bench", self.bench),
            ("picks", self.picks),
            ("window", self.window),
            ("age", self.age),
        ]
    }
}

/// The five ranked components, either raw or as percentiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    pub starters: f64,
    pub bench: f64,
    pub picks: f64,
    pub window: f64,
    pub age: f64,
}

impl Components {
    fn weighted_sum(&self, w: &CompositeWeights) -> f64 {
        self.starters * w.starters
            + self.bench * w.bench
            + self.picks * w.picks
            + self.window * w.window
            + self.age * w.age
    }
}

/// One team's raw components going into the ranker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamComponents {
    pub roster_id: u32,
    pub raw: Components,
}

/// Ranker output for one team.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedTeam {
    pub roster_id: u32,
    pub raw: Components,
    pub percentiles: Components,
    pub composite: f64,
    /// 1 = best.
    pub rank: usize,
}

/// Min/max/median of one raw component across the league.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentStats {
    pub min: f64,
    pub max: f64,
    pub median: f64,
}

// ---------------------------------------------------------------------------
// Percentiles
// ---------------------------------------------------------------------------

/// Percentile rank of every value against its peers.
///
/// Each value scores the share of peers with a different value that sit
/// strictly below it, scaled to 0-100. With all-distinct values this is the
/// fraction of other teams strictly lower. A sole team, or a league where
/// every value is equal, scores 100.
///
/// Tied peers are left out of the denominator, so ties diverge from the
/// plain strictly-lower fraction: a group tied for the top scores 100
/// (two teams tied above a third score 100 each, not 50).
pub fn percentile_ranks(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .map(|&v| {
            let lower = values.iter().filter(|&&o| o < v).count();
            let higher = values.iter().filter(|&&o| o > v).count();
            if lower + higher == 0 {
                100.0
            } else {
                lower as f64 / (lower + higher) as f64 * 100.0
            }
        })
        .collect()
}

pub fn component_stats(values: &[f64]) -> ComponentStats {
    if values.is_empty() {
        return ComponentStats::default();
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let n = sorted.len();
    let median = if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    };
    ComponentStats {
        min: sorted[0],
        max: sorted[n - 1],
        median,
    }
}

/// Rank teams by a single value, highest first (1 = highest). Ties go to the
/// lower roster id.
pub fn rank_by_value(values: &[(u32, f64)]) -> HashMap<u32, usize> {
    let mut order: Vec<(u32, f64)> = values.to_vec();
    order.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    order
        .into_iter()
        .enumerate()
        .map(|(i, (id, _))| (id, i + 1))
        .collect()
}

// ---------------------------------------------------------------------------
// Composite ranking
// ---------------------------------------------------------------------------

fn round_one_decimal(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Normalize, weight, and rank every team.
///
/// Ordered by composite descending; ties go to the higher raw starters
/// value, then to the lower roster id.
pub fn rank_teams(teams: &[TeamComponents], weights: &CompositeWeights) -> Vec<RankedTeam> {
    let column = |f: fn(&Components) -> f64| -> Vec<f64> { teams.iter().map(|t| f(&t.raw)).collect() };
    let starters = percentile_ranks(&column(|c| c.starters));
    let bench = percentile_ranks(&column(|c| c.bench));
    let picks = percentile_ranks(&column(|c| c.picks));
    let window = percentile_ranks(&column(|c| c.window));
    let age = percentile_ranks(&column(|c| c.age));

    let total = weights.total();
    let mut ranked: Vec<RankedTeam> = teams
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let percentiles = Components {
                starters: starters[i],
                bench: bench[i],
                picks: picks[i],
                window: window[i],
                age: age[i],
            };
            let composite = if total > 0.0 {
                round_one_decimal(percentiles.weighted_sum(weights) / total)
            } else {
                0.0
            };
            RankedTeam {
                roster_id: t.roster_id,
                raw: t.raw,
                percentiles,
                composite,
                rank: 0,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.composite
            .partial_cmp(&a.composite)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                b.raw
                    .starters
                    .partial_cmp(&a.raw.starters)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| a.roster_id.cmp(&b.roster_id))
    });
    for (i, team) in ranked.iter_mut().enumerate() {
        team.rank = i + 1;
    }
    ranked
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
