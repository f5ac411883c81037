// Contention-window scoring from value-weighted position ages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::league::position::{Position, SKILL_POSITIONS};
use crate::league::team::RosteredPlayer;
use crate::valuation::age_curve::{curve_for, team_age_score, NEUTRAL_SCORE};

/// Window metrics for one position group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionWindow {
    /// Value-weighted average age. `None` when no player at the position has
    /// a known age.
    pub average_age: Option<f64>,
    pub score: f64,
    pub in_prime: bool,
    /// `None` when there is no age signal for the position.
    pub prime_years_remaining: Option<f64>,
    pub players: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowReport {
    pub positions: BTreeMap<Position, PositionWindow>,
    /// Unweighted mean of the four position scores.
    pub window_score: f64,
    /// Mean prime years remaining over positions with an age signal.
    pub average_prime_years: f64,
    /// Team-wide value-weighted average age, if any player has an age.
    pub average_age: Option<f64>,
    /// `average_age` mapped onto 0-100 (younger is higher).
    pub age_score: f64,
}

/// Value-weighted average age. Players without an age are skipped. When all
/// aged players are worthless the average is unweighted.
pub fn weighted_average_age<'a, I>(players: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a RosteredPlayer>,
{
    let aged: Vec<(f64, f64)> = players
        .into_iter()
        .filter_map(|p| p.age.map(|age| (age, f64::from(p.effective_value()))))
        .collect();
    if aged.is_empty() {
        return None;
    }

    let total_weight: f64 = aged.iter().map(|(_, w)| w).sum();
    if total_weight > 0.0 {
        Some(aged.iter().map(|(age, w)| age * w).sum::<f64>() / total_weight)
    } else {
        Some(aged.iter().map(|(age, _)| age).sum::<f64>() / aged.len() as f64)
    }
}

/// Score a team's contention window from every rostered player, not just
/// starters.
pub fn score_window(players: &[RosteredPlayer]) -> WindowReport {
    let mut positions = BTreeMap::new();

    for pos in SKILL_POSITIONS {
        let group: Vec<&RosteredPlayer> = players.iter().filter(|p| p.position == pos).collect();
        let average_age = weighted_average_age(group.iter().copied());

        let window = match (curve_for(pos), average_age) {
            (Some(curve), Some(age)) => PositionWindow {
                average_age: Some(age),
                score: curve.score(age),
                in_prime: curve.in_prime(age),
                prime_years_remaining: Some(curve.prime_years_remaining(age)),
                players: group.len(),
            },
            _ => PositionWindow {
                average_age,
                score: NEUTRAL_SCORE,
                in_prime: false,
                prime_years_remaining: None,
                players: group.len(),
            },
        };
        positions.insert(pos, window);
    }

    let window_score =
        positions.values().map(|w| w.score).sum::<f64>() / SKILL_POSITIONS.len() as f64;

    let remaining: Vec<f64> = positions
        .values()
        .filter_map(|w| w.prime_years_remaining)
        .collect();
    let average_prime_years = if remaining.is_empty() {
        0.0
    } else {
        remaining.iter().sum::<f64>() / remaining.len() as f64
    };

    let average_age = weighted_average_age(players);
    let age_score = average_age.map(team_age_score).unwrap_or(NEUTRAL_SCORE);

    WindowReport {
        positions,
        window_score,
        average_prime_years,
        average_age,
        age_score,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
