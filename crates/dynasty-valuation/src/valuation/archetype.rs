// Strategic archetype classification.
//
// Rules are checked in a fixed order and the first match wins, so exactly one
// label applies to any input.

use serde::{Deserialize, Serialize};
use std::fmt;

const EPS: f64 = 1e-9;

/// Window score above which a strong starting lineup counts as contending.
const CONTENDER_WINDOW: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Archetype {
    AllInContender,
    FragileContender,
    ProductiveStruggle,
    DeadZone,
    Rebuilder,
}

impl Archetype {
    pub fn label(&self) -> &'static str {
        match self {
            Archetype::AllInContender => "all-in-contender",
            Archetype::FragileContender => "fragile-contender",
            Archetype::ProductiveStruggle => "productive-struggle",
            Archetype::DeadZone => "dead-zone",
            Archetype::Rebuilder => "rebuilder",
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything the classifier looks at. Percentiles are 0-100, higher is
/// stronger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArchetypeInputs {
    pub starters_percentile: f64,
    pub picks_percentile: f64,
    pub window_score: f64,
    pub average_prime_years: f64,
}

impl ArchetypeInputs {
    fn starters_top_third(&self) -> bool {
        self.starters_percentile > 200.0 / 3.0 + EPS
    }

    fn starters_bottom_quarter(&self) -> bool {
        self.starters_percentile <= 25.0 + EPS
    }

    fn starters_at_or_below_median(&self) -> bool {
        self.starters_percentile <= 50.0 + EPS
    }

    fn picks_bottom_half(&self) -> bool {
        self.picks_percentile < 50.0 - EPS
    }
}

pub fn classify(inputs: &ArchetypeInputs) -> Archetype {
    let contending = inputs.starters_top_third() && inputs.window_score > CONTENDER_WINDOW;
    let spent_youth = inputs.average_prime_years >= 2.0 && inputs.picks_bottom_half();

    if contending && spent_youth {
        Archetype::AllInContender
    } else if contending {
        Archetype::FragileContender
    } else if inputs.starters_bottom_quarter()
        || (inputs.average_prime_years < 2.0 && inputs.picks_bottom_half())
    {
        Archetype::Rebuilder
    } else if inputs.starters_at_or_below_median() && inputs.average_prime_years >= 3.0 {
        Archetype::ProductiveStruggle
    } else {
        Archetype::DeadZone
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(starters: f64, picks: f64, window: f64, prime_years: f64) -> ArchetypeInputs {
        ArchetypeInputs {
            starters_percentile: starters,
            picks_percentile: picks,
            window_score: window,
            average_prime_years: prime_years,
        }
    }

    #[test]
    fn strong_young_team_without_picks_is_all_in() {
        assert_eq!(classify(&inputs(100.0, 20.0, 80.0, 3.0)), Archetype::AllInContender);
    }

    #[test]
    fn strong_team_with_picks_is_fragile() {
        assert_eq!(classify(&inputs(90.0, 80.0, 75.0, 3.0)), Archetype::FragileContender);
        assert_eq!(classify(&inputs(90.0, 10.0, 75.0, 1.0)), Archetype::FragileContender);
    }

    #[test]
    fn strong_lineup_with_old_window_is_not_contender() {
        // Window score not above 60 falls through to the later rules.
        assert_eq!(classify(&inputs(100.0, 80.0, 55.0, 1.5)), Archetype::DeadZone);
    }

    #[test]
    fn bottom_quarter_starters_rebuild() {
        assert_eq!(classify(&inputs(11.1, 90.0, 70.0, 4.0)), Archetype::Rebuilder);
    }

    #[test]
    fn old_team_without_picks_rebuilds() {
        assert_eq!(classify(&inputs(55.0, 30.0, 50.0, 1.0)), Archetype::Rebuilder);
    }

    #[test]
    fn young_middling_team_is_productive_struggle() {
        assert_eq!(classify(&inputs(44.4, 70.0, 65.0, 3.5)), Archetype::ProductiveStruggle);
    }

    #[test]
    fn everything_else_is_dead_zone() {
        assert_eq!(classify(&inputs(55.6, 60.0, 58.0, 2.5)), Archetype::DeadZone);
    }

    #[test]
    fn fourth_of_ten_is_not_top_third() {
        let fourth = 6.0 / 9.0 * 100.0;
        assert_eq!(classify(&inputs(fourth, 80.0, 90.0, 3.0)), Archetype::DeadZone);
    }

    #[test]
    fn classification_is_idempotent() {
        let grid = [0.0, 25.0, 44.4, 50.0, 66.7, 77.8, 100.0];
        for &s in &grid {
            for &p in &grid {
                for &w in &[40.0, 60.0, 61.0, 95.0] {
                    for &y in &[0.0, 1.9, 2.0, 3.0, 6.0] {
                        let i = inputs(s, p, w, y);
                        assert_eq!(classify(&i), classify(&i));
                    }
                }
            }
        }
    }

    #[test]
    fn labels_are_kebab_case() {
        assert_eq!(Archetype::AllInContender.to_string(), "all-in-contender");
        assert_eq!(
            serde_json::to_string(&Archetype::ProductiveStruggle).unwrap(),
            "\"productive-struggle\""
        );
    }
}
