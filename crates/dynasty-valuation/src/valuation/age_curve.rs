// Per-position age curves.
//
// Each skill position has a prime window. Ages approaching the window score
// 70-100, ages inside it hold at 90-100, and ages past it decay toward a
// floor at the position's decline rate.

use crate::league::position::Position;

/// Lowest score a past-prime age can reach.
pub const SCORE_FLOOR: f64 = 10.0;

/// Score substituted for a position with no aged players.
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Team-wide age score endpoints: this average age or younger scores 100,
/// `AGE_SCORE_OLD` or older scores 0.
const AGE_SCORE_YOUNG: f64 = 22.0;
const AGE_SCORE_OLD: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgeCurve {
    pub prime_start: f64,
    pub prime_end: f64,
    /// Points lost per year past `prime_end`.
    pub decline_rate: f64,
}

const QB_CURVE: AgeCurve = AgeCurve {
    prime_start: 26.0,
    prime_end: 32.0,
    decline_rate: 12.0,
};
const RB_CURVE: AgeCurve = AgeCurve {
    prime_start: 23.0,
    prime_end: 26.0,
    decline_rate: 20.0,
};
const WR_CURVE: AgeCurve = AgeCurve {
    prime_start: 24.0,
    prime_end: 28.0,
    decline_rate: 15.0,
};
const TE_CURVE: AgeCurve = AgeCurve {
    prime_start: 25.0,
    prime_end: 29.0,
    decline_rate: 15.0,
};

/// Curve for a skill position. Non-skill positions have no curve.
pub fn curve_for(pos: Position) -> Option<AgeCurve> {
    match pos {
        Position::Quarterback => Some(QB_CURVE),
        Position::RunningBack => Some(RB_CURVE),
        Position::WideReceiver => Some(WR_CURVE),
        Position::TightEnd => Some(TE_CURVE),
        _ => None,
    }
}

impl AgeCurve {
    /// First age at which the score starts to decay.
    pub fn decline_start(&self) -> f64 {
        self.prime_end
    }

    pub fn in_prime(&self, age: f64) -> bool {
        age >= self.prime_start && age <= self.prime_end
    }

    /// Years left before the prime window closes. Zero once past it.
    pub fn prime_years_remaining(&self, age: f64) -> f64 {
        (self.prime_end - age).max(0.0)
    }

    /// Map an age to a 0-100 window score.
    pub fn score(&self, age: f64) -> f64 {
        if age < self.prime_start {
            let years_to_prime = self.prime_start - age;
            (100.0 - 10.0 * years_to_prime).max(70.0)
        } else if age <= self.prime_end {
            let span = (self.prime_end - self.prime_start).max(f64::EPSILON);
            100.0 - 10.0 * (age - self.prime_start) / span
        } else {
            (90.0 - self.decline_rate * (age - self.decline_start())).max(SCORE_FLOOR)
        }
    }
}

/// Team-wide age score: 22 or younger maps to 100, 30 or older to 0, linear
/// in between.
pub fn team_age_score(average_age: f64) -> f64 {
    let span = AGE_SCORE_OLD - AGE_SCORE_YOUNG;
    ((AGE_SCORE_OLD - average_age) / span * 100.0).clamp(0.0, 100.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
