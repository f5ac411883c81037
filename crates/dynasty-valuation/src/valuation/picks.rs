// Tiered, time-discounted draft pick valuation.
//
// A pick's tier comes from its original owner's current strength rank:
// weaker teams pick earlier, so their picks land in the more valuable tier.
// Values come from the pick table when it has an entry, otherwise from a
// fixed per-round fallback, and are then discounted by years until the draft.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::league::picks::PickSlot;
use crate::valuation::market::PickValueTable;

// ---------------------------------------------------------------------------
// Tiers
// ---------------------------------------------------------------------------

/// Valuation bucket for a pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickTier {
    /// Owner among the weakest teams. Most valuable.
    Early,
    /// Middle third (round 1 only).
    Mid,
    /// Owner among the strongest teams. Least valuable.
    Late,
    /// Single tier for round 4 and later.
    Any,
}

impl PickTier {
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "early" => Some(PickTier::Early),
            "mid" | "middle" => Some(PickTier::Mid),
            "late" => Some(PickTier::Late),
            "any" | "all" => Some(PickTier::Any),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PickTier::Early => "early",
            PickTier::Mid => "mid",
            PickTier::Late => "late",
            PickTier::Any => "any",
        }
    }
}

/// Tier for a pick in `round` whose original owner has strength `rank`
/// (1 = strongest) among `num_teams`.
///
/// Round 1 splits into thirds, rounds 2-3 into halves, round 4+ is a single
/// tier.
pub fn tier_for(round: u8, rank: usize, num_teams: usize) -> PickTier {
    if num_teams == 0 || round >= 4 {
        return PickTier::Any;
    }
    let idx = rank.clamp(1, num_teams) - 1;
    if round == 1 {
        match idx * 3 / num_teams {
            0 => PickTier::Late,
            1 => PickTier::Mid,
            _ => PickTier::Early,
        }
    } else if idx * 2 / num_teams == 0 {
        PickTier::Late
    } else {
        PickTier::Early
    }
}

// ---------------------------------------------------------------------------
// Fallback values and discounting
// ---------------------------------------------------------------------------

/// Fixed per-round base value used when the table has no entry.
pub fn fallback_value(round: u8, superflex: bool) -> f64 {
    match (round, superflex) {
        (1, false) => 55.0,
        (1, true) => 75.0,
        (2, false) => 30.0,
        (2, true) => 40.0,
        (3, false) => 15.0,
        (3, true) => 20.0,
        (_, false) => 7.0,
        (_, true) => 10.0,
    }
}

/// Multiplier for a pick `years_out` seasons in the future.
pub fn year_discount(years_out: u16) -> f64 {
    match years_out {
        0 => 1.00,
        1 => 0.85,
        2 => 0.72,
        _ => 0.62,
    }
}

// ---------------------------------------------------------------------------
// Valued picks
// ---------------------------------------------------------------------------

/// Where a pick's base value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    Dataset,
    Fallback,
}

/// A pick slot enriched with its computed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuedPick {
    pub slot: PickSlot,
    pub owner: u32,
    pub tier: PickTier,
    /// Strength rank of the original owner used for tiering.
    pub owner_rank: usize,
    pub source: ValueSource,
    pub value: u32,
}

/// Value one owned pick. Never fails: a missing table entry degrades to the
/// fallback table.
pub fn value_pick(
    slot: PickSlot,
    owner: u32,
    owner_rank: usize,
    num_teams: usize,
    current_year: u16,
    table: &PickValueTable,
    superflex: bool,
) -> ValuedPick {
    let tier = tier_for(slot.round, owner_rank, num_teams);
    let (base, source) = match table.lookup(slot.year, slot.round, tier, superflex) {
        Some(v) => (v, ValueSource::Dataset),
        None => {
            debug!(
                "no table value for {} round {} {}; using fallback",
                slot.year,
                slot.round,
                tier.label()
            );
            (fallback_value(slot.round, superflex), ValueSource::Fallback)
        }
    };
    let years_out = slot.year.saturating_sub(current_year);
    let value = (base * year_discount(years_out)).round().max(0.0) as u32;

    ValuedPick {
        slot,
        owner,
        tier,
        owner_rank,
        source,
        value,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
