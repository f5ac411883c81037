// Draft-pick ownership resolution across the league's pick trades.
//
// Every tracked (original owner, year, round) slot starts with its original
// owner. Each traded-pick record is a current-state declaration of who holds
// that slot, so records are applied as last-write-wins over a keyed map.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::team::Team;

/// Deepest round tracked. Later rounds are not part of the ledger.
pub const MAX_TRACKED_ROUND: u8 = 4;

/// A draft pick identified by its original owner, season, and round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PickSlot {
    pub original_owner: u32,
    pub year: u16,
    pub round: u8,
}

/// A traded-pick record from the provider. States the owner of a slot as of
/// that trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub original_owner: u32,
    pub year: u16,
    pub round: u8,
    pub new_owner: u32,
    /// Creation time of the trade in milliseconds, when the provider has it.
    #[serde(default)]
    pub created_at: Option<i64>,
}

impl TradeRecord {
    pub fn slot(&self) -> PickSlot {
        PickSlot {
            original_owner: self.original_owner,
            year: self.year,
            round: self.round,
        }
    }
}

/// Which seasons and rounds the ledger covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickHorizon {
    pub current_year: u16,
    pub lookahead_years: u16,
    pub tracked_rounds: u8,
}

impl PickHorizon {
    pub fn new(current_year: u16, lookahead_years: u16, tracked_rounds: u8) -> Self {
        PickHorizon {
            current_year,
            lookahead_years,
            tracked_rounds: tracked_rounds.clamp(1, MAX_TRACKED_ROUND),
        }
    }

    /// Tracked years: the lookahead window plus any later year that one of
    /// `trades` references. Past years are never tracked. Callers pass only
    /// trades that will actually be applied.
    pub fn tracked_years<'a>(
        &self,
        trades: impl IntoIterator<Item = &'a TradeRecord>,
    ) -> BTreeSet<u16> {
        let last = self.current_year.saturating_add(self.lookahead_years);
        let mut years: BTreeSet<u16> = (self.current_year..=last).collect();
        years.extend(
            trades
                .into_iter()
                .map(|t| t.year)
                .filter(|&y| y >= self.current_year),
        );
        years
    }
}

/// Resolved pick ownership for a league.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PickLedger {
    pub years: Vec<u16>,
    pub rounds: u8,
    owners: BTreeMap<PickSlot, u32>,
}

impl PickLedger {
    /// Current owner of a slot, if the slot is tracked.
    pub fn owner_of(&self, slot: &PickSlot) -> Option<u32> {
        self.owners.get(slot).copied()
    }

    /// Every tracked slot with its current owner, in slot order.
    pub fn slots(&self) -> impl Iterator<Item = (&PickSlot, u32)> {
        self.owners.iter().map(|(slot, &owner)| (slot, owner))
    }

    /// Slots currently held by `roster_id`.
    pub fn owned_by(&self, roster_id: u32) -> Vec<PickSlot> {
        self.owners
            .iter()
            .filter(|(_, &owner)| owner == roster_id)
            .map(|(slot, _)| *slot)
            .collect()
    }

    /// Count of slots held by `roster_id`, keyed by (year, round). Every
    /// tracked bucket is present, including empty ones.
    pub fn counts_for(&self, roster_id: u32) -> BTreeMap<(u16, u8), u32> {
        let mut counts: BTreeMap<(u16, u8), u32> = BTreeMap::new();
        for &year in &self.years {
            for round in 1..=self.rounds {
                counts.insert((year, round), 0);
            }
        }
        for (slot, owner) in self.slots() {
            if owner == roster_id {
                *counts.entry((slot.year, slot.round)).or_insert(0) += 1;
            }
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

/// Resolve current ownership of every tracked pick slot.
///
/// Trades are stable-sorted by creation time (untimed records first) and then
/// applied in that order; the last record for a slot wins. Records naming a
/// team outside the league on either side, or a year/round outside the
/// horizon, are dropped.
pub fn resolve_ownership(teams: &[Team], trades: &[TradeRecord], horizon: PickHorizon) -> PickLedger {
    let roster_ids: HashSet<u32> = teams.iter().map(|t| t.roster_id).collect();
    let rounds = horizon.tracked_rounds;

    let mut accepted: Vec<&TradeRecord> = Vec::with_capacity(trades.len());
    for trade in trades {
        if !roster_ids.contains(&trade.original_owner) {
            debug!(
                "dropping trade for pick of unknown roster {} ({} round {})",
                trade.original_owner, trade.year, trade.round
            );
            continue;
        }
        if !roster_ids.contains(&trade.new_owner) {
            warn!(
                "dropping trade moving pick {}/{}/{} to unknown roster {}",
                trade.original_owner, trade.year, trade.round, trade.new_owner
            );
            continue;
        }
        if trade.round == 0 || trade.round > rounds || trade.year < horizon.current_year {
            continue;
        }
        accepted.push(trade);
    }

    // Only applied trades may widen the horizon.
    let years = horizon.tracked_years(accepted.iter().copied());

    let mut owners: BTreeMap<PickSlot, u32> = BTreeMap::new();
    for team in teams {
        for &year in &years {
            for round in 1..=rounds {
                let slot = PickSlot {
                    original_owner: team.roster_id,
                    year,
                    round,
                };
                owners.insert(slot, team.roster_id);
            }
        }
    }

    accepted.sort_by_key(|t| t.created_at.unwrap_or(i64::MIN));
    let applied = accepted.len();
    for trade in accepted {
        owners.insert(trade.slot(), trade.new_owner);
    }

    debug!(
        "resolved {} pick slots ({} trades applied of {})",
        owners.len(),
        applied,
        trades.len()
    );

    PickLedger {
        years: years.into_iter().collect(),
        rounds,
        owners,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
