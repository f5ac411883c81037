// Greedy starting-lineup construction.
//
// Slots are filled in the league's declared order, each taking the
// highest-valued remaining player it accepts. This is not a global optimum:
// when eligibility sets overlap, a flex slot declared before a dedicated slot
// can take the player the dedicated slot needed.

use serde::{Deserialize, Serialize};

use crate::league::position::StarterSlot;
use crate::league::team::RosteredPlayer;

/// One filled (or unfillable) starter slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineupSlot {
    pub label: String,
    pub player: Option<RosteredPlayer>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lineup {
    pub starters: Vec<LineupSlot>,
    pub starters_value: u64,
    /// Unassigned players, highest value first.
    pub bench: Vec<RosteredPlayer>,
    pub bench_value: u64,
}

impl Lineup {
    /// Players actually starting, in slot order.
    pub fn starting_players(&self) -> impl Iterator<Item = &RosteredPlayer> {
        self.starters.iter().filter_map(|s| s.player.as_ref())
    }

    /// Slots no eligible player could fill.
    pub fn empty_slots(&self) -> usize {
        self.starters.iter().filter(|s| s.player.is_none()).count()
    }
}

/// Partition `players` into starters and bench for `template`.
///
/// Players are stable-sorted by value, so equal values keep roster order.
/// Zero-value players remain eligible.
pub fn build_lineup(players: &[RosteredPlayer], template: &[StarterSlot]) -> Lineup {
    let mut pool: Vec<&RosteredPlayer> = players.iter().collect();
    pool.sort_by(|a, b| b.effective_value().cmp(&a.effective_value()));

    let mut starters = Vec::with_capacity(template.len());
    for slot in template {
        let pick = pool.iter().position(|p| slot.accepts(p.position));
        let player = pick.map(|idx| pool.remove(idx).clone());
        starters.push(LineupSlot {
            label: slot.label.clone(),
            player,
        });
    }

    let starters_value = starters
        .iter()
        .filter_map(|s| s.player.as_ref())
        .map(|p| u64::from(p.effective_value()))
        .sum();
    let bench: Vec<RosteredPlayer> = pool.into_iter().cloned().collect();
    let bench_value = bench.iter().map(|p| u64::from(p.effective_value())).sum();

    Lineup {
        starters,
        starters_value,
        bench,
        bench_value,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
