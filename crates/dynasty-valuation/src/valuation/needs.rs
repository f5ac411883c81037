// Positional needs, surplus, and cross-team trade suggestions.
//
// Needed depth at a position comes from the starter template (a flex slot
// contributes a fraction to each position it accepts) plus a depth buffer.
// Teams below that line are shallow; teams well above it have surplus bench
// players other teams could use.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::league::position::{Position, StarterSlot, SKILL_POSITIONS};
use crate::league::team::RosteredPlayer;
use crate::valuation::lineup::Lineup;

/// Depth thresholds for the needs/surplus arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeedsConfig {
    /// Extra depth wanted at quarterback.
    pub qb_buffer: f64,
    /// Extra depth wanted at RB, WR and TE.
    pub skill_buffer: f64,
    /// How far above needed depth a position must be to count as surplus.
    pub surplus_margin: f64,
    /// Cap on suggested matches per league.
    pub max_matches: usize,
}

impl Default for NeedsConfig {
    fn default() -> Self {
        NeedsConfig {
            qb_buffer: 1.0,
            skill_buffer: 2.0,
            surplus_margin: 2.0,
            max_matches: 10,
        }
    }
}

impl NeedsConfig {
    fn buffer_for(&self, pos: Position) -> f64 {
        if pos == Position::Quarterback {
            self.qb_buffer
        } else {
            self.skill_buffer
        }
    }
}

/// Starter slots needed per skill position, flex slots split evenly across
/// the positions they accept.
pub fn needed_slots(template: &[StarterSlot]) -> BTreeMap<Position, f64> {
    let mut needed: BTreeMap<Position, f64> = SKILL_POSITIONS.iter().map(|&p| (p, 0.0)).collect();
    for slot in template {
        let share = 1.0 / slot.eligible.len() as f64;
        for pos in slot.eligible {
            if let Some(n) = needed.get_mut(pos) {
                *n += share;
            }
        }
    }
    needed
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionDepth {
    pub rostered: usize,
    /// Needed starters plus the depth buffer.
    pub target: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamNeeds {
    pub roster_id: u32,
    pub depth: BTreeMap<Position, PositionDepth>,
    pub shallow: BTreeSet<Position>,
    pub surplus: BTreeSet<Position>,
    /// Bench players offered from surplus positions, highest value first
    /// within each position.
    pub surplus_players: Vec<RosteredPlayer>,
}

/// Work out a team's shallow and surplus positions from its lineup.
pub fn assess_team(roster_id: u32, lineup: &Lineup, needed: &BTreeMap<Position, f64>, config: &NeedsConfig) -> TeamNeeds {
    let mut needs = TeamNeeds {
        roster_id,
        ..Default::default()
    };

    for pos in SKILL_POSITIONS {
        let rostered = lineup
            .starting_players()
            .chain(lineup.bench.iter())
            .filter(|p| p.position == pos)
            .count();
        let target = needed.get(&pos).copied().unwrap_or(0.0) + config.buffer_for(pos);
        needs.depth.insert(pos, PositionDepth { rostered, target });

        let count = rostered as f64;
        if count < target {
            needs.shallow.insert(pos);
        } else if count > target + config.surplus_margin {
            needs.surplus.insert(pos);
            let excess = (count - target - config.surplus_margin).ceil() as usize;
            needs.surplus_players.extend(
                lineup
                    .bench
                    .iter()
                    .filter(|p| p.position == pos)
                    .take(excess)
                    .cloned(),
            );
        }
    }
    needs
}

/// A suggested pairing: `player` moves from a team with surplus to a team
/// that is shallow at the player's position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeMatch {
    pub from_roster: u32,
    pub to_roster: u32,
    pub player: RosteredPlayer,
    /// A surplus player the receiving team could send back at one of the
    /// offering team's shallow positions.
    pub reciprocal: Option<RosteredPlayer>,
}

/// Pair surplus players with shallow teams. Suggestions only; highest-value
/// players first, capped at `config.max_matches`.
pub fn match_surplus(teams: &[TeamNeeds], config: &NeedsConfig) -> Vec<TradeMatch> {
    let mut matches = Vec::new();
    for offering in teams {
        for player in &offering.surplus_players {
            for receiving in teams {
                if receiving.roster_id == offering.roster_id
                    || !receiving.shallow.contains(&player.position)
                {
                    continue;
                }
                let reciprocal = receiving
                    .surplus_players
                    .iter()
                    .find(|p| offering.shallow.contains(&p.position))
                    .cloned();
                matches.push(TradeMatch {
                    from_roster: offering.roster_id,
                    to_roster: receiving.roster_id,
                    player: player.clone(),
                    reciprocal,
                });
            }
        }
    }
    matches.sort_by(|a, b| b.player.effective_value().cmp(&a.player.effective_value()));
    matches.truncate(config.max_matches);
    matches
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
