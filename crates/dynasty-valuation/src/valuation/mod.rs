// Valuation engine: market lookups, pick values, lineups, age windows,
// composite ranking, archetypes, and needs matching.

pub mod age_curve;
pub mod archetype;
pub mod composite;
pub mod lineup;
pub mod market;
pub mod needs;
pub mod picks;
pub mod window;

use tracing::warn;

use crate::league::position::Position;
use crate::league::snapshot::PlayerRecord;
use crate::league::team::{RosteredPlayer, ScoringFormat, Team};
use crate::valuation::market::MarketValues;

use std::collections::HashMap;

/// A team's players with values applied, plus how many had a market value.
#[derive(Debug, Clone, Default)]
pub struct ValuedRoster {
    pub players: Vec<RosteredPlayer>,
    pub valued: usize,
    /// Every id on the roster, including players left out for lacking a
    /// position.
    pub rostered: usize,
}

impl ValuedRoster {
    /// Share of rostered players with a market value, 0-100. An empty
    /// roster is fully covered.
    pub fn coverage_pct(&self) -> f64 {
        if self.rostered == 0 {
            100.0
        } else {
            self.valued as f64 / self.rostered as f64 * 100.0
        }
    }
}

/// Resolve every player on `team` against the identity records and the
/// market dataset.
///
/// Identity records win for name, position and age; the market entry fills
/// in whatever they lack. A player whose position cannot be resolved from
/// either source is left out of the roster but still counts against its
/// coverage.
pub fn value_roster(
    team: &Team,
    records: &HashMap<String, PlayerRecord>,
    market: &MarketValues,
    as_of_year: u16,
    format: ScoringFormat,
) -> ValuedRoster {
    let mut roster = ValuedRoster::default();

    for player_id in &team.player_ids {
        roster.rostered += 1;
        let record = records.get(player_id);
        let entry = market.lookup(player_id, as_of_year);

        let position = record
            .and_then(|r| Position::from_str_pos(&r.position))
            .or_else(|| entry.and_then(|e| e.position));
        let Some(position) = position else {
            warn!(
                "roster {}: player {} has no known position, skipping",
                team.roster_id, player_id
            );
            continue;
        };

        let age = record.and_then(|r| r.age).or_else(|| entry.and_then(|e| e.age));
        let value = entry.and_then(|e| e.value_for(format, position));
        if value.is_some() {
            roster.valued += 1;
        }

        roster.players.push(RosteredPlayer {
            player_id: player_id.clone(),
            name: record
                .map(|r| r.name.clone())
                .unwrap_or_else(|| player_id.clone()),
            position,
            age,
            value,
        });
    }

    roster
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::team::TeamRecord;
    use crate::valuation::market::MarketEntry;

    fn team(ids: &[&str]) -> Team {
        Team {
            roster_id: 1,
            owner_id: None,
            display_name: "Alpha".into(),
            record: TeamRecord::default(),
            player_ids: ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn record(name: &str, pos: &str, age: Option<f64>) -> PlayerRecord {
        PlayerRecord {
            name: name.into(),
            position: pos.into(),
            age,
        }
    }

    #[test]
    fn combines_identity_and_market_data() {
        let mut records = HashMap::new();
        records.insert("1".to_string(), record("Starter QB", "QB", Some(27.0)));
        records.insert("2".to_string(), record("Unvalued WR", "WR", None));

        let mut market = MarketValues::default();
        market.insert(
            "1",
            2025,
            MarketEntry {
                value: Some(4000),
                value_superflex: Some(7000),
                ..Default::default()
            },
        );
        market.insert(
            "3",
            2025,
            MarketEntry {
                position: Some(Position::RunningBack),
                age: Some(23.0),
                value: Some(2500),
                ..Default::default()
            },
        );

        let format = ScoringFormat {
            superflex: true,
            te_premium: false,
        };
        let roster = value_roster(&team(&["1", "2", "3"]), &records, &market, 2025, format);

        assert_eq!(roster.players.len(), 3);
        assert_eq!(roster.valued, 2);
        assert_eq!(roster.players[0].value, Some(7000));
        assert_eq!(roster.players[1].value, None);
        assert_eq!(roster.players[2].position, Position::RunningBack);
        assert_eq!(roster.players[2].age, Some(23.0));
        assert_eq!(roster.players[2].name, "3");
        assert!((roster.coverage_pct() - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_position_is_skipped() {
        let mut records = HashMap::new();
        records.insert("9".to_string(), record("Mystery", "FB", None));
        let roster = value_roster(
            &team(&["9"]),
            &records,
            &MarketValues::default(),
            2025,
            ScoringFormat::default(),
        );
        assert!(roster.players.is_empty());
        assert_eq!(roster.rostered, 1);
        assert_eq!(roster.coverage_pct(), 0.0);
    }

    #[test]
    fn unresolvable_players_dilute_coverage() {
        let mut market = MarketValues::default();
        let known: Vec<String> = (0..9).map(|i| format!("k{i}")).collect();
        for id in &known {
            market.insert(
                id,
                2025,
                MarketEntry {
                    position: Some(Position::WideReceiver),
                    value: Some(1000),
                    ..Default::default()
                },
            );
        }
        let mut ids: Vec<&str> = known.iter().map(String::as_str).collect();
        let unknown: Vec<String> = (0..9).map(|i| format!("ghost{i}")).collect();
        ids.extend(unknown.iter().map(String::as_str));

        let roster = value_roster(
            &team(&ids),
            &HashMap::new(),
            &market,
            2025,
            ScoringFormat::default(),
        );
        assert_eq!(roster.players.len(), 9);
        assert_eq!(roster.valued, 9);
        assert_eq!(roster.rostered, 18);
        assert_eq!(roster.coverage_pct(), 50.0);
    }

    #[test]
    fn empty_roster_is_fully_covered() {
        let roster = value_roster(
            &team(&[]),
            &HashMap::new(),
            &MarketValues::default(),
            2025,
            ScoringFormat::default(),
        );
        assert_eq!(roster.rostered, 0);
        assert_eq!(roster.coverage_pct(), 100.0);
    }
}
