// Teams and the players rostered on them for one computation.

use serde::{Deserialize, Serialize};

use super::position::{Position, StarterSlot};

/// Win/loss/tie record plus season points-for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamRecord {
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub ties: u32,
    #[serde(default)]
    pub points_for: f64,
}

/// One roster in the league, as handed over by the provider snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    /// Provider roster id, unique within the league.
    pub roster_id: u32,
    #[serde(default)]
    pub owner_id: Option<String>,
    pub display_name: String,
    #[serde(default)]
    pub record: TeamRecord,
    #[serde(default)]
    pub player_ids: Vec<String>,
}

/// A player on a team's roster with the value lookups already applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosteredPlayer {
    pub player_id: String,
    pub name: String,
    pub position: Position,
    pub age: Option<f64>,
    /// External trade value for the league's scoring format. `None` when the
    /// dataset has no entry for this player.
    pub value: Option<u32>,
}

impl RosteredPlayer {
    /// Value used by every ranking stage. Missing values count as zero.
    pub fn effective_value(&self) -> u32 {
        self.value.unwrap_or(0)
    }
}

/// Scoring-format flags derived from league settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringFormat {
    pub superflex: bool,
    pub te_premium: bool,
}

impl ScoringFormat {
    /// Superflex when the template has a superflex slot or at least two
    /// dedicated quarterback slots. TE premium when tight ends earn a
    /// reception bonus.
    pub fn derive(template: &[StarterSlot], te_reception_bonus: f64) -> Self {
        let superflex_slot = template
            .iter()
            .any(|s| s.eligible.len() > 1 && s.accepts(Position::Quarterback));
        let qb_slots = template
            .iter()
            .filter(|s| s.eligible == [Position::Quarterback])
            .count();
        ScoringFormat {
            superflex: superflex_slot || qb_slots >= 2,
            te_premium: te_reception_bonus > 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::position::starter_template;

    fn template(raw: &[&str]) -> Vec<StarterSlot> {
        let labels: Vec<String> = raw.iter().map(|s| s.to_string()).collect();
        starter_template(&labels)
    }

    #[test]
    fn missing_value_counts_as_zero() {
        let player = RosteredPlayer {
            player_id: "1".into(),
            name: "No Value".into(),
            position: Position::Kicker,
            age: None,
            value: None,
        };
        assert_eq!(player.effective_value(), 0);
    }

    #[test]
    fn superflex_slot_marks_superflex() {
        let format = ScoringFormat::derive(&template(&["QB", "RB", "SUPER_FLEX"]), 0.0);
        assert!(format.superflex);
        assert!(!format.te_premium);
    }

    #[test]
    fn two_qb_slots_mark_superflex() {
        let format = ScoringFormat::derive(&template(&["QB", "QB", "FLEX"]), 0.5);
        assert!(format.superflex);
        assert!(format.te_premium);
    }

    #[test]
    fn single_qb_is_standard() {
        let format = ScoringFormat::derive(&template(&["QB", "RB", "WR", "FLEX"]), 0.0);
        assert_eq!(format, ScoringFormat::default());
    }
}
