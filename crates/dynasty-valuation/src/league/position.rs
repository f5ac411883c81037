// Player positions and roster slot eligibility.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Football positions a rostered player can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    Quarterback,
    RunningBack,
    WideReceiver,
    TightEnd,
    Kicker,
    Defense,
    DefensiveLine,
    Linebacker,
    DefensiveBack,
}

/// The four skill positions tracked by the age curve and the needs matcher.
pub const SKILL_POSITIONS: [Position; 4] = [
    Position::Quarterback,
    Position::RunningBack,
    Position::WideReceiver,
    Position::TightEnd,
];

const FLEX: &[Position] = &[Position::RunningBack, Position::WideReceiver, Position::TightEnd];
const WRRB_FLEX: &[Position] = &[Position::RunningBack, Position::WideReceiver];
const REC_FLEX: &[Position] = &[Position::WideReceiver, Position::TightEnd];
const SUPER_FLEX: &[Position] = &[
    Position::Quarterback,
    Position::RunningBack,
    Position::WideReceiver,
    Position::TightEnd,
];
const IDP_FLEX: &[Position] = &[
    Position::DefensiveLine,
    Position::Linebacker,
    Position::DefensiveBack,
];

impl Position {
    /// Parse a provider position string.
    ///
    /// Handles the common aliases: "DST"/"D/ST" -> Defense, "PK" -> Kicker,
    /// "DE"/"DT" -> DefensiveLine, "CB"/"S" -> DefensiveBack.
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "QB" => Some(Position::Quarterback),
            "RB" => Some(Position::RunningBack),
            "WR" => Some(Position::WideReceiver),
            "TE" => Some(Position::TightEnd),
            "K" | "PK" => Some(Position::Kicker),
            "DEF" | "DST" | "D/ST" => Some(Position::Defense),
            "DL" | "DE" | "DT" => Some(Position::DefensiveLine),
            "LB" => Some(Position::Linebacker),
            "DB" | "CB" | "S" => Some(Position::DefensiveBack),
            _ => None,
        }
    }

    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Quarterback => "QB",
            Position::RunningBack => "RB",
            Position::WideReceiver => "WR",
            Position::TightEnd => "TE",
            Position::Kicker => "K",
            Position::Defense => "DEF",
            Position::DefensiveLine => "DL",
            Position::Linebacker => "LB",
            Position::DefensiveBack => "DB",
        }
    }

    pub fn is_skill(&self) -> bool {
        SKILL_POSITIONS.contains(self)
    }

    /// Slot eligibility for the dedicated slot of this position.
    fn own_slot(&self) -> &'static [Position] {
        match self {
            Position::Quarterback => &[Position::Quarterback],
            Position::RunningBack => &[Position::RunningBack],
            Position::WideReceiver => &[Position::WideReceiver],
            Position::TightEnd => &[Position::TightEnd],
            Position::Kicker => &[Position::Kicker],
            Position::Defense => &[Position::Defense],
            Position::DefensiveLine => &[Position::DefensiveLine],
            Position::Linebacker => &[Position::Linebacker],
            Position::DefensiveBack => &[Position::DefensiveBack],
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

// ---------------------------------------------------------------------------
// Slot label resolution
// ---------------------------------------------------------------------------

/// What a roster slot label from league settings stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// A starting slot accepting the listed positions.
    Starter(&'static [Position]),
    /// Bench, injured reserve, or taxi squad.
    Reserve,
    /// A label this resolver does not know.
    Unknown,
}

/// Map a roster slot label to the set of positions it accepts.
///
/// Flex slots accept several positions; `SUPER_FLEX` accepts the quarterback
/// plus every flex-eligible position.
pub fn resolve_slot(label: &str) -> SlotKind {
    let upper = label.trim().to_uppercase();
    match upper.as_str() {
        "BN" | "BE" | "BENCH" | "IR" | "IL" | "TAXI" => SlotKind::Reserve,
        "FLEX" => SlotKind::Starter(FLEX),
        "WRRB_FLEX" | "RB_WR_FLEX" => SlotKind::Starter(WRRB_FLEX),
        "REC_FLEX" | "WRTE_FLEX" => SlotKind::Starter(REC_FLEX),
        "SUPER_FLEX" | "SUPERFLEX" | "OP" => SlotKind::Starter(SUPER_FLEX),
        "IDP_FLEX" => SlotKind::Starter(IDP_FLEX),
        other => match Position::from_str_pos(other) {
            Some(pos) => SlotKind::Starter(pos.own_slot()),
            None => SlotKind::Unknown,
        },
    }
}

/// A starting slot from the league's ordered template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StarterSlot {
    pub label: String,
    pub eligible: &'static [Position],
}

impl StarterSlot {
    pub fn accepts(&self, pos: Position) -> bool {
        self.eligible.contains(&pos)
    }
}

/// Build the ordered starter template from raw slot labels, keeping the
/// league's declared order and dropping reserve and unknown labels.
pub fn starter_template(labels: &[String]) -> Vec<StarterSlot> {
    labels
        .iter()
        .filter_map(|label| match resolve_slot(label) {
            SlotKind::Starter(eligible) => Some(StarterSlot {
                label: label.trim().to_uppercase(),
                eligible,
            }),
            SlotKind::Reserve => None,
            SlotKind::Unknown => {
                tracing::warn!("ignoring unknown roster slot label '{}'", label);
                None
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn from_str_pos_handles_aliases() {
        assert_eq!(Position::from_str_pos("qb"), Some(Position::Quarterback));
        assert_eq!(Position::from_str_pos("DST"), Some(Position::Defense));
        assert_eq!(Position::from_str_pos("CB"), Some(Position::DefensiveBack));
        assert_eq!(Position::from_str_pos("FB"), None);
    }

    #[test]
    fn dedicated_slots_accept_only_their_position() {
        match resolve_slot("TE") {
            SlotKind::Starter(eligible) => assert_eq!(eligible, &[Position::TightEnd]),
            other => panic!("expected starter slot, got {other:?}"),
        }
    }

    #[test]
    fn flex_slot_accepts_rb_wr_te() {
        let SlotKind::Starter(eligible) = resolve_slot("FLEX") else {
            panic!("FLEX should be a starter slot");
        };
        assert!(eligible.contains(&Position::RunningBack));
        assert!(eligible.contains(&Position::WideReceiver));
        assert!(eligible.contains(&Position::TightEnd));
        assert!(!eligible.contains(&Position::Quarterback));
    }

    #[test]
    fn superflex_adds_quarterback_to_flex() {
        let SlotKind::Starter(eligible) = resolve_slot("SUPER_FLEX") else {
            panic!("SUPER_FLEX should be a starter slot");
        };
        assert_eq!(eligible.len(), 4);
        assert!(eligible.contains(&Position::Quarterback));
    }

    #[test]
    fn reserve_labels_are_excluded() {
        for label in ["BN", "IR", "TAXI"] {
            assert_eq!(resolve_slot(label), SlotKind::Reserve, "{label}");
        }
    }

    #[test]
    fn template_keeps_declared_order() {
        let template = starter_template(&labels(&["QB", "FLEX", "RB", "BN", "WR", "XYZ", "IR"]));
        let order: Vec<&str> = template.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(order, vec!["QB", "FLEX", "RB", "WR"]);
    }
}
