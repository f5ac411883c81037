// League snapshots handed over by the data provider / cache layer.
//
// A snapshot is everything one valuation run needs about a league: settings,
// rosters, player identity records, and traded-pick records. The engine never
// fetches; it only reads these.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::picks::TradeRecord;
use super::position::{starter_template, StarterSlot};
use super::team::{ScoringFormat, Team};

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid snapshot JSON in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

/// League settings relevant to valuation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeagueSettings {
    /// Ordered roster slot labels, reserve slots included.
    pub roster_positions: Vec<String>,
    /// Extra points per tight-end reception. Zero for non-premium leagues.
    #[serde(default)]
    pub bonus_rec_te: f64,
}

/// Identity record for a player as stored by the cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    pub position: String,
    #[serde(default)]
    pub age: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueSnapshot {
    pub league_id: String,
    #[serde(default)]
    pub name: String,
    /// Season the snapshot was taken in. Used as the as-of year when the
    /// configuration does not pin one.
    #[serde(default)]
    pub season: Option<u16>,
    pub settings: LeagueSettings,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub players: HashMap<String, PlayerRecord>,
    #[serde(default)]
    pub traded_picks: Vec<TradeRecord>,
}

impl LeagueSnapshot {
    /// Ordered starter slots (bench, IR and taxi dropped).
    pub fn starter_template(&self) -> Vec<StarterSlot> {
        starter_template(&self.settings.roster_positions)
    }

    pub fn scoring_format(&self) -> ScoringFormat {
        ScoringFormat::derive(&self.starter_template(), self.settings.bonus_rec_te)
    }

    pub fn team(&self, roster_id: u32) -> Option<&Team> {
        self.teams.iter().find(|t| t.roster_id == roster_id)
    }
}

fn load_snapshot_from_reader<R: Read>(rdr: R) -> Result<LeagueSnapshot, serde_json::Error> {
    serde_json::from_reader(rdr)
}

/// Load a league snapshot from a JSON file.
pub fn load_snapshot(path: &Path) -> Result<LeagueSnapshot, SnapshotError> {
    let file = std::fs::File::open(path).map_err(|e| SnapshotError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_snapshot_from_reader(std::io::BufReader::new(file)).map_err(|e| SnapshotError::Json {
        path: path.display().to_string(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
