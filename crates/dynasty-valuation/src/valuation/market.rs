// Market-value datasets: per-player trade values and the draft-pick value
// table.
//
// Both are imported from CSV. Rows that fail to parse are skipped with a
// warning so that a partial dataset still produces a ranking.

use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::league::position::Position;
use crate::league::team::ScoringFormat;
use crate::valuation::picks::PickTier;

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

// ---------------------------------------------------------------------------
// Player market values
// ---------------------------------------------------------------------------

/// One player's market data for one as-of year.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketEntry {
    pub position: Option<Position>,
    pub age: Option<f64>,
    pub value: Option<u32>,
    pub value_superflex: Option<u32>,
    pub value_te_premium: Option<u32>,
}

impl MarketEntry {
    /// Trade value for a player at `position` under `format`.
    ///
    /// Tight ends in TE-premium leagues use the TE-premium variant, everyone
    /// in superflex leagues uses the superflex variant. A missing preferred
    /// variant falls back to the standard value.
    pub fn value_for(&self, format: ScoringFormat, position: Position) -> Option<u32> {
        let preferred = if format.te_premium && position == Position::TightEnd {
            self.value_te_premium
        } else if format.superflex {
            self.value_superflex
        } else {
            self.value
        };
        preferred.or(self.value)
    }
}

/// Per-player market values keyed by player id and as-of year.
#[derive(Debug, Clone, Default)]
pub struct MarketValues {
    entries: HashMap<String, BTreeMap<u16, MarketEntry>>,
}

impl MarketValues {
    pub fn insert(&mut self, player_id: &str, year: u16, entry: MarketEntry) {
        self.entries
            .entry(player_id.to_string())
            .or_default()
            .insert(year, entry);
    }

    /// Entry for `player_id` as of `year`: the exact year when present,
    /// otherwise the latest earlier year.
    pub fn lookup(&self, player_id: &str, year: u16) -> Option<&MarketEntry> {
        self.entries
            .get(player_id)?
            .range(..=year)
            .next_back()
            .map(|(_, entry)| entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct RawMarketRow {
    player_id: String,
    year: u16,
    #[serde(default)]
    position: Option<String>,
    #[serde(default)]
    age: Option<f64>,
    #[serde(default)]
    value: Option<u32>,
    #[serde(default)]
    value_sf: Option<u32>,
    #[serde(default)]
    value_tep: Option<u32>,
}

fn load_market_from_reader<R: Read>(rdr: R) -> Result<MarketValues, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut values = MarketValues::default();
    for result in reader.deserialize::<RawMarketRow>() {
        match result {
            Ok(raw) => {
                let id = raw.player_id.trim();
                if id.is_empty() {
                    warn!("skipping market row without player_id");
                    continue;
                }
                let age = raw.age.filter(|a| a.is_finite() && *a > 0.0);
                values.insert(
                    id,
                    raw.year,
                    MarketEntry {
                        position: raw.position.as_deref().and_then(Position::from_str_pos),
                        age,
                        value: raw.value,
                        value_superflex: raw.value_sf,
                        value_te_premium: raw.value_tep,
                    },
                );
            }
            Err(e) => {
                warn!("skipping malformed market row: {}", e);
            }
        }
    }
    Ok(values)
}

/// Load per-player market values from a CSV file.
pub fn load_market_values(path: &Path) -> Result<MarketValues, DatasetError> {
    let file = std::fs::File::open(path).map_err(|e| DatasetError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_market_from_reader(file).map_err(|e| DatasetError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Pick value table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct PickTableEntry {
    standard: Option<f64>,
    superflex: Option<f64>,
}

/// Draft-pick values keyed by (year, round, tier). May be partially or
/// entirely empty.
#[derive(Debug, Clone, Default)]
pub struct PickValueTable {
    entries: HashMap<(u16, u8, PickTier), PickTableEntry>,
}

impl PickValueTable {
    pub fn insert(&mut self, year: u16, round: u8, tier: PickTier, standard: Option<f64>, superflex: Option<f64>) {
        self.entries
            .insert((year, round, tier), PickTableEntry { standard, superflex });
    }

    /// Table value for the format's column, if the table has one.
    pub fn lookup(&self, year: u16, round: u8, tier: PickTier, superflex: bool) -> Option<f64> {
        let entry = self.entries.get(&(year, round, tier))?;
        if superflex {
            entry.superflex
        } else {
            entry.standard
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct RawPickRow {
    year: u16,
    round: u8,
    tier: String,
    #[serde(default)]
    value: Option<f64>,
    #[serde(default)]
    value_sf: Option<f64>,
}

fn load_pick_table_from_reader<R: Read>(rdr: R) -> Result<PickValueTable, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut table = PickValueTable::default();
    for result in reader.deserialize::<RawPickRow>() {
        match result {
            Ok(raw) => {
                let Some(tier) = PickTier::from_label(&raw.tier) else {
                    warn!("skipping pick row with unknown tier '{}'", raw.tier);
                    continue;
                };
                let finite = |v: Option<f64>| v.filter(|x| x.is_finite() && *x >= 0.0);
                table.insert(raw.year, raw.round, tier, finite(raw.value), finite(raw.value_sf));
            }
            Err(e) => {
                warn!("skipping malformed pick value row: {}", e);
            }
        }
    }
    Ok(table)
}

/// Load the pick value table from a CSV file.
pub fn load_pick_table(path: &Path) -> Result<PickValueTable, DatasetError> {
    let file = std::fs::File::open(path).map_err(|e| DatasetError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_pick_table_from_reader(file).map_err(|e| DatasetError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
