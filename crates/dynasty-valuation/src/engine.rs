// Per-league valuation pipeline and the multi-league fan-out.
//
// Stage order within one league:
// 1. Starter template check (the only hard failure besides lookups)
// 2. Rosters valued against the market dataset
// 3. Lineups, then strength ranks from starters value
// 4. Pick ownership resolved and picks valued
// 5. Contention windows
// 6. Composite ranking, archetypes, needs and trade matches

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::league::picks::{resolve_ownership, PickHorizon, PickSlot, MAX_TRACKED_ROUND};
use crate::league::position::Position;
use crate::league::snapshot::LeagueSnapshot;
use crate::league::team::{ScoringFormat, TeamRecord};
use crate::valuation::archetype::{classify, Archetype, ArchetypeInputs};
use crate::valuation::composite::{
    component_stats, rank_by_value, rank_teams, CompositeWeights, ComponentStats, Components,
    TeamComponents,
};
use crate::valuation::lineup::{build_lineup, Lineup};
use crate::valuation::market::{MarketValues, PickValueTable};
use crate::valuation::needs::{assess_team, match_surplus, needed_slots, NeedsConfig, TeamNeeds, TradeMatch};
use crate::valuation::picks::{value_pick, PickTier, ValueSource, ValuedPick};
use crate::valuation::value_roster;
use crate::valuation::window::{score_window, WindowReport};

/// Coverage below this share of rostered players is logged as low confidence.
const LOW_COVERAGE_PCT: f64 = 50.0;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("league {league_id} has no starter slots to fill")]
    EmptyStarterTemplate { league_id: String },

    #[error("team {team_id} not found in league {league_id}")]
    TeamNotFound { league_id: String, team_id: u32 },

    #[error("valuation task for league {league_id} did not complete: {message}")]
    TaskFailed { league_id: String, message: String },
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Caller-supplied knobs for one valuation run.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    /// Season the valuation runs as of. Falls back to the snapshot's season,
    /// then to the current calendar year.
    pub season: Option<u16>,
    pub lookahead_years: u16,
    pub tracked_rounds: u8,
    pub weights: CompositeWeights,
    pub needs: NeedsConfig,
    /// Attach the diagnostics payload to each result.
    pub debug: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            season: None,
            lookahead_years: 2,
            tracked_rounds: MAX_TRACKED_ROUND,
            weights: CompositeWeights::default(),
            needs: NeedsConfig::default(),
            debug: false,
        }
    }
}

impl EngineOptions {
    fn season_for(&self, snapshot: &LeagueSnapshot) -> u16 {
        self.season
            .or(snapshot.season)
            .unwrap_or_else(|| Utc::now().year().clamp(0, i32::from(u16::MAX)) as u16)
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Owned picks in one (year, round) bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickCount {
    pub year: u16,
    pub round: u8,
    pub count: u32,
}

/// Everything computed for one team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamValuation {
    pub roster_id: u32,
    pub owner_id: Option<String>,
    pub display_name: String,
    pub record: TeamRecord,

    pub lineup: Lineup,
    pub starters_value: u64,
    pub bench_value: u64,
    pub picks_value: u64,
    pub pick_counts: Vec<PickCount>,
    pub picks: Vec<ValuedPick>,
    pub window: WindowReport,

    pub raw: Components,
    pub percentiles: Components,
    pub composite: f64,
    /// Overall rank, 1 = best.
    pub rank: usize,
    pub starters_rank: usize,
    pub picks_rank: usize,

    pub archetype: Archetype,
    pub needs: TeamNeeds,
    /// Share of rostered players with a market value, 0-100.
    pub coverage_pct: f64,
}

impl TeamValuation {
    pub fn shallow(&self) -> &BTreeSet<Position> {
        &self.needs.shallow
    }

    pub fn surplus(&self) -> &BTreeSet<Position> {
        &self.needs.surplus
    }

    /// Owned picks in the (year, round) bucket, zero when untracked.
    pub fn picks_owned(&self, year: u16, round: u8) -> u32 {
        self.pick_counts
            .iter()
            .find(|c| c.year == year && c.round == round)
            .map(|c| c.count)
            .unwrap_or(0)
    }
}

/// Tier assigned to one pick slot, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierAssignment {
    pub slot: PickSlot,
    pub owner_rank: usize,
    pub tier: PickTier,
    pub source: ValueSource,
}

/// Optional diagnostics. Never needed for the ranking itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebugPayload {
    pub tier_assignments: Vec<TierAssignment>,
    /// Raw min/max/median per component, keyed by component name.
    pub component_stats: BTreeMap<String, ComponentStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueValuation {
    pub league_id: String,
    pub league_name: String,
    pub season: u16,
    pub computed_at: DateTime<Utc>,
    pub format: ScoringFormat,
    /// Ordered best to worst.
    pub teams: Vec<TeamValuation>,
    pub matches: Vec<TradeMatch>,
    #[serde(default)]
    pub debug: Option<DebugPayload>,
}

impl LeagueValuation {
    pub fn team(&self, team_id: u32) -> Result<&TeamValuation, EngineError> {
        self.teams
            .iter()
            .find(|t| t.roster_id == team_id)
            .ok_or_else(|| EngineError::TeamNotFound {
                league_id: self.league_id.clone(),
                team_id,
            })
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Value every team in one league.
///
/// Missing data never fails the run: unvalued players count as zero, missing
/// pick-table entries use the fallback table, and an empty league yields an
/// empty ranking. Only an empty starter template is an error.
pub fn value_league(
    snapshot: &LeagueSnapshot,
    market: &MarketValues,
    pick_table: &PickValueTable,
    options: &EngineOptions,
) -> Result<LeagueValuation, EngineError> {
    let template = snapshot.starter_template();
    if template.is_empty() {
        return Err(EngineError::EmptyStarterTemplate {
            league_id: snapshot.league_id.clone(),
        });
    }

    let season = options.season_for(snapshot);
    let format = snapshot.scoring_format();
    let num_teams = snapshot.teams.len();
    info!(
        "valuing league {} ({} teams, season {}, superflex={}, te_premium={})",
        snapshot.league_id, num_teams, season, format.superflex, format.te_premium
    );

    // Rosters and lineups.
    let mut rosters = Vec::with_capacity(num_teams);
    let mut lineups = Vec::with_capacity(num_teams);
    for team in &snapshot.teams {
        let roster = value_roster(team, &snapshot.players, market, season, format);
        let coverage = roster.coverage_pct();
        if coverage < LOW_COVERAGE_PCT {
            warn!(
                "league {}: roster {} has low value coverage ({:.1}%)",
                snapshot.league_id, team.roster_id, coverage
            );
        }
        lineups.push(build_lineup(&roster.players, &template));
        rosters.push(roster);
    }

    let starters: Vec<(u32, f64)> = snapshot
        .teams
        .iter()
        .zip(&lineups)
        .map(|(t, l)| (t.roster_id, l.starters_value as f64))
        .collect();
    let strength = rank_by_value(&starters);

    // Draft capital.
    let horizon = PickHorizon::new(season, options.lookahead_years, options.tracked_rounds);
    let ledger = resolve_ownership(&snapshot.teams, &snapshot.traded_picks, horizon);
    let mut picks_by_owner: HashMap<u32, Vec<ValuedPick>> = HashMap::new();
    for (slot, owner) in ledger.slots() {
        let owner_rank = strength.get(&slot.original_owner).copied().unwrap_or(num_teams);
        let valued = value_pick(
            *slot,
            owner,
            owner_rank,
            num_teams,
            season,
            pick_table,
            format.superflex,
        );
        picks_by_owner.entry(owner).or_default().push(valued);
    }

    // Windows and raw components.
    let windows: Vec<WindowReport> = rosters.iter().map(|r| score_window(&r.players)).collect();
    let components: Vec<TeamComponents> = snapshot
        .teams
        .iter()
        .enumerate()
        .map(|(i, team)| {
            let picks_value: u64 = picks_by_owner
                .get(&team.roster_id)
                .map(|p| p.iter().map(|v| u64::from(v.value)).sum())
                .unwrap_or(0);
            TeamComponents {
                roster_id: team.roster_id,
                raw: Components {
                    starters: lineups[i].starters_value as f64,
                    bench: lineups[i].bench_value as f64,
                    picks: picks_value as f64,
                    window: windows[i].window_score,
                    age: windows[i].age_score,
                },
            }
        })
        .collect();

    let ranked = rank_teams(&components, &options.weights);
    let picks_rank = rank_by_value(
        &components
            .iter()
            .map(|c| (c.roster_id, c.raw.picks))
            .collect::<Vec<_>>(),
    );

    // Needs are assessed in league order so matches come out deterministic.
    let needed = needed_slots(&template);
    let all_needs: Vec<TeamNeeds> = snapshot
        .teams
        .iter()
        .zip(&lineups)
        .map(|(t, l)| assess_team(t.roster_id, l, &needed, &options.needs))
        .collect();
    let matches = match_surplus(&all_needs, &options.needs);

    let index: HashMap<u32, usize> = snapshot
        .teams
        .iter()
        .enumerate()
        .map(|(i, t)| (t.roster_id, i))
        .collect();

    let mut teams = Vec::with_capacity(ranked.len());
    for r in &ranked {
        let Some(&i) = index.get(&r.roster_id) else {
            continue;
        };
        let team = &snapshot.teams[i];
        let window = windows[i].clone();
        let archetype = classify(&ArchetypeInputs {
            starters_percentile: r.percentiles.starters,
            picks_percentile: r.percentiles.picks,
            window_score: window.window_score,
            average_prime_years: window.average_prime_years,
        });
        debug!(
            "league {}: roster {} rank {} composite {:.1} ({})",
            snapshot.league_id, r.roster_id, r.rank, r.composite, archetype
        );

        let mut picks = picks_by_owner.remove(&r.roster_id).unwrap_or_default();
        picks.sort_by(|a, b| a.slot.cmp(&b.slot));

        teams.push(TeamValuation {
            roster_id: team.roster_id,
            owner_id: team.owner_id.clone(),
            display_name: team.display_name.clone(),
            record: team.record,
            lineup: lineups[i].clone(),
            starters_value: lineups[i].starters_value,
            bench_value: lineups[i].bench_value,
            picks_value: r.raw.picks as u64,
            pick_counts: ledger
                .counts_for(team.roster_id)
                .into_iter()
                .map(|((year, round), count)| PickCount { year, round, count })
                .collect(),
            picks,
            window,
            raw: r.raw,
            percentiles: r.percentiles,
            composite: r.composite,
            rank: r.rank,
            starters_rank: strength.get(&team.roster_id).copied().unwrap_or(num_teams),
            picks_rank: picks_rank.get(&team.roster_id).copied().unwrap_or(num_teams),
            archetype,
            needs: all_needs[i].clone(),
            coverage_pct: rosters[i].coverage_pct(),
        });
    }

    let debug = options.debug.then(|| debug_payload(&teams, &components));

    info!(
        "league {}: ranked {} teams, {} trade suggestions",
        snapshot.league_id,
        teams.len(),
        matches.len()
    );

    Ok(LeagueValuation {
        league_id: snapshot.league_id.clone(),
        league_name: snapshot.name.clone(),
        season,
        computed_at: Utc::now(),
        format,
        teams,
        matches,
        debug,
    })
}

fn debug_payload(teams: &[TeamValuation], components: &[TeamComponents]) -> DebugPayload {
    let mut tier_assignments: Vec<TierAssignment> = teams
        .iter()
        .flat_map(|t| t.picks.iter())
        .map(|p| TierAssignment {
            slot: p.slot,
            owner_rank: p.owner_rank,
            tier: p.tier,
            source: p.source,
        })
        .collect();
    tier_assignments.sort_by(|a, b| a.slot.cmp(&b.slot));

    let column = |f: fn(&Components) -> f64| -> Vec<f64> { components.iter().map(|c| f(&c.raw)).collect() };
    let stats = [
        ("starters", column(|c| c.starters)),
        ("bench", column(|c| c.bench)),
        ("picks", column(|c| c.picks)),
        ("window", column(|c| c.window)),
        ("age", column(|c| c.age)),
    ]
    .into_iter()
    .map(|(name, values)| (name.to_string(), component_stats(&values)))
    .collect();

    DebugPayload {
        tier_assignments,
        component_stats: stats,
    }
}

// ---------------------------------------------------------------------------
// Fan-out
// ---------------------------------------------------------------------------

/// Value several leagues concurrently, one blocking worker per league.
///
/// Results come back in the order the snapshots were given. The datasets are
/// shared read-only between workers.
pub async fn value_leagues(
    snapshots: Vec<LeagueSnapshot>,
    market: Arc<MarketValues>,
    pick_table: Arc<PickValueTable>,
    options: EngineOptions,
) -> Vec<Result<LeagueValuation, EngineError>> {
    let options = Arc::new(options);
    let mut results: Vec<Result<LeagueValuation, EngineError>> = snapshots
        .iter()
        .map(|s| {
            Err(EngineError::TaskFailed {
                league_id: s.league_id.clone(),
                message: "worker did not report".into(),
            })
        })
        .collect();

    let mut set = JoinSet::new();
    for (idx, snapshot) in snapshots.into_iter().enumerate() {
        let market = Arc::clone(&market);
        let pick_table = Arc::clone(&pick_table);
        let options = Arc::clone(&options);
        set.spawn_blocking(move || (idx, value_league(&snapshot, &market, &pick_table, &options)));
    }

    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((idx, result)) => results[idx] = result,
            Err(e) => error!("valuation worker failed: {}", e),
        }
    }

    results
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
