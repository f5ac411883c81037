// Integration tests for the valuation engine.
//
// These tests run the full pipeline through the library crate's public API
// against the ten-team fixture league: pick ownership, ranking, trades,
// persistence, and the concurrent multi-league path.

use std::path::Path;
use std::sync::Arc;

use dynasty_valuation::db::Database;
use dynasty_valuation::engine::{value_league, value_leagues, EngineError, EngineOptions, LeagueValuation};
use dynasty_valuation::league::picks::TradeRecord;
use dynasty_valuation::league::position::Position;
use dynasty_valuation::league::snapshot::{load_snapshot, LeagueSnapshot};
use dynasty_valuation::valuation::archetype::Archetype;
use dynasty_valuation::valuation::market::{load_market_values, load_pick_table, MarketValues, PickValueTable};
use dynasty_valuation::valuation::picks::{PickTier, ValueSource};

// ===========================================================================
// Test helpers
// ===========================================================================

/// Fixture directory path (relative to the crate root, which is the cwd for
/// `cargo test`).
const FIXTURES: &str = "tests/fixtures";

const SEASON: u16 = 2025;

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(FIXTURES).join(name)
}

fn load_league() -> LeagueSnapshot {
    load_snapshot(&fixture("ten_team_league.json")).expect("fixture league should load")
}

fn load_market() -> MarketValues {
    load_market_values(&fixture("market_values.csv")).expect("fixture market values should load")
}

fn load_picks() -> PickValueTable {
    load_pick_table(&fixture("pick_values.csv")).expect("fixture pick table should load")
}

fn options() -> EngineOptions {
    EngineOptions {
        season: Some(SEASON),
        ..Default::default()
    }
}

fn run(snapshot: &LeagueSnapshot, market: &MarketValues) -> LeagueValuation {
    value_league(snapshot, market, &load_picks(), &options()).expect("valuation should succeed")
}

fn trade(original_owner: u32, year: u16, round: u8, new_owner: u32, created_at: Option<i64>) -> TradeRecord {
    TradeRecord {
        original_owner,
        year,
        round,
        new_owner,
        created_at,
    }
}

/// Swap every player value between two rosters, slot for slot.
fn swap_roster_values(snapshot: &LeagueSnapshot, market: &mut MarketValues, a: u32, b: u32) {
    let ids_a = snapshot.team(a).unwrap().player_ids.clone();
    let ids_b = snapshot.team(b).unwrap().player_ids.clone();
    for (pa, pb) in ids_a.iter().zip(&ids_b) {
        let ea = market.lookup(pa, SEASON).unwrap().clone();
        let eb = market.lookup(pb, SEASON).unwrap().clone();
        market.insert(pa, SEASON, eb);
        market.insert(pb, SEASON, ea);
    }
}

// ===========================================================================
// Ten-team league, no trades
// ===========================================================================

#[test]
fn fixture_league_loads() {
    let snapshot = load_league();
    assert_eq!(snapshot.teams.len(), 10);
    assert_eq!(snapshot.starter_template().len(), 7);
    let format = snapshot.scoring_format();
    assert!(!format.superflex);
    assert!(!format.te_premium);
}

#[test]
fn every_team_owns_twelve_baseline_picks() {
    let result = run(&load_league(), &load_market());
    assert_eq!(result.teams.len(), 10);
    for team in &result.teams {
        assert_eq!(team.picks.len(), 12, "roster {}", team.roster_id);
        let owned: u32 = team.pick_counts.iter().map(|c| c.count).sum();
        assert_eq!(owned, 12);
        for year in SEASON..=SEASON + 2 {
            for round in 1..=4 {
                assert_eq!(team.picks_owned(year, round), 1);
            }
        }
        assert!(team.picks.iter().all(|p| p.slot.original_owner == team.roster_id));
    }
}

#[test]
fn strongest_lineup_ranks_first() {
    let result = run(&load_league(), &load_market());

    let first = &result.teams[0];
    assert_eq!(first.roster_id, 1);
    assert_eq!(first.rank, 1);
    assert_eq!(first.starters_rank, 1);
    // QB 3900 + RB 4900/3900 + WR 5900/4400 + TE 3400 + FLEX WR 2900.
    assert_eq!(first.starters_value, 29_300);
    assert_eq!(first.bench_value, 4_100);
    assert_eq!(first.percentiles.starters, 100.0);
    assert_eq!(first.archetype, Archetype::AllInContender);
    assert_eq!(first.coverage_pct, 100.0);

    assert_eq!(result.teams[1].roster_id, 2);
    let ranks: Vec<usize> = result.teams.iter().map(|t| t.rank).collect();
    assert_eq!(ranks, (1..=10).collect::<Vec<_>>());
}

#[test]
fn percentiles_stay_in_range_and_ordered() {
    let result = run(&load_league(), &load_market());
    for a in &result.teams {
        for p in [
            a.percentiles.starters,
            a.percentiles.bench,
            a.percentiles.picks,
            a.percentiles.window,
            a.percentiles.age,
        ] {
            assert!((0.0..=100.0).contains(&p));
        }
        for b in &result.teams {
            if a.raw.starters > b.raw.starters {
                assert!(a.percentiles.starters > b.percentiles.starters);
            }
            if a.raw.picks > b.raw.picks {
                assert!(a.percentiles.picks > b.percentiles.picks);
            }
        }
    }
}

#[test]
fn swapping_values_flips_the_top_two() {
    let snapshot = load_league();
    let mut market = load_market();
    let before = run(&snapshot, &market);
    assert_eq!(before.teams[0].roster_id, 1);
    assert_eq!(before.teams[1].roster_id, 2);

    swap_roster_values(&snapshot, &mut market, 1, 2);
    let after = run(&snapshot, &market);
    assert_eq!(after.teams[0].roster_id, 2);
    assert_eq!(after.teams[1].roster_id, 1);
    assert_eq!(after.team(2).unwrap().starters_value, 29_300);
}

#[test]
fn weak_teams_hold_the_valuable_picks() {
    let result = run(&load_league(), &load_market());
    let first_round_tier = |id: u32| {
        result
            .team(id)
            .unwrap()
            .picks
            .iter()
            .find(|p| p.slot.year == SEASON && p.slot.round == 1)
            .map(|p| p.tier)
            .unwrap()
    };
    assert_eq!(first_round_tier(1), PickTier::Late);
    assert_eq!(first_round_tier(5), PickTier::Mid);
    assert_eq!(first_round_tier(10), PickTier::Early);
    assert!(result.team(10).unwrap().picks_value > result.team(1).unwrap().picks_value);
    assert_eq!(result.team(1).unwrap().picks_rank, 7);
}

#[test]
fn missing_table_years_fall_back() {
    let result = run(&load_league(), &load_market());
    for pick in &result.team(4).unwrap().picks {
        let expected = if pick.slot.year <= SEASON + 1 {
            ValueSource::Dataset
        } else {
            ValueSource::Fallback
        };
        assert_eq!(pick.source, expected, "{:?}", pick.slot);
    }
}

#[test]
fn deep_roster_offers_surplus_to_shallow_teams() {
    let result = run(&load_league(), &load_market());

    let deep = result.team(10).unwrap();
    assert!(deep.surplus().contains(&Position::RunningBack));
    assert_eq!(deep.needs.surplus_players.len(), 2);

    for id in 1..=9 {
        assert!(result.team(id).unwrap().shallow().contains(&Position::RunningBack));
    }

    assert_eq!(result.matches.len(), 10);
    assert!(result.matches.iter().all(|m| m.from_roster == 10));
    assert_eq!(result.matches[0].player.effective_value(), 1500);
    assert_eq!(result.matches[9].player.effective_value(), 600);
}

#[test]
fn unknown_team_is_not_found() {
    let result = run(&load_league(), &load_market());
    match result.team(42) {
        Err(EngineError::TeamNotFound { team_id, league_id }) => {
            assert_eq!(team_id, 42);
            assert_eq!(league_id, "dyn-10");
        }
        other => panic!("expected TeamNotFound, got {other:?}"),
    }
}

#[test]
fn unvalued_market_still_ranks() {
    let result = run(&load_league(), &MarketValues::default());
    assert_eq!(result.teams.len(), 10);
    for team in &result.teams {
        assert_eq!(team.coverage_pct, 0.0);
        assert_eq!(team.starters_value, 0);
        assert_eq!(team.picks.len(), 12);
    }
}

// ===========================================================================
// Trades
// ===========================================================================

#[test]
fn single_trade_moves_one_pick_and_conserves_the_bucket() {
    let mut snapshot = load_league();
    snapshot.traded_picks.push(trade(3, SEASON, 1, 7, Some(1_000)));
    let result = run(&snapshot, &load_market());

    assert_eq!(result.team(3).unwrap().picks_owned(SEASON, 1), 0);
    assert_eq!(result.team(7).unwrap().picks_owned(SEASON, 1), 2);
    let bucket: u32 = result.teams.iter().map(|t| t.picks_owned(SEASON, 1)).sum();
    assert_eq!(bucket, 10);

    // The acquired pick keeps its original owner's tier.
    let acquired = result
        .team(7)
        .unwrap()
        .picks
        .iter()
        .find(|p| p.slot.original_owner == 3 && p.slot.year == SEASON && p.slot.round == 1)
        .unwrap();
    assert_eq!(acquired.owner, 7);
    assert_eq!(acquired.tier, PickTier::Late);
}

#[test]
fn later_trade_wins_regardless_of_list_order() {
    let mut snapshot = load_league();
    snapshot.traded_picks = vec![
        trade(2, SEASON + 1, 2, 9, Some(2_000)),
        trade(2, SEASON + 1, 2, 5, Some(1_000)),
    ];
    let result = run(&snapshot, &load_market());
    assert_eq!(result.team(9).unwrap().picks_owned(SEASON + 1, 2), 2);
    assert_eq!(result.team(5).unwrap().picks_owned(SEASON + 1, 2), 1);
    assert_eq!(result.team(2).unwrap().picks_owned(SEASON + 1, 2), 0);
}

#[test]
fn trade_beyond_lookahead_extends_horizon() {
    let mut snapshot = load_league();
    snapshot.traded_picks.push(trade(1, SEASON + 4, 1, 6, None));
    let result = run(&snapshot, &load_market());

    assert_eq!(result.team(6).unwrap().picks_owned(SEASON + 4, 1), 2);
    assert_eq!(result.team(1).unwrap().picks_owned(SEASON + 4, 1), 0);
    // Every team gains a fourth tracked year.
    assert_eq!(result.team(2).unwrap().picks.len(), 16);
}

#[test]
fn trades_outside_the_league_are_dropped() {
    let mut snapshot = load_league();
    snapshot.traded_picks = vec![trade(99, SEASON, 1, 1, None), trade(1, SEASON, 1, 99, None)];
    let result = run(&snapshot, &load_market());
    for team in &result.teams {
        assert_eq!(team.picks_owned(SEASON, 1), 1);
    }
}

#[test]
fn dropped_far_future_trades_leave_the_horizon_alone() {
    let mut snapshot = load_league();
    snapshot.traded_picks = vec![
        trade(99, SEASON + 5, 1, 1, None),
        trade(1, SEASON + 6, 1, 99, None),
    ];
    let result = run(&snapshot, &load_market());
    for team in &result.teams {
        assert_eq!(team.picks.len(), 12);
        assert_eq!(team.picks_owned(SEASON + 5, 1), 0);
    }
}

// ===========================================================================
// Hard failures and edge cases
// ===========================================================================

#[test]
fn empty_starter_template_fails() {
    let mut snapshot = load_league();
    snapshot.settings.roster_positions = vec!["BN".into(), "TAXI".into()];
    let err = value_league(&snapshot, &load_market(), &load_picks(), &options()).unwrap_err();
    assert!(matches!(err, EngineError::EmptyStarterTemplate { .. }));
}

#[test]
fn empty_league_returns_empty_ranking() {
    let mut snapshot = load_league();
    snapshot.teams.clear();
    let result = run(&snapshot, &load_market());
    assert!(result.teams.is_empty());
    assert!(result.matches.is_empty());
}

#[test]
fn single_team_league_is_top_percentile() {
    let mut snapshot = load_league();
    snapshot.teams.truncate(1);
    let result = run(&snapshot, &load_market());
    let team = &result.teams[0];
    assert_eq!(team.percentiles.starters, 100.0);
    assert_eq!(team.percentiles.bench, 100.0);
    assert_eq!(team.percentiles.picks, 100.0);
    assert_eq!(team.percentiles.window, 100.0);
    assert_eq!(team.percentiles.age, 100.0);
    assert_eq!(team.composite, 100.0);
}

// ===========================================================================
// Persistence and fan-out
// ===========================================================================

#[test]
fn stored_valuation_round_trips() {
    let db = Database::open(":memory:").unwrap();
    let result = run(&load_league(), &load_market());
    db.save_snapshot(&result).unwrap();

    let loaded = db.load_latest_snapshot("dyn-10").unwrap().unwrap();
    assert_eq!(loaded.teams.len(), result.teams.len());
    for (a, b) in loaded.teams.iter().zip(&result.teams) {
        assert_eq!(a.roster_id, b.roster_id);
        assert_eq!(a.rank, b.rank);
        assert_eq!(a.archetype, b.archetype);
        assert_eq!(a.pick_counts, b.pick_counts);
        assert!((a.composite - b.composite).abs() < 1e-9);
    }
    assert_eq!(loaded.matches.len(), result.matches.len());
    assert_eq!(db.snapshot_count("dyn-10").unwrap(), 1);
}

#[tokio::test]
async fn leagues_are_valued_concurrently_in_input_order() {
    let base = load_league();
    let mut snapshots = Vec::new();
    for i in 0..4 {
        let mut s = base.clone();
        s.league_id = format!("league-{i}");
        snapshots.push(s);
    }
    let mut broken = base.clone();
    broken.league_id = "no-starters".into();
    broken.settings.roster_positions.clear();
    snapshots.insert(2, broken);

    let results = value_leagues(
        snapshots,
        Arc::new(load_market()),
        Arc::new(load_picks()),
        options(),
    )
    .await;

    assert_eq!(results.len(), 5);
    let ids: Vec<String> = results
        .iter()
        .map(|r| match r {
            Ok(v) => v.league_id.clone(),
            Err(EngineError::EmptyStarterTemplate { league_id }) => league_id.clone(),
            Err(e) => panic!("unexpected error {e}"),
        })
        .collect();
    assert_eq!(ids, vec!["league-0", "league-1", "no-starters", "league-2", "league-3"]);
    assert!(results[2].is_err());

    let expected = run(&base, &load_market());
    let order = |v: &LeagueValuation| v.teams.iter().map(|t| t.roster_id).collect::<Vec<_>>();
    assert_eq!(order(results[0].as_ref().unwrap()), order(&expected));
}
