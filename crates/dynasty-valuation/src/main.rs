// Dynasty league ranking entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, stdout carries the report)
// 2. Load config
// 3. Open database
// 4. Load market values and the pick-value table
// 5. Load league snapshots
// 6. Value every league concurrently
// 7. Print rankings and trade suggestions, store snapshots

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};

use dynasty_valuation::config;
use dynasty_valuation::db;
use dynasty_valuation::engine::{self, LeagueValuation};
use dynasty_valuation::league::snapshot;
use dynasty_valuation::valuation::market::{self, PickValueTable};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("dynasty-rank starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    let options = config.engine_options();
    info!(
        "Config loaded: {} league file(s), lookahead {} years, {} rounds",
        config.data_paths.leagues.len(),
        options.lookahead_years,
        options.tracked_rounds
    );

    // 3. Open database
    let db = db::Database::open(&config.db_path).context("failed to open database")?;
    info!("Database opened at {}", config.db_path);

    // 4. Datasets. A missing pick table only means fallback pick values.
    let market_values = market::load_market_values(Path::new(&config.data_paths.market_values))
        .context("failed to load market values")?;
    info!("Loaded {} market value rows", market_values.len());

    let pick_table = match market::load_pick_table(Path::new(&config.data_paths.pick_values)) {
        Ok(table) => {
            info!("Loaded {} pick value rows", table.len());
            table
        }
        Err(e) => {
            warn!("Pick value table unavailable, using fallback values: {}", e);
            PickValueTable::default()
        }
    };

    // 5. League snapshots
    let mut snapshots = Vec::new();
    for path in &config.data_paths.leagues {
        match snapshot::load_snapshot(Path::new(path)) {
            Ok(s) => snapshots.push(s),
            Err(e) => error!("Skipping league file {}: {}", path, e),
        }
    }
    if snapshots.is_empty() {
        anyhow::bail!("no league snapshots could be loaded");
    }

    // 6. Value
    let results = engine::value_leagues(
        snapshots,
        Arc::new(market_values),
        Arc::new(pick_table),
        options,
    )
    .await;

    // 7. Report and persist
    let mut failures = 0usize;
    for result in results {
        match result {
            Ok(valuation) => {
                print_report(&valuation);
                if let Err(e) = db.save_snapshot(&valuation) {
                    error!("Failed to store snapshot for {}: {:#}", valuation.league_id, e);
                }
            }
            Err(e) => {
                failures += 1;
                error!("League valuation failed: {}", e);
                eprintln!("error: {e}");
            }
        }
    }

    info!("dynasty-rank finished ({} failed)", failures);
    Ok(())
}

fn print_report(valuation: &LeagueValuation) {
    println!();
    println!(
        "{} ({}) - season {}{}{}",
        valuation.league_name,
        valuation.league_id,
        valuation.season,
        if valuation.format.superflex { ", superflex" } else { "" },
        if valuation.format.te_premium { ", TE premium" } else { "" },
    );
    println!(
        "{:>4}  {:<24} {:>6} {:>8} {:>7} {:>6} {:>6} {:>5}  {:<20} {:>6}",
        "Rank", "Team", "Score", "Starters", "Bench", "Picks", "Window", "Age", "Archetype", "Cover"
    );
    for team in &valuation.teams {
        println!(
            "{:>4}  {:<24} {:>6.1} {:>8} {:>7} {:>6} {:>6.1} {:>5.1}  {:<20} {:>5.0}%",
            team.rank,
            truncate(&team.display_name, 24),
            team.composite,
            team.starters_value,
            team.bench_value,
            team.picks_value,
            team.window.window_score,
            team.window.age_score,
            team.archetype.label(),
            team.coverage_pct,
        );
    }

    if valuation.matches.is_empty() {
        return;
    }
    println!();
    println!("Trade suggestions:");
    let name = |id: u32| {
        valuation
            .team(id)
            .map(|t| t.display_name.as_str())
            .unwrap_or("?")
    };
    for m in &valuation.matches {
        let back = m
            .reciprocal
            .as_ref()
            .map(|p| format!(" for {} ({} {})", p.name, p.position, p.effective_value()))
            .unwrap_or_default();
        println!(
            "  {} -> {}: {} ({} {}){}",
            name(m.from_roster),
            name(m.to_roster),
            m.player.name,
            m.player.position,
            m.player.effective_value(),
            back
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max - 1).chain(std::iter::once('~')).collect()
    }
}

/// Initialize tracing to log to a file (stdout is reserved for the report).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("dynasty-rank.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("dynasty_valuation=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
