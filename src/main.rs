use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use chrono::{NaiveDate, Utc};

use matchday_edge::api_client::ApiFootballClient;
use matchday_edge::day_report::{compute_day_projections, compute_obvious_games};
use matchday_edge::fake_feed::OfflineFixtureSource;
use matchday_edge::fixture_source::{FixtureSource, Recency};
use matchday_edge::projection::ProjectionSettings;
use matchday_edge::projection_store;
use matchday_edge::render;
use matchday_edge::ttl_cache::{DEFAULT_TTL_SECS, TtlCache};

// Brasileirão Série A + Série B.
const DEFAULT_LEAGUE_IDS: &[u32] = &[71, 72];
const DEFAULT_PROJECTION_LEAGUE: u32 = 72;
const DEFAULT_FORM_WINDOW: u32 = 5;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    if let Ok(raw) = std::env::var("FETCH_THREADS") {
        if let Ok(threads) = raw.trim().parse::<usize>() {
            let _ = rayon::ThreadPoolBuilder::new()
                .num_threads(threads.clamp(1, 32))
                .build_global();
        }
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        print_usage();
        return Ok(());
    };

    let cfg = ProjectionSettings::from_env();
    match command.as_str() {
        "fixtures" => cmd_fixtures(&args),
        "day" => cmd_day(&args, &cfg),
        "obvious" => cmd_obvious(&args, &cfg),
        "team" => cmd_team(&args),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => Err(anyhow!("unknown command '{other}' (try 'help')")),
    }
}

fn cmd_fixtures(args: &[String]) -> Result<()> {
    let source = build_source(args)?;
    let league_id = flag_u32(args, "--league").unwrap_or(DEFAULT_PROJECTION_LEAGUE);
    let date = parse_date_flag(args)?;

    let fixtures = source.fixtures_by_league_date(league_id, date)?;
    if fixtures.is_empty() {
        println!("No fixtures for league {league_id} on {date}.");
        return Ok(());
    }
    println!("Fixtures — league {league_id} — {date}:");
    for fx in &fixtures {
        println!("- {}", render::fixture_line(fx));
    }
    Ok(())
}

fn cmd_day(args: &[String], cfg: &ProjectionSettings) -> Result<()> {
    let source = build_source(args)?;
    let league_id = flag_u32(args, "--league").unwrap_or(DEFAULT_PROJECTION_LEAGUE);
    let date = parse_date_flag(args)?;
    let last_n = flag_u32(args, "--last").unwrap_or(DEFAULT_FORM_WINDOW);
    let h2h_last = flag_u32(args, "--h2h-last").unwrap_or(cfg.h2h_last);

    let report = compute_day_projections(source.as_ref(), league_id, date, last_n, h2h_last, cfg)?;

    println!("{}", render::projection_lines(&report));
    for err in &report.errors {
        eprintln!("[WARN] {err}");
    }

    if !has_flag(args, "--no-store") && !report.games.is_empty() {
        let db_path = flag_value(args, "--db")
            .map(PathBuf::from)
            .or_else(projection_store::default_db_path)
            .context("unable to resolve sqlite path")?;
        let mut conn = projection_store::open_db(&db_path)?;
        let saved = projection_store::save_day(&mut conn, &report)?;
        let total = projection_store::count_for_date(&conn, &report.date)?;
        println!();
        println!(
            "Stored {saved} projections in {} ({} rows for {})",
            db_path.display(),
            total,
            report.date
        );
    }
    Ok(())
}

fn cmd_obvious(args: &[String], cfg: &ProjectionSettings) -> Result<()> {
    let source = build_source(args)?;
    let league_ids = flag_value(args, "--leagues")
        .map(|raw| parse_ids(&raw))
        .filter(|ids| !ids.is_empty())
        .unwrap_or_else(|| DEFAULT_LEAGUE_IDS.to_vec());
    let date = parse_date_flag(args)?;
    let last_n = flag_u32(args, "--last").unwrap_or(DEFAULT_FORM_WINDOW);
    let h2h_last = flag_u32(args, "--h2h-last").unwrap_or(cfg.obvious_h2h_last);
    let min_strength = flag_value(args, "--min-strength")
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .unwrap_or(cfg.min_strength);

    let report = compute_obvious_games(
        source.as_ref(),
        &league_ids,
        date,
        last_n,
        h2h_last,
        min_strength,
        cfg,
    )?;

    println!(
        "Obvious games — {} — min strength {:.0}%:",
        report.date,
        report.min_strength * 100.0
    );
    println!("{}", render::obvious_table(&report.games));
    println!();
    println!("{} of the day's fixtures cleared the bar.", report.count);
    for err in &report.errors {
        eprintln!("[WARN] {err}");
    }
    Ok(())
}

fn cmd_team(args: &[String]) -> Result<()> {
    let source = build_source(args)?;
    let team_id = flag_u32(args, "--id").context("team command requires --id <team id>")?;
    let (count, direction) = if let Some(n) = flag_u32(args, "--next") {
        (n, Recency::Future)
    } else {
        (flag_u32(args, "--last").unwrap_or(DEFAULT_FORM_WINDOW), Recency::Past)
    };

    let fixtures = source.fixtures_by_team_recency(team_id, count, direction)?;
    if fixtures.is_empty() {
        println!("No fixtures found for team {team_id}.");
        return Ok(());
    }
    for (idx, fx) in fixtures.iter().enumerate() {
        println!("{}. {}", idx + 1, render::fixture_line(fx));
    }
    Ok(())
}

fn build_source(args: &[String]) -> Result<Box<dyn FixtureSource + Sync>> {
    if has_flag(args, "--offline") {
        return Ok(Box::new(OfflineFixtureSource::new()));
    }
    match std::env::var("APIFOOTBALL_KEY") {
        Ok(key) if !key.trim().is_empty() => {
            let ttl = std::env::var("FIXTURE_CACHE_TTL_SECS")
                .ok()
                .and_then(|val| val.parse::<u64>().ok())
                .unwrap_or(DEFAULT_TTL_SECS);
            let cache = TtlCache::new(std::time::Duration::from_secs(ttl));
            Ok(Box::new(ApiFootballClient::new(key.trim(), cache)))
        }
        _ => {
            eprintln!("[WARN] APIFOOTBALL_KEY not set; using the offline fixture feed");
            Ok(Box::new(OfflineFixtureSource::new()))
        }
    }
}

fn parse_date_flag(args: &[String]) -> Result<NaiveDate> {
    match flag_value(args, "--date") {
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .with_context(|| format!("invalid --date '{raw}', expected YYYY-MM-DD")),
        None => Ok(Utc::now().date_naive()),
    }
}

fn flag_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            if !value.trim().is_empty() {
                return Some(value.to_string());
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
        {
            if !next.trim().is_empty() {
                return Some(next.clone());
            }
        }
    }
    None
}

fn flag_u32(args: &[String], name: &str) -> Option<u32> {
    flag_value(args, name).and_then(|raw| raw.trim().parse::<u32>().ok())
}

fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|arg| arg == name)
}

fn parse_ids(raw: &str) -> Vec<u32> {
    let mut seen = std::collections::HashSet::new();
    raw.split([',', ';', ' '])
        .filter_map(|part| part.trim().parse::<u32>().ok())
        .filter(|id| *id != 0)
        .filter(|id| seen.insert(*id))
        .collect()
}

fn print_usage() {
    println!("matchday_edge — heuristic fixture projections");
    println!();
    println!("Usage:");
    println!("  matchday_edge fixtures [--league ID] [--date YYYY-MM-DD] [--offline]");
    println!("  matchday_edge day      [--league ID] [--date YYYY-MM-DD] [--last N]");
    println!("                         [--h2h-last N] [--db PATH] [--no-store] [--offline]");
    println!("  matchday_edge obvious  [--leagues 71,72] [--date YYYY-MM-DD] [--last N]");
    println!("                         [--h2h-last N] [--min-strength 0.75] [--offline]");
    println!("  matchday_edge team     --id TEAM [--last N | --next N] [--offline]");
    println!();
    println!("Set APIFOOTBALL_KEY for live data; thresholds come from EDGE_* env vars.");
}
