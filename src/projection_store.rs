use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, params};

use crate::day_report::{DayProjections, GameProjection};

/// Write-side store for computed projections. Every row carries the full
/// projection serialized as JSON next to the queryable columns, so stored
/// results can be audited even after the scoring configuration changes.
pub fn default_db_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join("projections.sqlite"))
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS projections (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            created_at TEXT NOT NULL,
            date_ref TEXT NOT NULL,
            league_id INTEGER NOT NULL,
            fixture_id INTEGER NOT NULL,
            home_id INTEGER NOT NULL,
            away_id INTEGER NOT NULL,
            home TEXT NOT NULL,
            away TEXT NOT NULL,
            under_threshold INTEGER NOT NULL,
            conf_under REAL NOT NULL,
            double_chance TEXT NULL,
            conf_dc REAL NOT NULL,
            avg_total REAL NOT NULL,
            pct_under REAL NOT NULL,
            raw_json TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_projections_date ON projections(date_ref);
        CREATE INDEX IF NOT EXISTS idx_projections_league ON projections(league_id);
        "#,
    )
    .context("create projections schema")?;
    Ok(())
}

pub fn save_day(conn: &mut Connection, report: &DayProjections) -> Result<usize> {
    let tx = conn.transaction().context("begin projections transaction")?;
    let mut saved = 0usize;
    for game in &report.games {
        save_game(&tx, &report.date, game)?;
        saved += 1;
    }
    tx.commit().context("commit projections transaction")?;
    Ok(saved)
}

fn save_game(conn: &Connection, date_ref: &str, game: &GameProjection) -> Result<()> {
    let p = &game.projection;
    let raw_json = serde_json::to_string(p).context("serialize projection")?;
    conn.execute(
        r#"
        INSERT INTO projections (
            created_at, date_ref, league_id, fixture_id, home_id, away_id, home, away,
            under_threshold, conf_under, double_chance, conf_dc, avg_total, pct_under, raw_json
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
        "#,
        params![
            Utc::now().to_rfc3339(),
            date_ref,
            game.info.league_id,
            game.info.fixture_id,
            game.info.home_id,
            game.info.away_id,
            game.info.home,
            game.info.away,
            p.under_threshold as i32,
            p.conf_under,
            p.double_chance.map(|dc| dc.label()),
            p.conf_double_chance,
            p.combined_avg_total,
            p.combined_pct_under,
            raw_json,
        ],
    )
    .context("insert projection row")?;
    Ok(())
}

pub fn count_for_date(conn: &Connection, date_ref: &str) -> Result<u32> {
    let count = conn
        .query_row(
            "SELECT COUNT(*) FROM projections WHERE date_ref = ?1",
            params![date_ref],
            |row| row.get::<_, u32>(0),
        )
        .context("count projections for date")?;
    Ok(count)
}

fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join("matchday_edge"));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join("matchday_edge"))
}
