use anyhow::Result;
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;

use crate::fixture::Fixture;
use crate::fixture_source::{FixtureSource, Recency};
use crate::form_stats::{TeamFormStats, compute_form_stats};
use crate::head_to_head::{HeadToHeadStats, compute_h2h};
use crate::obvious::{FixtureForm, ObviousGameEntry, rank_obvious};
use crate::projection::{Projection, ProjectionSettings, project};

/// Echo of the input fixture carried alongside every computed result.
#[derive(Debug, Clone, Serialize)]
pub struct MatchInfo {
    pub fixture_id: u64,
    pub league_id: u32,
    pub league_name: String,
    pub kickoff_utc: String,
    pub home_id: u32,
    pub away_id: u32,
    pub home: String,
    pub away: String,
}

impl MatchInfo {
    fn from_fixture(fx: &Fixture) -> Self {
        Self {
            fixture_id: fx.id,
            league_id: fx.league_id,
            league_name: fx.league_name.clone(),
            kickoff_utc: fx.kickoff_utc.clone(),
            home_id: fx.home.id,
            away_id: fx.away.id,
            home: fx.home.name.clone(),
            away: fx.away.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GameProjection {
    #[serde(rename = "match")]
    pub info: MatchInfo,
    pub projection: Projection,
    pub home_form: TeamFormStats,
    pub away_form: TeamFormStats,
    pub h2h: HeadToHeadStats,
}

/// One league's projected day. `thresholds` is the exact configuration the
/// numbers were computed with, so a stored payload stays auditable.
#[derive(Debug, Serialize)]
pub struct DayProjections {
    pub date: String,
    pub league_id: u32,
    pub games: Vec<GameProjection>,
    pub thresholds: ProjectionSettings,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ObviousReport {
    pub date: String,
    pub count: usize,
    pub min_strength: f64,
    pub games: Vec<ObviousGameEntry>,
    pub errors: Vec<String>,
}

pub fn compute_day_projections(
    source: &(dyn FixtureSource + Sync),
    league_id: u32,
    date: NaiveDate,
    last_n: u32,
    h2h_last: u32,
    cfg: &ProjectionSettings,
) -> Result<DayProjections> {
    let fixtures = source.fixtures_by_league_date(league_id, date)?;
    let (rows, errors) = gather_forms(source, &fixtures, last_n, h2h_last);

    let games = rows
        .into_iter()
        .map(|row| {
            let projection = project(&row.home_stats, &row.away_stats, Some(&row.h2h), cfg);
            GameProjection {
                info: MatchInfo::from_fixture(&row.fixture),
                projection,
                home_form: row.home_stats,
                away_form: row.away_stats,
                h2h: row.h2h,
            }
        })
        .collect();

    Ok(DayProjections {
        date: date.format("%Y-%m-%d").to_string(),
        league_id,
        games,
        thresholds: cfg.clone(),
        errors,
    })
}

pub fn compute_obvious_games(
    source: &(dyn FixtureSource + Sync),
    league_ids: &[u32],
    date: NaiveDate,
    last_n: u32,
    h2h_last: u32,
    min_strength: f64,
    cfg: &ProjectionSettings,
) -> Result<ObviousReport> {
    let mut fixtures = Vec::new();
    let mut errors = Vec::new();
    for &league_id in league_ids {
        match source.fixtures_by_league_date(league_id, date) {
            Ok(list) => fixtures.extend(list),
            Err(err) => errors.push(format!("league {league_id} fixtures fetch failed: {err}")),
        }
    }

    let (rows, fetch_errors) = gather_forms(source, &fixtures, last_n, h2h_last);
    errors.extend(fetch_errors);

    let games = rank_obvious(&rows, min_strength, cfg);
    Ok(ObviousReport {
        date: date.format("%Y-%m-%d").to_string(),
        count: games.len(),
        min_strength,
        games,
        errors,
    })
}

/// Fetch both teams' recency windows and the pair's history for every
/// fixture, in parallel across fixtures. A failed lookup degrades that
/// fixture to the neutral record and is reported; it never sinks the batch.
fn gather_forms(
    source: &(dyn FixtureSource + Sync),
    fixtures: &[Fixture],
    last_n: u32,
    h2h_last: u32,
) -> (Vec<FixtureForm>, Vec<String>) {
    let results: Vec<(FixtureForm, Vec<String>)> = fixtures
        .par_iter()
        .map(|fx| gather_one(source, fx, last_n, h2h_last))
        .collect();

    let mut rows = Vec::with_capacity(results.len());
    let mut errors = Vec::new();
    for (row, mut errs) in results {
        rows.push(row);
        errors.append(&mut errs);
    }
    (rows, errors)
}

fn gather_one(
    source: &(dyn FixtureSource + Sync),
    fx: &Fixture,
    last_n: u32,
    h2h_last: u32,
) -> (FixtureForm, Vec<String>) {
    let mut errors = Vec::new();

    let home_stats = match source.fixtures_by_team_recency(fx.home.id, last_n, Recency::Past) {
        Ok(list) => compute_form_stats(&list, fx.home.id),
        Err(err) => {
            errors.push(format!("recent form unavailable for {}: {err}", fx.home.name));
            TeamFormStats::default()
        }
    };
    let away_stats = match source.fixtures_by_team_recency(fx.away.id, last_n, Recency::Past) {
        Ok(list) => compute_form_stats(&list, fx.away.id),
        Err(err) => {
            errors.push(format!("recent form unavailable for {}: {err}", fx.away.name));
            TeamFormStats::default()
        }
    };
    let h2h = match source.head_to_head(fx.home.id, fx.away.id, h2h_last) {
        Ok(list) => compute_h2h(&list, fx.home.id, fx.away.id),
        Err(err) => {
            errors.push(format!(
                "head-to-head unavailable for {} x {}: {err}",
                fx.home.name, fx.away.name
            ));
            HeadToHeadStats::default()
        }
    };

    (
        FixtureForm {
            fixture: fx.clone(),
            home_stats,
            away_stats,
            h2h,
        },
        errors,
    )
}
