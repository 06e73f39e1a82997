use serde::Serialize;

use crate::fixture::Fixture;
use crate::form_stats::TeamFormStats;
use crate::head_to_head::{Dominance, HeadToHeadStats};
use crate::projection::{ProjectionSettings, Side, clamp01, favorite_delta, round2, round3};

// Light reinforcement when the head-to-head record leans the same way.
const H2H_DOMINANCE_BONUS: f64 = 0.1;

/// Everything the ranker needs for one fixture, prefetched by the caller.
#[derive(Debug, Clone)]
pub struct FixtureForm {
    pub fixture: Fixture,
    pub home_stats: TeamFormStats,
    pub away_stats: TeamFormStats,
    pub h2h: HeadToHeadStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct ObviousGameEntry {
    pub league_id: u32,
    pub league_name: String,
    pub kickoff_utc: String,
    pub home_id: u32,
    pub away_id: u32,
    pub home: String,
    pub away: String,
    pub favorite_side: Side,
    pub favorite_name: String,
    pub strength: f64,
    pub raw_delta: f64,
}

/// Favored side and normalized strength for one fixture. Same form-vs-defense
/// delta as the decisive double-chance path, but with no threshold gate:
/// every fixture gets a strength, and |delta| of 2.0 maps to 1.0.
pub fn score_favorite(
    home: &TeamFormStats,
    away: &TeamFormStats,
    h2h: &HeadToHeadStats,
    cfg: &ProjectionSettings,
) -> (Side, f64, f64) {
    let delta = favorite_delta(home, away, cfg);
    let side = if delta >= 0.0 { Side::Home } else { Side::Away };
    let mut strength = clamp01(delta.abs() / 2.0);

    if h2h.games > 0 {
        let agrees = matches!(
            (side, h2h.dominance),
            (Side::Home, Dominance::Home) | (Side::Away, Dominance::Away)
        );
        if agrees {
            strength = (strength + H2H_DOMINANCE_BONUS).min(1.0);
        }
    }

    (side, strength, delta)
}

/// Filter a day's candidates down to the ones with a decisive favorite and
/// sort them strongest-first. The sort is stable, so ties keep input order.
pub fn rank_obvious(
    rows: &[FixtureForm],
    min_strength: f64,
    cfg: &ProjectionSettings,
) -> Vec<ObviousGameEntry> {
    let mut out = Vec::new();
    for row in rows {
        let (side, strength, delta) = score_favorite(&row.home_stats, &row.away_stats, &row.h2h, cfg);
        let strength = round2(strength);
        if strength < min_strength {
            continue;
        }
        let fx = &row.fixture;
        let favorite_name = match side {
            Side::Home => fx.home.name.clone(),
            Side::Away => fx.away.name.clone(),
        };
        out.push(ObviousGameEntry {
            league_id: fx.league_id,
            league_name: fx.league_name.clone(),
            kickoff_utc: fx.kickoff_utc.clone(),
            home_id: fx.home.id,
            away_id: fx.away.id,
            home: fx.home.name.clone(),
            away: fx.away.name.clone(),
            favorite_side: side,
            favorite_name,
            strength,
            raw_delta: round3(delta),
        });
    }

    out.sort_by(|a, b| {
        b.strength
            .partial_cmp(&a.strength)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    out
}
