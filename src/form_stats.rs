use serde::Serialize;

use crate::fixture::{Fixture, UNDER_LINE_GOALS};

/// Rolling performance over one team's recent fixtures. Every averaged field
/// is divided by the count of usable fixtures, never by the input length.
/// A team with no usable fixtures gets the all-zero record: downstream
/// formulas treat zero as "no opinion", not as a missing value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TeamFormStats {
    pub games: u32,
    pub avg_for: f64,
    pub avg_against: f64,
    pub avg_total: f64,
    pub pct_under: f64,
    /// Average of 3/1/0 per win/draw/loss, range 0..3.
    pub form_points: f64,
    pub conceded_avg: f64,
}

pub fn compute_form_stats(fixtures: &[Fixture], team_id: u32) -> TeamFormStats {
    let mut games = 0u32;
    let mut goals_for = 0u32;
    let mut goals_against = 0u32;
    let mut total_goals = 0u32;
    let mut under_count = 0u32;
    let mut points = 0u32;

    for fx in fixtures {
        let (Some(gh), Some(ga)) = (fx.home_goals, fx.away_goals) else {
            continue;
        };
        let (mine, theirs, winner) = if fx.home.id == team_id {
            (gh, ga, fx.home.winner)
        } else if fx.away.id == team_id {
            (ga, gh, fx.away.winner)
        } else {
            continue;
        };

        games += 1;
        goals_for += mine;
        goals_against += theirs;
        total_goals += gh + ga;
        if gh + ga < UNDER_LINE_GOALS {
            under_count += 1;
        }
        match winner {
            Some(true) => points += 3,
            None => points += 1,
            Some(false) => {}
        }
    }

    if games == 0 {
        return TeamFormStats::default();
    }

    let n = games as f64;
    TeamFormStats {
        games,
        avg_for: goals_for as f64 / n,
        avg_against: goals_against as f64 / n,
        avg_total: total_goals as f64 / n,
        pct_under: under_count as f64 / n,
        form_points: points as f64 / n,
        conceded_avg: goals_against as f64 / n,
    }
}
