use serde::Serialize;

use crate::fixture::{Fixture, UNDER_LINE_GOALS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dominance {
    Home,
    Away,
    None,
}

impl Default for Dominance {
    fn default() -> Self {
        Dominance::None
    }
}

/// Aggregate over the last meetings of a specific pair. `home_wins` counts
/// wins by the team that is at home in the fixture being projected, whichever
/// venue it had in the historical meeting.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct HeadToHeadStats {
    pub games: u32,
    pub pct_under: f64,
    pub home_wins: u32,
    pub away_wins: u32,
    pub draws: u32,
    pub dominance: Dominance,
}

pub fn compute_h2h(meetings: &[Fixture], home_id: u32, away_id: u32) -> HeadToHeadStats {
    let mut games = 0u32;
    let mut under_count = 0u32;
    let mut home_wins = 0u32;
    let mut away_wins = 0u32;
    let mut draws = 0u32;

    for fx in meetings {
        let (Some(gh), Some(ga)) = (fx.home_goals, fx.away_goals) else {
            continue;
        };
        games += 1;
        if gh + ga < UNDER_LINE_GOALS {
            under_count += 1;
        }

        let winner_id = if fx.home.winner == Some(true) {
            Some(fx.home.id)
        } else if fx.away.winner == Some(true) {
            Some(fx.away.id)
        } else {
            None
        };
        match winner_id {
            Some(id) if id == home_id => home_wins += 1,
            Some(id) if id == away_id => away_wins += 1,
            _ => draws += 1,
        }
    }

    // Draws never break the tie.
    let dominance = if home_wins > away_wins {
        Dominance::Home
    } else if away_wins > home_wins {
        Dominance::Away
    } else {
        Dominance::None
    };

    HeadToHeadStats {
        games,
        pct_under: if games > 0 {
            under_count as f64 / games as f64
        } else {
            0.0
        },
        home_wins,
        away_wins,
        draws,
        dominance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::TeamRef;

    fn meeting(home_id: u32, away_id: u32, gh: u32, ga: u32) -> Fixture {
        let home_winner = if gh > ga {
            Some(true)
        } else if gh < ga {
            Some(false)
        } else {
            None
        };
        Fixture {
            id: u64::from(home_id) * 1000 + u64::from(away_id) * 10 + u64::from(gh + ga),
            kickoff_utc: "2025-05-01T19:00:00+00:00".to_string(),
            league_id: 72,
            league_name: "Serie B".to_string(),
            home: TeamRef {
                id: home_id,
                name: format!("T{home_id}"),
                winner: home_winner,
            },
            away: TeamRef {
                id: away_id,
                name: format!("T{away_id}"),
                winner: home_winner.map(|w| !w),
            },
            home_goals: Some(gh),
            away_goals: Some(ga),
        }
    }

    #[test]
    fn empty_history_is_the_neutral_record() {
        let stats = compute_h2h(&[], 1, 2);
        assert_eq!(stats.games, 0);
        assert_eq!(stats.pct_under, 0.0);
        assert_eq!(stats.dominance, Dominance::None);
    }

    #[test]
    fn dominance_follows_more_wins() {
        let meetings = vec![
            meeting(1, 2, 2, 0),
            meeting(1, 2, 1, 0),
            meeting(2, 1, 2, 2),
        ];
        let stats = compute_h2h(&meetings, 1, 2);
        assert_eq!(stats.games, 3);
        assert_eq!(stats.home_wins, 2);
        assert_eq!(stats.away_wins, 0);
        assert_eq!(stats.draws, 1);
        assert_eq!(stats.dominance, Dominance::Home);
    }

    #[test]
    fn wins_follow_team_identity_across_swapped_venues() {
        // Team 2 won a meeting it hosted; in a projection where team 1 is at
        // home, that win belongs to the away side.
        let meetings = vec![meeting(2, 1, 3, 0)];
        let stats = compute_h2h(&meetings, 1, 2);
        assert_eq!(stats.home_wins, 0);
        assert_eq!(stats.away_wins, 1);
        assert_eq!(stats.dominance, Dominance::Away);
    }

    #[test]
    fn draws_never_break_the_tie() {
        let meetings = vec![
            meeting(1, 2, 1, 0),
            meeting(1, 2, 0, 2),
            meeting(1, 2, 0, 0),
            meeting(1, 2, 1, 1),
        ];
        let stats = compute_h2h(&meetings, 1, 2);
        assert_eq!(stats.draws, 2);
        assert_eq!(stats.dominance, Dominance::None);
        assert_eq!(stats.pct_under, 1.0);
    }

    #[test]
    fn unplayed_meetings_are_skipped() {
        let mut fx = meeting(1, 2, 0, 0);
        fx.home_goals = None;
        fx.away_goals = None;
        let stats = compute_h2h(&[fx], 1, 2);
        assert_eq!(stats.games, 0);
        assert_eq!(stats.dominance, Dominance::None);
    }
}
