use anyhow::Result;
use chrono::NaiveDate;

use crate::fixture::Fixture;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recency {
    Past,
    Future,
}

/// Query contract for the external fixture provider. The engine only ever
/// consumes the returned fixture lists; transport, auth and caching are the
/// implementation's concern. Implementations must return lists ordered
/// most-recent-first (past) or soonest-first (future) and deduplicated by
/// fixture id.
pub trait FixtureSource {
    fn fixtures_by_league_date(&self, league_id: u32, date: NaiveDate) -> Result<Vec<Fixture>>;

    fn fixtures_by_team_recency(
        &self,
        team_id: u32,
        count: u32,
        direction: Recency,
    ) -> Result<Vec<Fixture>>;

    fn head_to_head(&self, home_id: u32, away_id: u32, count: u32) -> Result<Vec<Fixture>>;
}
