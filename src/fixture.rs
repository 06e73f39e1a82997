use serde::Serialize;
use serde_json::Value;

/// Combined-goal line for the "low-scoring" classification (under 3.5).
pub const UNDER_LINE_GOALS: u32 = 4;

#[derive(Debug, Clone, Serialize)]
pub struct TeamRef {
    pub id: u32,
    pub name: String,
    /// true = won, false = lost, None = draw or not decided yet.
    pub winner: Option<bool>,
}

/// One scheduled or completed match. Goals are None until the match has a
/// score, and such fixtures are excluded from every aggregate.
#[derive(Debug, Clone, Serialize)]
pub struct Fixture {
    pub id: u64,
    pub kickoff_utc: String,
    pub league_id: u32,
    pub league_name: String,
    pub home: TeamRef,
    pub away: TeamRef,
    pub home_goals: Option<u32>,
    pub away_goals: Option<u32>,
}

impl Fixture {
    pub fn combined_goals(&self) -> Option<u32> {
        match (self.home_goals, self.away_goals) {
            (Some(h), Some(a)) => Some(h + a),
            _ => None,
        }
    }

    pub fn is_low_scoring(&self) -> Option<bool> {
        self.combined_goals().map(|total| total < UNDER_LINE_GOALS)
    }
}

/// Walk an API-Football `/fixtures` payload and collect the rows that carry
/// the identifiers we require. Records missing a fixture id or either team id
/// are rejected individually; the rest of the batch is kept.
pub fn parse_fixture_response(v: &Value) -> Vec<Fixture> {
    let mut out = Vec::new();
    if let Some(arr) = v.get("response").and_then(|x| x.as_array()) {
        for item in arr {
            if let Some(fx) = parse_fixture(item) {
                out.push(fx);
            }
        }
    }
    out
}

pub fn parse_fixture(v: &Value) -> Option<Fixture> {
    let meta = v.get("fixture")?;
    let id = meta.get("id")?.as_u64()?;
    let kickoff_utc = meta
        .get("date")
        .and_then(|x| x.as_str())
        .unwrap_or_default()
        .to_string();

    let league = v.get("league");
    let league_id = league
        .and_then(|l| l.get("id"))
        .and_then(|x| x.as_u64())
        .unwrap_or(0) as u32;
    let league_name = league
        .and_then(|l| l.get("name"))
        .and_then(|x| x.as_str())
        .unwrap_or_default()
        .to_string();

    let teams = v.get("teams")?;
    let home = parse_team_ref(teams.get("home")?)?;
    let away = parse_team_ref(teams.get("away")?)?;

    let goals = v.get("goals");
    let home_goals = goals
        .and_then(|g| g.get("home"))
        .and_then(|x| x.as_u64())
        .map(|g| g as u32);
    let away_goals = goals
        .and_then(|g| g.get("away"))
        .and_then(|x| x.as_u64())
        .map(|g| g as u32);

    Some(Fixture {
        id,
        kickoff_utc,
        league_id,
        league_name,
        home,
        away,
        home_goals,
        away_goals,
    })
}

fn parse_team_ref(v: &Value) -> Option<TeamRef> {
    let id = v.get("id")?.as_u64()? as u32;
    if id == 0 {
        return None;
    }
    let name = v
        .get("name")
        .and_then(|x| x.as_str())
        .unwrap_or_default()
        .to_string();
    let winner = v.get("winner").and_then(|x| x.as_bool());
    Some(TeamRef { id, name, winner })
}
