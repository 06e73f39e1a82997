use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, Utc};
use serde_json::Value;

use crate::fixture::{Fixture, parse_fixture_response};
use crate::fixture_source::{FixtureSource, Recency};
use crate::http_client::http_client;
use crate::ttl_cache::TtlCache;

const API_FOOTBALL_BASE: &str = "https://v3.football.api-sports.io";
const KEY_HEADER: &str = "x-apisports-key";
// Upstream caps recency and head-to-head windows at 20 fixtures.
const MAX_WINDOW: u32 = 20;

/// API-Football v3 implementation of the fixture-source contract. Response
/// bodies are cached by full URL in the injected TTL cache; a cache miss is
/// indistinguishable from a live fetch to callers.
pub struct ApiFootballClient {
    api_key: String,
    cache: TtlCache,
}

impl ApiFootballClient {
    pub fn new(api_key: impl Into<String>, cache: TtlCache) -> Self {
        Self {
            api_key: api_key.into(),
            cache,
        }
    }

    fn fetch_fixtures(&self, url: &str) -> Result<Vec<Fixture>> {
        if let Some(body) = self.cache.get(url) {
            return parse_fixture_body(&body);
        }

        let client = http_client()?;
        let resp = client
            .get(url)
            .header(KEY_HEADER, self.api_key.as_str())
            .send()
            .context("fixtures request failed")?;
        let status = resp.status();
        let body = resp.text().context("failed reading fixtures body")?;
        if !status.is_success() {
            return Err(anyhow::anyhow!("http {status}: {body}"));
        }

        let fixtures = parse_fixture_body(&body)?;
        self.cache.put(url, body);
        Ok(fixtures)
    }
}

impl FixtureSource for ApiFootballClient {
    fn fixtures_by_league_date(&self, league_id: u32, date: NaiveDate) -> Result<Vec<Fixture>> {
        let url = format!(
            "{API_FOOTBALL_BASE}/fixtures?league={league_id}&date={}&season={}",
            date.format("%Y-%m-%d"),
            date.year(),
        );
        self.fetch_fixtures(&url)
    }

    fn fixtures_by_team_recency(
        &self,
        team_id: u32,
        count: u32,
        direction: Recency,
    ) -> Result<Vec<Fixture>> {
        let count = count.clamp(1, MAX_WINDOW);
        let window_key = match direction {
            Recency::Past => "last",
            Recency::Future => "next",
        };
        let url = format!(
            "{API_FOOTBALL_BASE}/fixtures?team={team_id}&{window_key}={count}&season={}",
            Utc::now().year(),
        );
        let mut fixtures = self.fetch_fixtures(&url)?;
        sort_window(&mut fixtures, direction);
        dedup_by_id(&mut fixtures);
        Ok(fixtures)
    }

    fn head_to_head(&self, home_id: u32, away_id: u32, count: u32) -> Result<Vec<Fixture>> {
        let count = count.clamp(1, MAX_WINDOW);
        let url = format!(
            "{API_FOOTBALL_BASE}/fixtures/headtohead?h2h={home_id}-{away_id}&last={count}"
        );
        self.fetch_fixtures(&url)
    }
}

fn parse_fixture_body(body: &str) -> Result<Vec<Fixture>> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(anyhow::anyhow!("empty fixtures response"));
    }
    let v: Value = serde_json::from_str(trimmed).context("invalid fixtures json")?;
    if let Some(msg) = upstream_error(&v) {
        return Err(anyhow::anyhow!("fixtures api error: {msg}"));
    }
    Ok(parse_fixture_response(&v))
}

// API-Football reports failures inside a 200 body, as a non-empty `errors`
// array or object.
fn upstream_error(v: &Value) -> Option<String> {
    match v.get("errors") {
        Some(Value::Array(items)) if !items.is_empty() => Some(
            items
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; "),
        ),
        Some(Value::Object(map)) if !map.is_empty() => Some(
            map.iter()
                .map(|(k, val)| format!("{k}: {val}"))
                .collect::<Vec<_>>()
                .join("; "),
        ),
        _ => None,
    }
}

fn sort_window(fixtures: &mut [Fixture], direction: Recency) {
    fixtures.sort_by_key(|fx| kickoff_ts(fx));
    if direction == Recency::Past {
        fixtures.reverse();
    }
}

fn kickoff_ts(fx: &Fixture) -> i64 {
    chrono::DateTime::parse_from_rfc3339(&fx.kickoff_utc)
        .map(|dt| dt.timestamp())
        .unwrap_or(0)
}

fn dedup_by_id(fixtures: &mut Vec<Fixture>) {
    let mut seen = std::collections::HashSet::new();
    fixtures.retain(|fx| seen.insert(fx.id));
}
