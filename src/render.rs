use crate::day_report::{DayProjections, GameProjection};
use crate::fixture::Fixture;
use crate::obvious::ObviousGameEntry;
use crate::projection::Side;

/// Per-fixture summary lines for a projected day: the decisive double-chance
/// call when it fired, otherwise the suggested lean.
pub fn projection_lines(report: &DayProjections) -> String {
    if report.games.is_empty() {
        return format!(
            "No fixtures found for league {} on {}.",
            report.league_id, report.date
        );
    }

    let mut lines = vec![format!(
        "Projections — league {} — {}:",
        report.league_id, report.date
    )];
    for game in &report.games {
        lines.push(projection_line(game));
    }
    lines.push(String::new());
    lines.push("Note: deterministic heuristic over recent form; not a guarantee.".to_string());
    lines.join("\n")
}

fn projection_line(game: &GameProjection) -> String {
    let p = &game.projection;
    let under_mark = if p.under_threshold { "yes" } else { "no" };
    let under_txt = format!("Under 3.5 {under_mark} ({}%)", pct(p.conf_under));

    let dc_txt = match (p.double_chance, p.dc_side) {
        (Some(dc), Some(side)) => format!(
            "Double chance: {} ({}) ({}%)",
            dc.label(),
            side_name(game, side),
            pct(p.conf_double_chance)
        ),
        _ => format!(
            "Suggested lean: {} ({}) ({}%)",
            p.lean_double_chance.label(),
            side_name(game, p.lean_side),
            pct(p.lean_conf_double_chance)
        ),
    };

    format!(
        "- {} x {} — {under_txt}, {dc_txt} | avg goals (comb.): {} | %under (comb.): {}%",
        game.info.home, game.info.away, p.combined_avg_total, pct(p.combined_pct_under)
    )
}

/// Markdown table of the day's obvious games, strongest favorite first.
pub fn obvious_table(entries: &[ObviousGameEntry]) -> String {
    if entries.is_empty() {
        return "No obvious games found.".to_string();
    }

    let mut out = vec![
        "| Kickoff (UTC) | League | Home | Away | Favorite | Strength |".to_string(),
        "|---|---|---|---|---|---|".to_string(),
    ];
    for entry in entries {
        out.push(format!(
            "| {} | {} | {} | {} | {} | {}% |",
            entry.kickoff_utc,
            entry.league_name,
            entry.home,
            entry.away,
            entry.favorite_name,
            pct(entry.strength)
        ));
    }
    out.join("\n")
}

pub fn fixture_line(fx: &Fixture) -> String {
    match (fx.home_goals, fx.away_goals) {
        (Some(gh), Some(ga)) => format!(
            "{} {gh} x {ga} {} ({}, {})",
            fx.home.name, fx.away.name, fx.league_name, fx.kickoff_utc
        ),
        _ => format!(
            "{} x {} ({}, {})",
            fx.home.name, fx.away.name, fx.league_name, fx.kickoff_utc
        ),
    }
}

fn side_name(game: &GameProjection, side: Side) -> &str {
    match side {
        Side::Home => &game.info.home,
        Side::Away => &game.info.away,
    }
}

fn pct(v: f64) -> u32 {
    (v * 100.0).round() as u32
}
