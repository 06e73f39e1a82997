use serde::Serialize;

use crate::form_stats::TeamFormStats;
use crate::head_to_head::{Dominance, HeadToHeadStats};

// A side whose own recent average runs at or above this vetoes the
// low-scoring call even when the combined average looks low.
const HOT_SIDE_AVG_CAP: f64 = 3.2;

// The lean signal is capped strictly below 0.5 so it can never be read as a
// decisive call.
const LEAN_CONF_MIN: f64 = 0.10;
const LEAN_CONF_MAX: f64 = 0.49;

/// Threshold and weight configuration for the scorer. Immutable once built;
/// a copy is echoed into every day-level payload so stored results stay
/// reproducible independent of later configuration drift.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionSettings {
    pub under_avg_max: f64,
    pub under_pct_min: f64,
    pub form_weight: f64,
    pub def_weight: f64,
    pub home_adv: f64,
    pub dc_threshold: f64,
    pub h2h_last: u32,
    pub h2h_under_boost: f64,
    pub h2h_dc_boost: f64,
    pub min_strength: f64,
    pub obvious_h2h_last: u32,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            under_avg_max: 2.7,
            under_pct_min: 0.8,
            form_weight: 1.0,
            def_weight: 0.8,
            home_adv: 0.3,
            dc_threshold: 0.8,
            h2h_last: 5,
            h2h_under_boost: 0.15,
            h2h_dc_boost: 0.15,
            min_strength: 0.75,
            obvious_h2h_last: 3,
        }
    }
}

impl ProjectionSettings {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            under_avg_max: env_f64("EDGE_UNDER_AVG_MAX", d.under_avg_max),
            under_pct_min: env_f64("EDGE_UNDER_PCT_MIN", d.under_pct_min),
            form_weight: env_f64("EDGE_FORM_WEIGHT", d.form_weight),
            def_weight: env_f64("EDGE_DEF_WEIGHT", d.def_weight),
            home_adv: env_f64("EDGE_HOME_ADV", d.home_adv),
            dc_threshold: env_f64("EDGE_DC_THRESHOLD", d.dc_threshold),
            h2h_last: env_u32("EDGE_H2H_LAST", d.h2h_last),
            h2h_under_boost: env_f64("EDGE_H2H_UNDER_BOOST", d.h2h_under_boost),
            h2h_dc_boost: env_f64("EDGE_H2H_DC_BOOST", d.h2h_dc_boost),
            min_strength: env_f64("EDGE_MIN_STRENGTH", d.min_strength),
            obvious_h2h_last: env_u32("EDGE_OBVIOUS_H2H_LAST", d.obvious_h2h_last),
        }
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|val| val.trim().parse::<f64>().ok())
        .unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|val| val.trim().parse::<u32>().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DoubleChance {
    #[serde(rename = "1X")]
    HomeOrDraw,
    #[serde(rename = "X2")]
    AwayOrDraw,
}

impl DoubleChance {
    pub fn label(self) -> &'static str {
        match self {
            DoubleChance::HomeOrDraw => "1X",
            DoubleChance::AwayOrDraw => "X2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Home => "home",
            Side::Away => "away",
        }
    }

    pub fn double_chance(self) -> DoubleChance {
        match self {
            Side::Home => DoubleChance::HomeOrDraw,
            Side::Away => DoubleChance::AwayOrDraw,
        }
    }
}

/// One fixture's projection. `double_chance`/`dc_side` are both set or both
/// None; the lean fields are always populated. Confidences are rounded to
/// two decimals here at the boundary, never mid-computation.
#[derive(Debug, Clone, Serialize)]
pub struct Projection {
    pub under_threshold: bool,
    pub conf_under: f64,
    pub double_chance: Option<DoubleChance>,
    pub conf_double_chance: f64,
    pub dc_side: Option<Side>,
    pub lean_double_chance: DoubleChance,
    pub lean_conf_double_chance: f64,
    pub lean_side: Side,
    pub combined_avg_total: f64,
    pub combined_pct_under: f64,
}

/// Relative strength of the home side: positive favors home, negative away.
/// Shared between the decisive double-chance path and the obvious-game
/// ranking so both read the same form-vs-defense signal.
pub fn favorite_delta(home: &TeamFormStats, away: &TeamFormStats, cfg: &ProjectionSettings) -> f64 {
    let home_score =
        home.form_points * cfg.form_weight - home.conceded_avg * cfg.def_weight + cfg.home_adv;
    let away_score = away.form_points * cfg.form_weight - away.conceded_avg * cfg.def_weight;
    home_score - away_score
}

pub fn project(
    home: &TeamFormStats,
    away: &TeamFormStats,
    h2h: Option<&HeadToHeadStats>,
    cfg: &ProjectionSettings,
) -> Projection {
    let has_data = home.games > 0 && away.games > 0;
    let (combined_avg_total, combined_pct_under) = if has_data {
        (
            (home.avg_total + away.avg_total) / 2.0,
            (home.pct_under + away.pct_under) / 2.0,
        )
    } else {
        (0.0, 0.0)
    };

    // Zero-data sides must never classify as low-scoring, so the data gate is
    // explicit rather than relying on the pct clause failing on 0.0.
    let under_threshold = has_data
        && combined_avg_total <= cfg.under_avg_max
        && combined_pct_under >= cfg.under_pct_min
        && home.avg_total.max(away.avg_total) < HOT_SIDE_AVG_CAP;

    let mut conf_under = if has_data {
        clamp01(
            0.5 + (cfg.under_avg_max - combined_avg_total) * 0.3
                + (combined_pct_under - cfg.under_pct_min) * 0.4,
        )
    } else {
        0.0
    };

    let delta = favorite_delta(home, away, cfg);

    let mut double_chance = None;
    let mut dc_side = None;
    let mut conf_dc = 0.0;
    if delta >= cfg.dc_threshold {
        double_chance = Some(DoubleChance::HomeOrDraw);
        dc_side = Some(Side::Home);
        conf_dc = clamp01(0.5 + delta / 2.0);
    } else if -delta >= cfg.dc_threshold {
        double_chance = Some(DoubleChance::AwayOrDraw);
        dc_side = Some(Side::Away);
        conf_dc = clamp01(0.5 + (-delta) / 2.0);
    }

    if let Some(h2h) = h2h.filter(|h| h.games > 0) {
        if under_threshold && h2h.pct_under >= cfg.under_pct_min {
            conf_under = (conf_under + cfg.h2h_under_boost).min(1.0);
        }
        let dominant = match h2h.dominance {
            Dominance::Home => Some(Side::Home),
            Dominance::Away => Some(Side::Away),
            Dominance::None => None,
        };
        if dc_side.is_some() && dc_side == dominant {
            conf_dc = (conf_dc + cfg.h2h_dc_boost).min(1.0);
        }
    }

    // Weak directional hint, produced no matter what the decisive path did.
    let lean_side = if delta >= 0.0 { Side::Home } else { Side::Away };
    let lean_conf = (delta.abs() / 2.0).clamp(LEAN_CONF_MIN, LEAN_CONF_MAX);

    Projection {
        under_threshold,
        conf_under: round2(conf_under),
        double_chance,
        conf_double_chance: round2(conf_dc),
        dc_side,
        lean_double_chance: lean_side.double_chance(),
        lean_conf_double_chance: round2(lean_conf),
        lean_side,
        combined_avg_total: round2(combined_avg_total),
        combined_pct_under: round2(combined_pct_under),
    }
}

pub(crate) fn clamp01(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub(crate) fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(games: u32, avg_total: f64, pct_under: f64, form_points: f64, conceded: f64) -> TeamFormStats {
        TeamFormStats {
            games,
            avg_for: 0.0,
            avg_against: conceded,
            avg_total,
            pct_under,
            form_points,
            conceded_avg: conceded,
        }
    }

    fn h2h(games: u32, pct_under: f64, dominance: Dominance) -> HeadToHeadStats {
        HeadToHeadStats {
            games,
            pct_under,
            home_wins: 0,
            away_wins: 0,
            draws: 0,
            dominance,
        }
    }

    #[test]
    fn low_scoring_pair_classifies_under_with_expected_confidence() {
        // Two sides averaging 2.0 with every game under the line.
        let home = stats(5, 2.0, 1.0, 1.5, 1.0);
        let away = stats(5, 2.0, 1.0, 1.5, 1.0);
        let cfg = ProjectionSettings::default();
        let p = project(&home, &away, None, &cfg);
        assert!(p.under_threshold);
        // 0.5 + (2.7 - 2.0) * 0.3 + (1.0 - 0.8) * 0.4 = 0.79
        assert_eq!(p.conf_under, 0.79);
        assert_eq!(p.combined_avg_total, 2.0);
        assert_eq!(p.combined_pct_under, 1.0);
    }

    #[test]
    fn lopsided_form_fires_the_decisive_home_call() {
        let home = stats(5, 2.5, 0.4, 3.0, 0.0);
        let away = stats(5, 2.5, 0.4, 0.0, 2.0);
        let cfg = ProjectionSettings::default();
        let p = project(&home, &away, None, &cfg);
        // home 3.0*1.0 - 0*0.8 + 0.3 = 3.3; away 0 - 2.0*0.8 = -1.6; delta 4.9
        assert_eq!(p.double_chance, Some(DoubleChance::HomeOrDraw));
        assert_eq!(p.dc_side, Some(Side::Home));
        assert_eq!(p.conf_double_chance, 1.0);
        // Lean mirrors the decisive call and stays capped.
        assert_eq!(p.lean_side, Side::Home);
        assert_eq!(p.lean_conf_double_chance, 0.49);
    }

    #[test]
    fn zero_data_sides_never_classify_under() {
        let empty = TeamFormStats::default();
        let cfg = ProjectionSettings::default();
        let p = project(&empty, &empty, None, &cfg);
        assert!(!p.under_threshold);
        assert_eq!(p.conf_under, 0.0);
        assert_eq!(p.combined_avg_total, 0.0);
        assert_eq!(p.combined_pct_under, 0.0);
        // Lean still fires; only the home advantage remains in the delta.
        assert_eq!(p.lean_side, Side::Home);
        assert_eq!(p.lean_conf_double_chance, 0.15);
    }

    #[test]
    fn hot_side_vetoes_under_even_with_low_combined_average() {
        // Away runs hot at 3.4 even though the combined average dips under.
        let home = stats(5, 1.6, 1.0, 1.0, 1.0);
        let away = stats(5, 3.4, 0.8, 1.0, 1.0);
        let cfg = ProjectionSettings::default();
        let p = project(&home, &away, None, &cfg);
        assert!(!p.under_threshold);
    }

    #[test]
    fn decisive_pair_is_both_or_neither() {
        let cfg = ProjectionSettings::default();
        let balanced = stats(5, 2.5, 0.6, 1.5, 1.0);
        let p = project(&balanced, &balanced, None, &cfg);
        assert!(p.double_chance.is_none());
        assert!(p.dc_side.is_none());

        let strong = stats(5, 2.5, 0.6, 3.0, 0.2);
        let weak = stats(5, 2.5, 0.6, 0.5, 2.0);
        let p = project(&strong, &weak, None, &cfg);
        assert!(p.double_chance.is_some());
        assert!(p.dc_side.is_some());
    }

    #[test]
    fn lean_side_is_home_at_exactly_zero_delta() {
        let mut cfg = ProjectionSettings::default();
        cfg.home_adv = 0.0;
        let even = stats(5, 2.5, 0.6, 1.5, 1.0);
        let p = project(&even, &even, None, &cfg);
        assert_eq!(p.lean_side, Side::Home);
        assert_eq!(p.lean_double_chance, DoubleChance::HomeOrDraw);
        assert_eq!(p.lean_conf_double_chance, 0.10);
    }

    #[test]
    fn away_mirror_fires_x2() {
        let mut cfg = ProjectionSettings::default();
        cfg.home_adv = 0.0;
        let weak = stats(5, 2.5, 0.6, 0.0, 2.0);
        let strong = stats(5, 2.5, 0.6, 3.0, 0.0);
        let p = project(&weak, &strong, None, &cfg);
        assert_eq!(p.double_chance, Some(DoubleChance::AwayOrDraw));
        assert_eq!(p.dc_side, Some(Side::Away));
        assert_eq!(p.lean_side, Side::Away);
    }

    #[test]
    fn h2h_boosts_are_clamped_to_one() {
        let home = stats(5, 2.0, 1.0, 3.0, 0.0);
        let away = stats(5, 2.0, 1.0, 0.0, 2.0);
        let mut cfg = ProjectionSettings::default();
        cfg.h2h_under_boost = 5.0;
        cfg.h2h_dc_boost = 5.0;
        let history = h2h(4, 1.0, Dominance::Home);
        let p = project(&home, &away, Some(&history), &cfg);
        assert!(p.conf_under <= 1.0);
        assert!(p.conf_double_chance <= 1.0);
        assert_eq!(p.conf_double_chance, 1.0);
    }

    #[test]
    fn h2h_with_no_games_changes_nothing() {
        let home = stats(5, 2.0, 1.0, 1.5, 1.0);
        let away = stats(5, 2.0, 1.0, 1.5, 1.0);
        let cfg = ProjectionSettings::default();
        let without = project(&home, &away, None, &cfg);
        let with_empty = project(&home, &away, Some(&h2h(0, 1.0, Dominance::Home)), &cfg);
        assert_eq!(without.conf_under, with_empty.conf_under);
        assert_eq!(without.conf_double_chance, with_empty.conf_double_chance);
    }

    #[test]
    fn h2h_dominance_must_match_the_fired_side() {
        let home = stats(5, 2.5, 0.4, 3.0, 0.0);
        let away = stats(5, 2.5, 0.4, 0.5, 2.0);
        let cfg = ProjectionSettings::default();
        let agreeing = project(&home, &away, Some(&h2h(4, 0.2, Dominance::Home)), &cfg);
        let opposing = project(&home, &away, Some(&h2h(4, 0.2, Dominance::Away)), &cfg);
        assert!(agreeing.conf_double_chance >= opposing.conf_double_chance);
    }

    #[test]
    fn confidence_never_drops_as_delta_grows() {
        let cfg = ProjectionSettings::default();
        let away = stats(5, 2.5, 0.4, 1.0, 1.0);
        let mut last = 0.0;
        // Form points chosen to cross the threshold and then saturate.
        for form in [12, 15, 17, 24, 30] {
            let home = stats(5, 2.5, 0.4, form as f64 / 10.0, 1.0);
            let p = project(&home, &away, None, &cfg);
            assert!(p.conf_double_chance >= last);
            last = p.conf_double_chance;
        }
        assert_eq!(last, 1.0);
    }

    #[test]
    fn settings_echo_round_trips_through_json() {
        let cfg = ProjectionSettings::default();
        let json = serde_json::to_value(&cfg).expect("settings serialize");
        assert_eq!(json["under_avg_max"], 2.7);
        assert_eq!(json["dc_threshold"], 0.8);
        assert_eq!(json["h2h_last"], 5);
    }

    #[test]
    fn labels_serialize_in_wire_form() {
        let home = stats(5, 2.5, 0.4, 3.0, 0.0);
        let away = stats(5, 2.5, 0.4, 0.0, 2.0);
        let p = project(&home, &away, None, &ProjectionSettings::default());
        let json = serde_json::to_value(&p).expect("projection serialize");
        assert_eq!(json["double_chance"], "1X");
        assert_eq!(json["dc_side"], "home");
        assert_eq!(json["lean_double_chance"], "1X");
    }
}
