//! Confidence adjustment and plain-language insight text for predictions.

use serde::{Deserialize, Serialize};

/// Per-sport confidence multiplier.
pub fn sport_factor(sport: &str) -> f64 {
    match sport {
        "NBA" => 1.05,
        "NFL" => 1.1,
        "MLB" => 0.95,
        "NHL" => 0.9,
        "NCAAB" => 0.85,
        "NCAAF" => 0.9,
        "UFC" => 1.15,
        "Soccer" => 0.8,
        "Tennis" => 1.0,
        "Golf" => 0.75,
        "Formula1" => 1.2,
        _ => 1.0,
    }
}

/// Per-league confidence multiplier.
pub fn league_factor(league: &str) -> f64 {
    match league {
        "Premier League" => 1.1,
        "La Liga" => 1.05,
        "Bundesliga" | "Serie A" => 1.0,
        "Ligue 1" => 0.95,
        "MLS" => 0.85,
        "Champions League" => 1.15,
        _ => 1.0,
    }
}

/// Scale a model's raw confidence by sport, league and momentum strength.
/// The result is clamped to 0-100.
pub fn adjust_confidence(base: f64, sport: &str, league: &str, momentum_score: f64) -> f64 {
    let momentum = 1.0 + momentum_score.abs() / 100.0;
    let adjusted = base * sport_factor(sport) * league_factor(league) * momentum;
    let clamped = adjusted.clamp(0.0, 100.0);
    tracing::debug!(base, adjusted = clamped, sport, league, momentum, "adjusted confidence");
    clamped
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Moderate,
    Low,
}

pub fn confidence_level(confidence: f64) -> ConfidenceLevel {
    if confidence >= 80.0 {
        ConfidenceLevel::High
    } else if confidence >= 60.0 {
        ConfidenceLevel::Moderate
    } else {
        ConfidenceLevel::Low
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MomentumStrength {
    Strong,
    Plain,
    Balanced,
}

pub fn momentum_strength(momentum_score: f64) -> MomentumStrength {
    let magnitude = momentum_score.abs();
    if magnitude >= 20.0 {
        MomentumStrength::Strong
    } else if magnitude >= 10.0 {
        MomentumStrength::Plain
    } else {
        MomentumStrength::Balanced
    }
}

fn momentum_phrase(momentum_score: f64) -> String {
    let direction = if momentum_score > 0.0 { "positive" } else { "negative" };
    match momentum_strength(momentum_score) {
        MomentumStrength::Strong => format!("strong {direction} momentum ({momentum_score:.1})"),
        MomentumStrength::Plain => format!("{direction} momentum ({momentum_score:.1})"),
        MomentumStrength::Balanced => format!("balanced momentum ({momentum_score:.1})"),
    }
}

/// One-paragraph summary of a prediction for the pick card.
pub fn insight_text(
    team_a: &str,
    team_b: &str,
    predicted_winner: &str,
    confidence: f64,
    momentum_score: f64,
) -> String {
    let loser = if predicted_winner == team_a { team_b } else { team_a };
    let level = match confidence_level(confidence) {
        ConfidenceLevel::High => "high confidence",
        ConfidenceLevel::Moderate => "moderate confidence",
        ConfidenceLevel::Low => "low confidence",
    };

    format!(
        "Our AI model predicts {predicted_winner} to win against {loser} with {level} \
         ({confidence:.1}%). {predicted_winner} has {} heading into this matchup. \
         Recent performance trends and statistical analysis suggest {predicted_winner} \
         has a favorable edge in this contest.",
        momentum_phrase(momentum_score)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjust_applies_all_factors() {
        let adjusted = adjust_confidence(50.0, "NFL", "default", 10.0);
        assert!((adjusted - 50.0 * 1.1 * 1.1).abs() < 1e-9);
    }

    #[test]
    fn adjust_uses_momentum_magnitude() {
        let up = adjust_confidence(40.0, "NBA", "", 12.0);
        let down = adjust_confidence(40.0, "NBA", "", -12.0);
        assert_eq!(up, down);
    }

    #[test]
    fn adjust_clamps() {
        assert_eq!(adjust_confidence(95.0, "Formula1", "Champions League", 20.0), 100.0);
        assert_eq!(adjust_confidence(-5.0, "NBA", "", 0.0), 0.0);
    }

    #[test]
    fn unknown_sport_and_league_are_neutral() {
        assert_eq!(sport_factor("Curling"), 1.0);
        assert_eq!(league_factor("Sunday League"), 1.0);
        assert_eq!(adjust_confidence(70.0, "Curling", "Sunday League", 0.0), 70.0);
    }

    #[test]
    fn levels() {
        assert_eq!(confidence_level(80.0), ConfidenceLevel::High);
        assert_eq!(confidence_level(79.9), ConfidenceLevel::Moderate);
        assert_eq!(confidence_level(59.9), ConfidenceLevel::Low);
        assert_eq!(momentum_strength(-20.0), MomentumStrength::Strong);
        assert_eq!(momentum_strength(10.0), MomentumStrength::Plain);
        assert_eq!(momentum_strength(9.9), MomentumStrength::Balanced);
    }

    #[test]
    fn insight_names_winner_and_loser() {
        let text = insight_text("Lakers", "Celtics", "Celtics", 82.5, -21.0);
        assert!(text.starts_with("Our AI model predicts Celtics to win against Lakers with high confidence (82.5%)."));
        assert!(text.contains("strong negative momentum (-21.0)"));
    }

    #[test]
    fn insight_balanced_momentum() {
        let text = insight_text("A", "B", "A", 55.0, 3.0);
        assert!(text.contains("low confidence"));
        assert!(text.contains("balanced momentum (3.0)"));
    }
}
