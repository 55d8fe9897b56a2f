//! Confidence and momentum classification for prediction cards.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Color band for a confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceColor {
    Success,
    Warning,
    Error,
}

/// Trend label for a momentum score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MomentumLabel {
    Hot,
    Rising,
    Neutral,
    Falling,
    Cold,
}

/// `>= 80` success, `>= 60` warning, anything else error.
pub fn confidence_color(confidence: i32) -> ConfidenceColor {
    if confidence >= 80 {
        ConfidenceColor::Success
    } else if confidence >= 60 {
        ConfidenceColor::Warning
    } else {
        ConfidenceColor::Error
    }
}

/// Ranges are checked top-down; 15 is Hot and -15 is Cold.
pub fn momentum_label(score: i32) -> MomentumLabel {
    if score >= 15 {
        MomentumLabel::Hot
    } else if score >= 5 {
        MomentumLabel::Rising
    } else if score <= -15 {
        MomentumLabel::Cold
    } else if score <= -5 {
        MomentumLabel::Falling
    } else {
        MomentumLabel::Neutral
    }
}

impl ConfidenceColor {
    pub fn as_str(self) -> &'static str {
        match self {
            ConfidenceColor::Success => "success",
            ConfidenceColor::Warning => "warning",
            ConfidenceColor::Error => "error",
        }
    }
}

impl MomentumLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            MomentumLabel::Hot => "Hot",
            MomentumLabel::Rising => "Rising",
            MomentumLabel::Neutral => "Neutral",
            MomentumLabel::Falling => "Falling",
            MomentumLabel::Cold => "Cold",
        }
    }
}

impl fmt::Display for ConfidenceColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for MomentumLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upstream prediction inputs for one displayed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionSignal {
    pub confidence: i32,
    pub momentum_score: i32,
}

/// Both classifications of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalBadge {
    pub color: ConfidenceColor,
    pub label: MomentumLabel,
}

impl PredictionSignal {
    pub fn classify(&self) -> SignalBadge {
        SignalBadge {
            color: confidence_color(self.confidence),
            label: momentum_label(self.momentum_score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn confidence_boundaries_are_exact() {
        assert_eq!(confidence_color(79), ConfidenceColor::Warning);
        assert_eq!(confidence_color(80), ConfidenceColor::Success);
        assert_eq!(confidence_color(59), ConfidenceColor::Error);
        assert_eq!(confidence_color(60), ConfidenceColor::Warning);
        assert_eq!(confidence_color(100), ConfidenceColor::Success);
        assert_eq!(confidence_color(0), ConfidenceColor::Error);
    }

    #[test]
    fn momentum_boundaries_prefer_stronger_label() {
        assert_eq!(momentum_label(15), MomentumLabel::Hot);
        assert_eq!(momentum_label(14), MomentumLabel::Rising);
        assert_eq!(momentum_label(5), MomentumLabel::Rising);
        assert_eq!(momentum_label(4), MomentumLabel::Neutral);
        assert_eq!(momentum_label(0), MomentumLabel::Neutral);
        assert_eq!(momentum_label(-4), MomentumLabel::Neutral);
        assert_eq!(momentum_label(-5), MomentumLabel::Falling);
        assert_eq!(momentum_label(-14), MomentumLabel::Falling);
        assert_eq!(momentum_label(-15), MomentumLabel::Cold);
    }

    #[test]
    fn classify_high_confidence_hot_pick() {
        let badge = PredictionSignal {
            confidence: 80,
            momentum_score: 15,
        }
        .classify();
        assert_eq!(badge.color.to_string(), "success");
        assert_eq!(badge.label.to_string(), "Hot");
    }

    #[test]
    fn serializes_as_display_strings() {
        assert_eq!(serde_json::to_string(&ConfidenceColor::Warning).unwrap(), "\"warning\"");
        assert_eq!(serde_json::to_string(&MomentumLabel::Cold).unwrap(), "\"Cold\"");
    }

    proptest! {
        #[test]
        fn confidence_color_total(c in any::<i32>()) {
            let color = confidence_color(c);
            let expected = if c >= 80 { "success" } else if c >= 60 { "warning" } else { "error" };
            prop_assert_eq!(color.as_str(), expected);
        }

        #[test]
        fn momentum_label_total(s in any::<i32>()) {
            let label = momentum_label(s);
            match label {
                MomentumLabel::Hot => prop_assert!(s >= 15),
                MomentumLabel::Rising => prop_assert!((5..15).contains(&s)),
                MomentumLabel::Neutral => prop_assert!((-4..5).contains(&s)),
                MomentumLabel::Falling => prop_assert!((-14..=-5).contains(&s)),
                MomentumLabel::Cold => prop_assert!(s <= -15),
            }
        }
    }
}
