//! Prediction signals: display classification and insight generation.

pub mod classifier;
pub mod insight;

pub use classifier::{
    confidence_color, momentum_label, ConfidenceColor, MomentumLabel, PredictionSignal, SignalBadge,
};
pub use insight::{
    adjust_confidence, confidence_level, insight_text, momentum_strength, ConfidenceLevel,
    MomentumStrength,
};
