use clap::Subcommand;
use serde_json::json;
use sportsedge_core::signals::{adjust_confidence, confidence_level, insight_text};
use sportsedge_core::PredictionSignal;

use super::print_json;

#[derive(Subcommand)]
pub enum SignalAction {
    /// Classify confidence color and momentum label
    Classify {
        /// Confidence score, 0-100
        #[arg(long)]
        confidence: i32,
        /// Momentum score
        #[arg(long, allow_negative_numbers = true)]
        momentum: i32,
    },
    /// Adjust a base confidence for sport, league and momentum
    Adjust {
        #[arg(long)]
        base: f64,
        #[arg(long)]
        sport: String,
        #[arg(long, default_value = "")]
        league: String,
        #[arg(long, allow_negative_numbers = true, default_value_t = 0.0)]
        momentum: f64,
    },
    /// Generate the insight sentence for a matchup
    Insight {
        #[arg(long)]
        team_a: String,
        #[arg(long)]
        team_b: String,
        #[arg(long)]
        winner: String,
        #[arg(long)]
        confidence: f64,
        #[arg(long, allow_negative_numbers = true, default_value_t = 0.0)]
        momentum: f64,
    },
}

pub fn run(action: SignalAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SignalAction::Classify {
            confidence,
            momentum,
        } => {
            let signal = PredictionSignal {
                confidence,
                momentum_score: momentum,
            };
            print_json(&signal.classify())?;
        }
        SignalAction::Adjust {
            base,
            sport,
            league,
            momentum,
        } => {
            let adjusted = adjust_confidence(base, &sport, &league, momentum);
            print_json(&json!({
                "confidence": adjusted,
                "level": confidence_level(adjusted),
            }))?;
        }
        SignalAction::Insight {
            team_a,
            team_b,
            winner,
            confidence,
            momentum,
        } => {
            if winner != team_a && winner != team_b {
                return Err(format!("winner must be '{team_a}' or '{team_b}'").into());
            }
            println!("{}", insight_text(&team_a, &team_b, &winner, confidence, momentum));
        }
    }
    Ok(())
}
