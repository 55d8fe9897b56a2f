use clap::Subcommand;
use sportsedge_core::odds::{devig, evaluate_market, Moneyline};

use super::print_json;

#[derive(Subcommand)]
pub enum OddsAction {
    /// Remove the vig from a market (decimal odds)
    Devig {
        #[arg(long)]
        home: f64,
        #[arg(long)]
        away: f64,
        #[arg(long)]
        draw: Option<f64>,
    },
    /// EV of an offered market against a sharp market (decimal odds)
    Ev {
        #[arg(long)]
        sharp_home: f64,
        #[arg(long)]
        sharp_away: f64,
        #[arg(long)]
        sharp_draw: Option<f64>,
        #[arg(long)]
        home: f64,
        #[arg(long)]
        away: f64,
        #[arg(long)]
        draw: Option<f64>,
    },
}

pub fn run(action: OddsAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        OddsAction::Devig { home, away, draw } => {
            let fair = devig(&Moneyline { home, away, draw })?;
            print_json(&fair)
        }
        OddsAction::Ev {
            sharp_home,
            sharp_away,
            sharp_draw,
            home,
            away,
            draw,
        } => {
            let sharp = Moneyline {
                home: sharp_home,
                away: sharp_away,
                draw: sharp_draw,
            };
            let offered = Moneyline { home, away, draw };
            print_json(&evaluate_market(&sharp, &offered)?)
        }
    }
}
