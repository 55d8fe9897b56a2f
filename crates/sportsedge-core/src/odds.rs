//! Expected value of a sportsbook price against devigged sharp odds.
//!
//! All prices are decimal odds. A sharp book's two- or three-way market is
//! devigged to fair probabilities; an offered price is +EV when it pays
//! more than the fair price implies.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Moneyline prices for one event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Moneyline {
    pub home: f64,
    pub away: f64,
    #[serde(default)]
    pub draw: Option<f64>,
}

impl Moneyline {
    pub fn two_way(home: f64, away: f64) -> Self {
        Self {
            home,
            away,
            draw: None,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_odds("home", self.home)?;
        check_odds("away", self.away)?;
        if let Some(draw) = self.draw {
            check_odds("draw", draw)?;
        }
        Ok(())
    }
}

fn check_odds(outcome: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 1.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidOdds { outcome, value })
    }
}

/// Fair (vig-free) probabilities and prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FairOdds {
    pub home_prob: f64,
    pub away_prob: f64,
    pub draw_prob: Option<f64>,
    pub home_odds: f64,
    pub away_odds: f64,
    pub draw_odds: Option<f64>,
    /// Sum of implied probabilities before devigging.
    pub overround: f64,
}

/// Remove the bookmaker margin by normalizing implied probabilities.
pub fn devig(market: &Moneyline) -> Result<FairOdds, ValidationError> {
    market.validate()?;

    let home = 1.0 / market.home;
    let away = 1.0 / market.away;
    let draw = market.draw.map(|d| 1.0 / d);
    let overround = home + away + draw.unwrap_or(0.0);

    let home_prob = home / overround;
    let away_prob = away / overround;
    let draw_prob = draw.map(|d| d / overround);

    Ok(FairOdds {
        home_prob,
        away_prob,
        draw_prob,
        home_odds: 1.0 / home_prob,
        away_odds: 1.0 / away_prob,
        draw_odds: draw_prob.map(|p| 1.0 / p),
        overround,
    })
}

/// EV in percent of staking at `offered` when the fair price is `fair_odds`.
pub fn expected_value(offered: f64, fair_odds: f64) -> f64 {
    (offered / fair_odds - 1.0) * 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Home,
    Away,
    Draw,
}

/// EV of each outcome at the offered book and the best of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvAssessment {
    pub fair: FairOdds,
    pub home_ev: f64,
    pub away_ev: f64,
    pub draw_ev: Option<f64>,
    pub best_bet: Outcome,
    pub max_ev: f64,
}

impl EvAssessment {
    pub fn is_positive(&self) -> bool {
        self.max_ev > 0.0
    }
}

/// Compare an offered market against a sharp market.
///
/// Draw EV is only computed when both books price the draw. On ties the
/// earlier outcome (home, then away, then draw) wins.
pub fn evaluate_market(sharp: &Moneyline, offered: &Moneyline) -> Result<EvAssessment, ValidationError> {
    offered.validate()?;
    let fair = devig(sharp)?;

    let home_ev = expected_value(offered.home, fair.home_odds);
    let away_ev = expected_value(offered.away, fair.away_odds);
    let draw_ev = match (offered.draw, fair.draw_odds) {
        (Some(price), Some(fair_price)) => Some(expected_value(price, fair_price)),
        _ => None,
    };

    let mut best_bet = Outcome::Home;
    let mut max_ev = home_ev;
    if away_ev > max_ev {
        best_bet = Outcome::Away;
        max_ev = away_ev;
    }
    if let Some(draw_ev) = draw_ev {
        if draw_ev > max_ev {
            best_bet = Outcome::Draw;
            max_ev = draw_ev;
        }
    }

    Ok(EvAssessment {
        fair,
        home_ev,
        away_ev,
        draw_ev,
        best_bet,
        max_ev,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn devig_two_way_market() {
        let fair = devig(&Moneyline::two_way(2.10, 1.80)).unwrap();
        let implied = 1.0 / 2.10 + 1.0 / 1.80;
        assert!(approx(fair.overround, implied));
        assert!(approx(fair.home_prob + fair.away_prob, 1.0));
        assert!(approx(fair.home_odds, 2.10 * implied));
        assert!(fair.draw_prob.is_none());
    }

    #[test]
    fn devig_three_way_market() {
        let fair = devig(&Moneyline {
            home: 2.5,
            away: 3.0,
            draw: Some(3.2),
        })
        .unwrap();
        let total = fair.home_prob + fair.away_prob + fair.draw_prob.unwrap();
        assert!(approx(total, 1.0));
    }

    #[test]
    fn expected_value_percent() {
        assert!(approx(expected_value(2.2, 2.0), 10.0));
        assert!(approx(expected_value(1.8, 2.0), -10.0));
    }

    #[test]
    fn picks_best_outcome() {
        let sharp = Moneyline::two_way(2.0, 2.0);
        let offered = Moneyline::two_way(1.9, 2.2);
        let assessment = evaluate_market(&sharp, &offered).unwrap();
        assert_eq!(assessment.best_bet, Outcome::Away);
        assert!(assessment.is_positive());
        assert!(approx(assessment.max_ev, expected_value(2.2, assessment.fair.away_odds)));
    }

    #[test]
    fn draw_requires_both_books() {
        let sharp = Moneyline {
            home: 2.5,
            away: 3.0,
            draw: Some(3.2),
        };
        let offered = Moneyline::two_way(2.4, 2.9);
        let assessment = evaluate_market(&sharp, &offered).unwrap();
        assert!(assessment.draw_ev.is_none());
        assert_ne!(assessment.best_bet, Outcome::Draw);
    }

    #[test]
    fn rejects_invalid_prices() {
        assert_eq!(
            devig(&Moneyline::two_way(1.0, 2.0)),
            Err(ValidationError::InvalidOdds {
                outcome: "home",
                value: 1.0
            })
        );
        assert!(evaluate_market(&Moneyline::two_way(2.0, 2.0), &Moneyline::two_way(2.0, f64::NAN)).is_err());
    }

    proptest! {
        #[test]
        fn fair_probabilities_sum_to_one(home in 1.01f64..20.0, away in 1.01f64..20.0) {
            let fair = devig(&Moneyline::two_way(home, away)).unwrap();
            prop_assert!((fair.home_prob + fair.away_prob - 1.0).abs() < 1e-9);
            prop_assert!(fair.home_odds > 1.0 && fair.away_odds > 1.0);
        }
    }
}
