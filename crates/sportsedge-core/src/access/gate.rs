//! Access Gate - decides how much of a gated item a user sees.
//!
//! ## Presentation States
//!
//! - **FullAccess**: premium users, or the free daily pick once unlocked
//! - **Teaser**: partial reveal plus upsell while free uses remain
//! - **Locked**: upsell only
//!
//! Every decision here is a pure function of its inputs. Remote lookups
//! happen before the gate is consulted; see [`crate::services`].

use serde::{Deserialize, Serialize};

use super::usage::UserAccessState;

/// Presentation state for a gated item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessState {
    FullAccess,
    Teaser,
    Locked,
}

/// Where the free daily pick flow stands for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FreePickStep {
    /// Pick is shown in full.
    Revealed,
    /// An interstitial ad must be viewed first.
    AdRequired,
    /// Today's free pick was already used.
    Locked,
}

/// What a screen should render once content availability is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "state", rename_all = "snake_case")]
pub enum Presentation {
    /// No eligible games; supersedes any access state.
    NoContent,
    Gated(AccessState),
    FreePick(FreePickStep),
}

/// Inputs to one gate decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateInput {
    pub has_premium: bool,
    pub used_free_today: bool,
    pub remaining_uses: u32,
    /// Only consulted on the free-pick path.
    #[serde(default)]
    pub ad_viewed: bool,
}

impl GateInput {
    pub fn from_state(state: &UserAccessState, ad_viewed: bool) -> Self {
        Self {
            has_premium: state.has_premium,
            used_free_today: state.used_free_today(),
            remaining_uses: state.remaining_uses(),
            ad_viewed,
        }
    }
}

/// Decide the presentation state for a premium-gated item.
pub fn evaluate(input: &GateInput) -> AccessState {
    if input.has_premium {
        AccessState::FullAccess
    } else if input.remaining_uses == 0 {
        AccessState::Locked
    } else {
        AccessState::Teaser
    }
}

/// Decide the step of the ad-gated free daily pick.
pub fn evaluate_free_pick(input: &GateInput) -> FreePickStep {
    if input.has_premium {
        return FreePickStep::Revealed;
    }
    if input.used_free_today || input.remaining_uses == 0 {
        return FreePickStep::Locked;
    }
    if input.ad_viewed {
        FreePickStep::Revealed
    } else {
        FreePickStep::AdRequired
    }
}

/// Gate a screen listing `eligible_items` items.
pub fn present(eligible_items: usize, input: &GateInput) -> Presentation {
    if eligible_items == 0 {
        return Presentation::NoContent;
    }
    Presentation::Gated(evaluate(input))
}

/// Gate the free daily pick screen.
pub fn present_free_pick(eligible_items: usize, input: &GateInput) -> Presentation {
    if eligible_items == 0 {
        return Presentation::NoContent;
    }
    Presentation::FreePick(evaluate_free_pick(input))
}

impl AccessState {
    /// Whether any part of the item is visible.
    pub fn shows_content(self) -> bool {
        !matches!(self, AccessState::Locked)
    }

    /// Whether the upsell overlay is shown.
    pub fn shows_upsell(self) -> bool {
        !matches!(self, AccessState::FullAccess)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::usage::AccessLimits;
    use proptest::prelude::*;

    fn input(has_premium: bool, used_free_today: bool, remaining_uses: u32) -> GateInput {
        GateInput {
            has_premium,
            used_free_today,
            remaining_uses,
            ad_viewed: false,
        }
    }

    #[test]
    fn free_user_with_uses_sees_teaser() {
        assert_eq!(evaluate(&input(false, false, 1)), AccessState::Teaser);
        assert_eq!(evaluate(&input(false, true, 2)), AccessState::Teaser);
    }

    #[test]
    fn free_user_without_uses_is_locked() {
        assert_eq!(evaluate(&input(false, true, 0)), AccessState::Locked);
        assert_eq!(evaluate(&input(false, false, 0)), AccessState::Locked);
    }

    #[test]
    fn anonymous_user_is_gated_like_free_user() {
        let state = UserAccessState::anonymous(AccessLimits::default());
        let gate = GateInput::from_state(&state, false);
        assert_eq!(evaluate(&gate), AccessState::Teaser);
        assert_eq!(evaluate_free_pick(&gate), FreePickStep::AdRequired);
    }

    #[test]
    fn free_pick_requires_ad_then_reveals() {
        let mut gate = input(false, false, 1);
        assert_eq!(evaluate_free_pick(&gate), FreePickStep::AdRequired);
        gate.ad_viewed = true;
        assert_eq!(evaluate_free_pick(&gate), FreePickStep::Revealed);
    }

    #[test]
    fn free_pick_locked_after_use() {
        let mut gate = input(false, true, 1);
        gate.ad_viewed = true;
        assert_eq!(evaluate_free_pick(&gate), FreePickStep::Locked);
    }

    #[test]
    fn premium_skips_interstitial() {
        assert_eq!(evaluate_free_pick(&input(true, true, 0)), FreePickStep::Revealed);
    }

    #[test]
    fn no_content_supersedes_access_state() {
        assert_eq!(present(0, &input(true, false, 5)), Presentation::NoContent);
        assert_eq!(present_free_pick(0, &input(false, false, 1)), Presentation::NoContent);
        assert_eq!(
            present(3, &input(false, false, 0)),
            Presentation::Gated(AccessState::Locked)
        );
    }

    #[test]
    fn upsell_flags() {
        assert!(!AccessState::FullAccess.shows_upsell());
        assert!(AccessState::Teaser.shows_upsell() && AccessState::Teaser.shows_content());
        assert!(!AccessState::Locked.shows_content());
    }

    proptest! {
        #[test]
        fn premium_always_full_access(used in any::<bool>(), remaining in any::<u32>(), ad in any::<bool>()) {
            let gate = GateInput { has_premium: true, used_free_today: used, remaining_uses: remaining, ad_viewed: ad };
            prop_assert_eq!(evaluate(&gate), AccessState::FullAccess);
            prop_assert_eq!(evaluate_free_pick(&gate), FreePickStep::Revealed);
        }

        #[test]
        fn exhausted_free_user_always_locked(used in any::<bool>(), ad in any::<bool>()) {
            let gate = GateInput { has_premium: false, used_free_today: used, remaining_uses: 0, ad_viewed: ad };
            prop_assert_eq!(evaluate(&gate), AccessState::Locked);
            prop_assert_eq!(evaluate_free_pick(&gate), FreePickStep::Locked);
        }
    }
}
