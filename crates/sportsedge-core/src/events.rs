use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::access::{AccessState, Presentation};
use crate::rewards::ReferralMilestone;

/// Every gating or reward decision worth surfacing produces an Event.
/// The UI layer drains them; the notification center turns some into toasts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    AccessEvaluated {
        user_id: Option<String>,
        presentation: Presentation,
        remaining_uses: u32,
        at: DateTime<Utc>,
    },
    /// Premium lookup failed; user treated as non-premium.
    PremiumFallback {
        user_id: String,
        reason: String,
        at: DateTime<Utc>,
    },
    /// A free use was consumed.
    FreeUseRecorded {
        user_id: Option<String>,
        remaining_uses: u32,
        at: DateTime<Utc>,
    },
    MilestoneUnlocked {
        milestone: ReferralMilestone,
        referrals: u32,
        at: DateTime<Utc>,
    },
    /// Reward-structure fetch failed; default schedule in use.
    RewardFallback {
        reason: String,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::AccessEvaluated { at, .. }
            | Event::PremiumFallback { at, .. }
            | Event::FreeUseRecorded { at, .. }
            | Event::MilestoneUnlocked { at, .. }
            | Event::RewardFallback { at, .. } => *at,
        }
    }

    /// Locked access state, if this event carries one.
    pub fn is_locked_out(&self) -> bool {
        matches!(
            self,
            Event::AccessEvaluated {
                presentation: Presentation::Gated(AccessState::Locked),
                ..
            }
        )
    }
}
