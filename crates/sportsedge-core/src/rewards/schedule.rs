//! Reward-structure wire format and the built-in default schedule.

use serde::{Deserialize, Serialize};

use super::milestone::{MilestoneSchedule, ReferralMilestone, Reward};
use crate::error::ValidationError;

/// One tier as returned by the reward-structure service:
/// `{ "count": 5, "type": "premium_trial", "value": 30 }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardTier {
    pub count: u32,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub value: serde_json::Value,
}

impl RewardTier {
    /// Interpret `kind` and `value` as a [`Reward`].
    ///
    /// `value` is a day count for extensions and trials, and either
    /// `{ "amount": n, "days": n }` or a bare amount for cash rewards.
    pub fn reward(&self) -> Result<Reward, ValidationError> {
        match self.kind.as_str() {
            "subscription_extension" | "subscriptionExtension" => Ok(Reward::SubscriptionExtension {
                days: self.days_value()?,
            }),
            "premium_trial" | "premiumTrial" => Ok(Reward::PremiumTrial {
                days: self.days_value()?,
            }),
            "cash_or_upgrade" | "cashOrUpgrade" => {
                let amount = self
                    .value
                    .get("amount")
                    .or(Some(&self.value))
                    .and_then(serde_json::Value::as_u64)
                    .ok_or_else(|| self.invalid("expected an amount"))?;
                let days = self
                    .value
                    .get("days")
                    .and_then(serde_json::Value::as_u64)
                    .unwrap_or(DEFAULT_UPGRADE_DAYS as u64);
                Ok(Reward::CashOrUpgrade {
                    amount: to_u32(amount, || self.invalid("amount too large"))?,
                    days: to_u32(days, || self.invalid("days too large"))?,
                })
            }
            "elite_status" | "eliteStatus" => Ok(Reward::EliteStatus),
            other => Err(ValidationError::UnknownRewardType(other.to_string())),
        }
    }

    fn days_value(&self) -> Result<u32, ValidationError> {
        let days = self
            .value
            .get("days")
            .or(Some(&self.value))
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| self.invalid("expected a day count"))?;
        to_u32(days, || self.invalid("days too large"))
    }

    fn invalid(&self, message: &str) -> ValidationError {
        ValidationError::InvalidValue {
            field: format!("tier[{}].value", self.count),
            message: message.to_string(),
        }
    }
}

impl From<&ReferralMilestone> for RewardTier {
    fn from(milestone: &ReferralMilestone) -> Self {
        let (kind, value) = match &milestone.reward {
            Reward::SubscriptionExtension { days } => ("subscription_extension", (*days).into()),
            Reward::PremiumTrial { days } => ("premium_trial", (*days).into()),
            Reward::CashOrUpgrade { amount, days } => (
                "cash_or_upgrade",
                serde_json::json!({ "amount": amount, "days": days }),
            ),
            Reward::EliteStatus => ("elite_status", serde_json::Value::Null),
        };
        Self {
            count: milestone.count,
            kind: kind.to_string(),
            value,
        }
    }
}

fn to_u32(value: u64, err: impl FnOnce() -> ValidationError) -> Result<u32, ValidationError> {
    u32::try_from(value).map_err(|_| err())
}

const DEFAULT_UPGRADE_DAYS: u32 = 90;

/// Convert remote tiers into a validated schedule. Tiers arrive in any order.
pub fn schedule_from_tiers(tiers: &[RewardTier]) -> Result<MilestoneSchedule, ValidationError> {
    let mut milestones = tiers
        .iter()
        .map(|t| Ok(ReferralMilestone::new(t.count, t.reward()?)))
        .collect::<Result<Vec<_>, ValidationError>>()?;
    milestones.sort_by_key(|m| m.count);
    MilestoneSchedule::new(milestones)
}

/// Four-tier schedule used whenever the remote structure is unavailable.
pub fn default_schedule() -> MilestoneSchedule {
    MilestoneSchedule::from_unsorted(vec![
        ReferralMilestone::new(3, Reward::SubscriptionExtension { days: 7 }),
        ReferralMilestone::new(5, Reward::PremiumTrial { days: 30 }),
        ReferralMilestone::new(
            10,
            Reward::CashOrUpgrade {
                amount: 25,
                days: DEFAULT_UPGRADE_DAYS,
            },
        ),
        ReferralMilestone::new(20, Reward::EliteStatus),
    ])
}
