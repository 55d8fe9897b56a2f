//! A/B assignment of referral reward schedules.
//!
//! Each user is hashed into one of 100 buckets per experiment; variants
//! claim contiguous bucket ranges by weight. Assignment is stable for a
//! user across sessions and machines.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::milestone::MilestoneSchedule;
use super::schedule::{default_schedule, schedule_from_tiers, RewardTier};

/// A reward-schedule variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardVariant {
    /// Variant identifier (e.g. "control", "generous")
    pub id: String,
    /// Share of users, 0-100
    pub weight: u32,
    /// Tiers for this variant; empty means the default schedule
    #[serde(default)]
    pub tiers: Vec<RewardTier>,
}

impl RewardVariant {
    /// The variant's schedule, or the default schedule if its tiers are
    /// empty or malformed.
    pub fn schedule(&self) -> MilestoneSchedule {
        if self.tiers.is_empty() {
            return default_schedule();
        }
        match schedule_from_tiers(&self.tiers) {
            Ok(schedule) => schedule,
            Err(e) => {
                tracing::warn!(variant = %self.id, error = %e, "invalid reward tiers, using default schedule");
                default_schedule()
            }
        }
    }
}

/// A reward experiment and its variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardExperiment {
    pub id: String,
    pub variants: Vec<RewardVariant>,
}

impl Default for RewardExperiment {
    fn default() -> Self {
        Self {
            id: "referral-rewards".to_string(),
            variants: vec![RewardVariant {
                id: "control".to_string(),
                weight: 100,
                tiers: Vec::new(),
            }],
        }
    }
}

impl RewardExperiment {
    /// Check that variant weights sum to 100.
    pub fn validate(&self) -> Result<(), String> {
        if self.variants.is_empty() {
            return Err(format!("experiment '{}' has no variants", self.id));
        }
        let total: u64 = self.variants.iter().map(|v| u64::from(v.weight)).sum();
        if total != 100 {
            return Err(format!(
                "variant weights for '{}' sum to {total}, expected 100",
                self.id
            ));
        }
        Ok(())
    }

    /// Stable bucket (0-99) for a subject in this experiment.
    pub fn bucket(&self, subject_id: &str) -> u32 {
        let digest = Sha256::digest(format!("{}:{}", self.id, subject_id).as_bytes());
        let mut head = [0u8; 4];
        head.copy_from_slice(&digest[..4]);
        u32::from_be_bytes(head) % 100
    }

    /// Variant for a user. Anonymous users always get the first variant.
    pub fn assign(&self, user_id: Option<&str>) -> Option<&RewardVariant> {
        let Some(subject_id) = user_id else {
            return self.variants.first();
        };

        let target = u64::from(self.bucket(subject_id));
        let mut cumulative = 0u64;
        for variant in &self.variants {
            cumulative += u64::from(variant.weight);
            if target < cumulative {
                return Some(variant);
            }
        }

        self.variants.first()
    }

    /// Hex digest identifying an assignment, used as a log field.
    pub fn assignment_key(&self, subject_id: &str) -> String {
        let digest = Sha256::digest(format!("{}:{}", self.id, subject_id).as_bytes());
        hex::encode(&digest[..8])
    }

    /// Schedule for a user, falling back to the default schedule when the
    /// experiment has no variants.
    pub fn schedule_for(&self, user_id: Option<&str>) -> MilestoneSchedule {
        match self.assign(user_id) {
            Some(variant) => variant.schedule(),
            None => default_schedule(),
        }
    }
}
