//! Collaborators backed by local state instead of the backend.

use chrono::Utc;

use super::traits::{RewardStructureProvider, ViewCounter};
use crate::access::ViewCount;
use crate::error::ServiceError;
use crate::rewards::{RewardExperiment, RewardTier};
use crate::storage::UsageStore;

impl ViewCounter for UsageStore {
    async fn user_view_count(&self, subject: &str) -> Result<ViewCount, ServiceError> {
        self.view_count(subject, Utc::now())
            .map_err(|e| ServiceError::Unavailable(e.to_string()))
    }

    async fn record_view(&self, subject: &str) -> Result<ViewCount, ServiceError> {
        UsageStore::record_view(self, subject, Utc::now())
            .map_err(|e| ServiceError::Unavailable(e.to_string()))
    }
}

/// Serves the reward structure from a locally configured experiment.
#[derive(Debug, Clone)]
pub struct ExperimentRewardSource {
    experiment: RewardExperiment,
}

impl ExperimentRewardSource {
    pub fn new(experiment: RewardExperiment) -> Self {
        Self { experiment }
    }
}

impl RewardStructureProvider for ExperimentRewardSource {
    async fn reward_structure(&self, user_id: Option<&str>) -> Result<Vec<RewardTier>, ServiceError> {
        let variant = self.experiment.assign(user_id).ok_or_else(|| {
            ServiceError::Unavailable(format!("experiment '{}' has no variants", self.experiment.id))
        })?;

        if let Some(user_id) = user_id {
            tracing::debug!(
                experiment = %self.experiment.id,
                variant = %variant.id,
                assignment = %self.experiment.assignment_key(user_id),
                "assigned reward variant"
            );
        }

        Ok(variant
            .schedule()
            .milestones()
            .iter()
            .map(RewardTier::from)
            .collect())
    }
}
