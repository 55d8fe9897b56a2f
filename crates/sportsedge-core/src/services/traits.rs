use crate::access::ViewCount;
use crate::error::ServiceError;
use crate::rewards::RewardTier;

/// Remote subscription record lookup.
///
/// Implementations report failures as errors; callers go through
/// [`crate::services::resolve_premium`], which treats any failure as
/// "not premium".
#[allow(async_fn_in_trait)]
pub trait SubscriptionLookup {
    async fn has_premium_access(&self, user_id: &str) -> Result<bool, ServiceError>;
}

/// Daily free-use counter keyed by (subject, date).
#[allow(async_fn_in_trait)]
pub trait ViewCounter {
    async fn user_view_count(&self, subject: &str) -> Result<ViewCount, ServiceError>;

    /// Count one free use and return the updated counter.
    async fn record_view(&self, subject: &str) -> Result<ViewCount, ServiceError>;
}

/// Source of the referral reward structure for a user.
#[allow(async_fn_in_trait)]
pub trait RewardStructureProvider {
    async fn reward_structure(&self, user_id: Option<&str>) -> Result<Vec<RewardTier>, ServiceError>;
}

impl<T: SubscriptionLookup> SubscriptionLookup for &T {
    async fn has_premium_access(&self, user_id: &str) -> Result<bool, ServiceError> {
        (**self).has_premium_access(user_id).await
    }
}

impl<T: ViewCounter> ViewCounter for &T {
    async fn user_view_count(&self, subject: &str) -> Result<ViewCount, ServiceError> {
        (**self).user_view_count(subject).await
    }

    async fn record_view(&self, subject: &str) -> Result<ViewCount, ServiceError> {
        (**self).record_view(subject).await
    }
}

impl<T: RewardStructureProvider> RewardStructureProvider for &T {
    async fn reward_structure(&self, user_id: Option<&str>) -> Result<Vec<RewardTier>, ServiceError> {
        (**self).reward_structure(user_id).await
    }
}
