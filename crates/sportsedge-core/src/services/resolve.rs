//! Fail-closed resolution of remote lookups.
//!
//! Each resolver performs one lookup and never returns an error:
//! - premium status defaults to `false`
//! - the reward schedule defaults to [`default_schedule`]
//!
//! The [`Resolution`] tells callers whether the value is remote or a
//! fallback so they can log it or offer a retry. There is no automatic
//! retry; the next user action triggers a new lookup.

use serde::{Deserialize, Serialize};

use super::traits::{RewardStructureProvider, SubscriptionLookup, ViewCounter};
use crate::access::{AccessLimits, ViewCount};
use crate::rewards::{default_schedule, schedule_from_tiers, MilestoneSchedule};

/// Where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Resolution {
    Remote,
    /// No lookup was needed (anonymous user).
    Skipped,
    Fallback { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolved<T> {
    pub value: T,
    pub resolution: Resolution,
}

impl<T> Resolved<T> {
    fn remote(value: T) -> Self {
        Self {
            value,
            resolution: Resolution::Remote,
        }
    }

    fn fallback(value: T, reason: impl ToString) -> Self {
        Self {
            value,
            resolution: Resolution::Fallback {
                reason: reason.to_string(),
            },
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.resolution, Resolution::Fallback { .. })
    }
}

/// Premium flag for a user. Anonymous users are never premium; lookup
/// failures resolve to `false`.
pub async fn resolve_premium<S: SubscriptionLookup>(lookup: &S, user_id: Option<&str>) -> Resolved<bool> {
    let Some(user_id) = user_id else {
        return Resolved {
            value: false,
            resolution: Resolution::Skipped,
        };
    };

    match lookup.has_premium_access(user_id).await {
        Ok(has_premium) => Resolved::remote(has_premium),
        Err(e) => {
            tracing::warn!(user_id, error = %e, "premium check failed, treating user as non-premium");
            Resolved::fallback(false, e)
        }
    }
}

/// Today's counter for `subject`. Failures resolve to an unused counter
/// with the configured limits.
pub async fn resolve_view_count<V: ViewCounter>(
    counter: &V,
    subject: &str,
    limits: AccessLimits,
) -> Resolved<ViewCount> {
    match counter.user_view_count(subject).await {
        Ok(count) => Resolved::remote(count),
        Err(e) => {
            tracing::warn!(subject, error = %e, "view count unavailable, assuming no uses today");
            Resolved::fallback(ViewCount::empty(limits, chrono::Utc::now()), e)
        }
    }
}

/// Reward schedule for a user. Fetch failures and malformed structures
/// resolve to the default four-tier schedule.
pub async fn resolve_schedule<P: RewardStructureProvider>(
    provider: &P,
    user_id: Option<&str>,
) -> Resolved<MilestoneSchedule> {
    let tiers = match provider.reward_structure(user_id).await {
        Ok(tiers) => tiers,
        Err(e) => {
            tracing::warn!(error = %e, "reward structure fetch failed, using default schedule");
            return Resolved::fallback(default_schedule(), e);
        }
    };

    match schedule_from_tiers(&tiers) {
        Ok(schedule) => Resolved::remote(schedule),
        Err(e) => {
            tracing::warn!(error = %e, "reward structure invalid, using default schedule");
            Resolved::fallback(default_schedule(), e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::rewards::RewardTier;
    use std::cell::Cell;

    struct Flaky {
        premium: Result<bool, ()>,
        calls: Cell<u32>,
    }

    impl SubscriptionLookup for Flaky {
        async fn has_premium_access(&self, _user_id: &str) -> Result<bool, ServiceError> {
            self.calls.set(self.calls.get() + 1);
            self.premium
                .map_err(|_| ServiceError::Unavailable("network down".into()))
        }
    }

    struct Tiers(Result<Vec<RewardTier>, ()>);

    impl RewardStructureProvider for Tiers {
        async fn reward_structure(&self, _user_id: Option<&str>) -> Result<Vec<RewardTier>, ServiceError> {
            self.0
                .clone()
                .map_err(|_| ServiceError::Unavailable("timeout".into()))
        }
    }

    struct BrokenCounter;

    impl ViewCounter for BrokenCounter {
        async fn user_view_count(&self, _subject: &str) -> Result<ViewCount, ServiceError> {
            Err(ServiceError::Unavailable("offline".into()))
        }

        async fn record_view(&self, _subject: &str) -> Result<ViewCount, ServiceError> {
            Err(ServiceError::Unavailable("offline".into()))
        }
    }

    #[tokio::test]
    async fn failed_premium_check_fails_closed() {
        let lookup = Flaky {
            premium: Err(()),
            calls: Cell::new(0),
        };
        let resolved = resolve_premium(&lookup, Some("u-1")).await;
        assert!(!resolved.value);
        assert_eq!(
            resolved.resolution,
            Resolution::Fallback {
                reason: "network down".into()
            }
        );
    }

    #[tokio::test]
    async fn anonymous_user_skips_lookup() {
        let lookup = Flaky {
            premium: Ok(true),
            calls: Cell::new(0),
        };
        let resolved = resolve_premium(&lookup, None).await;
        assert!(!resolved.value);
        assert_eq!(resolved.resolution, Resolution::Skipped);
        assert_eq!(lookup.calls.get(), 0);
    }

    #[tokio::test]
    async fn successful_premium_check_is_remote() {
        let lookup = Flaky {
            premium: Ok(true),
            calls: Cell::new(0),
        };
        let resolved = resolve_premium(&lookup, Some("u-1")).await;
        assert!(resolved.value);
        assert!(!resolved.is_fallback());
    }

    #[tokio::test]
    async fn failed_reward_fetch_uses_default_schedule() {
        let resolved = resolve_schedule(&Tiers(Err(())), Some("u-1")).await;
        assert!(resolved.is_fallback());
        assert_eq!(resolved.value, default_schedule());
    }

    #[tokio::test]
    async fn malformed_reward_structure_uses_default_schedule() {
        let tiers = vec![RewardTier {
            count: 1,
            kind: "mystery".into(),
            value: serde_json::Value::Null,
        }];
        let resolved = resolve_schedule(&Tiers(Ok(tiers)), None).await;
        assert!(resolved.is_fallback());
        assert_eq!(resolved.value.len(), 4);
    }

    #[tokio::test]
    async fn remote_reward_structure_is_used() {
        let tiers = vec![RewardTier {
            count: 2,
            kind: "premium_trial".into(),
            value: serde_json::json!(7),
        }];
        let resolved = resolve_schedule(&Tiers(Ok(tiers)), None).await;
        assert_eq!(resolved.resolution, Resolution::Remote);
        assert_eq!(resolved.value.len(), 1);
    }

    #[tokio::test]
    async fn failed_view_count_assumes_unused() {
        let limits = AccessLimits {
            max_free_uses: 2,
            bonus_uses: 1,
        };
        let resolved = resolve_view_count(&BrokenCounter, "u-1", limits).await;
        assert!(resolved.is_fallback());
        assert_eq!(resolved.value.remaining(), 3);
    }
}
