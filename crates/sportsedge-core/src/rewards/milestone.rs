//! Referral milestones and progress toward the next reward.
//!
//! A [`MilestoneSchedule`] is loaded once per session and never mutated.
//! Progress is always computed against the segment between the previous
//! threshold (or zero) and the next locked milestone.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// What a milestone unlocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reward {
    /// Extra days on an existing subscription.
    SubscriptionExtension { days: u32 },
    /// Premium trial for users without a subscription.
    PremiumTrial { days: u32 },
    /// Cash payout in whole currency units, or an upgrade of `days`.
    CashOrUpgrade { amount: u32, days: u32 },
    EliteStatus,
}

impl Reward {
    pub fn describe(&self) -> String {
        match self {
            Reward::SubscriptionExtension { days } => format!("{days}-day subscription extension"),
            Reward::PremiumTrial { days } => format!("{days}-day premium trial"),
            Reward::CashOrUpgrade { amount, days } => {
                format!("${amount} cash or {days}-day upgrade")
            }
            Reward::EliteStatus => "Elite status".to_string(),
        }
    }
}

/// A referral-count threshold and its reward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralMilestone {
    pub count: u32,
    pub reward: Reward,
}

impl ReferralMilestone {
    pub fn new(count: u32, reward: Reward) -> Self {
        Self { count, reward }
    }

    pub fn is_unlocked(&self, current_referrals: u32) -> bool {
        current_referrals >= self.count
    }
}

/// A milestone annotated with its unlock state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneStatus {
    #[serde(flatten)]
    pub milestone: ReferralMilestone,
    pub is_unlocked: bool,
}

/// Result of evaluating a schedule against a referral count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardProgress {
    pub current_referrals: u32,
    pub milestones: Vec<MilestoneStatus>,
    pub next_milestone: Option<ReferralMilestone>,
    /// Progress through the current segment, 0-100.
    pub progress_percent: f64,
}

impl RewardProgress {
    pub fn unlocked_count(&self) -> usize {
        self.milestones.iter().filter(|m| m.is_unlocked).count()
    }

    /// Referrals still needed for the next milestone (0 once all are unlocked).
    pub fn referrals_to_next(&self) -> u32 {
        self.next_milestone
            .as_ref()
            .map(|m| m.count.saturating_sub(self.current_referrals))
            .unwrap_or(0)
    }

    /// Orders progress across segments: more unlocked milestones first,
    /// then further into the current segment.
    pub fn rank(&self) -> (usize, f64) {
        (self.unlocked_count(), self.progress_percent)
    }
}

/// Milestones sorted strictly ascending by `count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MilestoneSchedule {
    milestones: Vec<ReferralMilestone>,
}

impl MilestoneSchedule {
    /// Validate and wrap a milestone list.
    ///
    /// # Errors
    /// Returns `MilestonesNotAscending` if any threshold is not strictly
    /// greater than the one before it.
    pub fn new(milestones: Vec<ReferralMilestone>) -> Result<Self, ValidationError> {
        for (index, pair) in milestones.windows(2).enumerate() {
            if pair[1].count <= pair[0].count {
                return Err(ValidationError::MilestonesNotAscending {
                    index: index + 1,
                    count: pair[1].count,
                    previous: pair[0].count,
                });
            }
        }
        Ok(Self { milestones })
    }

    /// Sort by threshold, keeping the first milestone when two share a count.
    pub fn from_unsorted(mut milestones: Vec<ReferralMilestone>) -> Self {
        milestones.sort_by_key(|m| m.count);
        milestones.dedup_by_key(|m| m.count);
        Self { milestones }
    }

    pub fn empty() -> Self {
        Self {
            milestones: Vec::new(),
        }
    }

    pub fn milestones(&self) -> &[ReferralMilestone] {
        &self.milestones
    }

    pub fn is_empty(&self) -> bool {
        self.milestones.is_empty()
    }

    pub fn len(&self) -> usize {
        self.milestones.len()
    }

    /// Evaluate the schedule for `current_referrals`. Negative counts are
    /// treated as zero.
    pub fn progress(&self, current_referrals: i64) -> RewardProgress {
        let current = current_referrals.clamp(0, u32::MAX as i64) as u32;

        let statuses = self
            .milestones
            .iter()
            .map(|m| MilestoneStatus {
                milestone: m.clone(),
                is_unlocked: m.is_unlocked(current),
            })
            .collect::<Vec<_>>();

        let next_index = statuses.iter().position(|s| !s.is_unlocked);

        let progress_percent = match next_index {
            None => 100.0,
            Some(index) => {
                let next = self.milestones[index].count;
                let prev = if index == 0 {
                    0
                } else {
                    self.milestones[index - 1].count
                };
                segment_percent(current, prev, next)
            }
        };

        RewardProgress {
            current_referrals: current,
            next_milestone: next_index.map(|i| self.milestones[i].clone()),
            milestones: statuses,
            progress_percent,
        }
    }

    /// Milestones crossed when the count moves from `before` to `after`.
    pub fn newly_unlocked(&self, before: u32, after: u32) -> Vec<&ReferralMilestone> {
        self.milestones
            .iter()
            .filter(|m| !m.is_unlocked(before) && m.is_unlocked(after))
            .collect()
    }
}

fn segment_percent(current: u32, prev: u32, next: u32) -> f64 {
    let span = next.saturating_sub(prev);
    if span == 0 {
        return 100.0;
    }
    let done = current as f64 - prev as f64;
    (done / span as f64 * 100.0).clamp(0.0, 100.0)
}

impl<'de> Deserialize<'de> for MilestoneSchedule {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let milestones = Vec::<ReferralMilestone>::deserialize(deserializer)?;
        MilestoneSchedule::new(milestones).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tiers(counts: &[u32]) -> MilestoneSchedule {
        MilestoneSchedule::new(
            counts
                .iter()
                .map(|&c| ReferralMilestone::new(c, Reward::EliteStatus))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn seven_referrals_sits_forty_percent_toward_ten() {
        let progress = tiers(&[3, 5, 10, 20]).progress(7);

        let unlocked: Vec<u32> = progress
            .milestones
            .iter()
            .filter(|m| m.is_unlocked)
            .map(|m| m.milestone.count)
            .collect();
        assert_eq!(unlocked, vec![3, 5]);
        assert_eq!(progress.next_milestone.as_ref().map(|m| m.count), Some(10));
        assert!((progress.progress_percent - 40.0).abs() < 1e-9);
        assert_eq!(progress.referrals_to_next(), 3);
    }

    #[test]
    fn first_segment_starts_at_zero() {
        let progress = tiers(&[4, 8]).progress(1);
        assert!((progress.progress_percent - 25.0).abs() < 1e-9);
    }

    #[test]
    fn exact_threshold_unlocks() {
        let progress = tiers(&[3, 5]).progress(3);
        assert_eq!(progress.unlocked_count(), 1);
        assert_eq!(progress.next_milestone.map(|m| m.count), Some(5));
        assert_eq!(progress.progress_percent, 0.0);
    }

    #[test]
    fn all_unlocked_is_complete() {
        let progress = tiers(&[1, 2]).progress(50);
        assert!(progress.next_milestone.is_none());
        assert_eq!(progress.progress_percent, 100.0);
        assert_eq!(progress.referrals_to_next(), 0);
    }

    #[test]
    fn empty_schedule_is_complete() {
        let progress = MilestoneSchedule::empty().progress(3);
        assert!(progress.milestones.is_empty());
        assert!(progress.next_milestone.is_none());
        assert_eq!(progress.progress_percent, 100.0);
    }

    #[test]
    fn negative_referrals_clamp_to_zero() {
        let progress = tiers(&[3, 5]).progress(-4);
        assert_eq!(progress.current_referrals, 0);
        assert_eq!(progress.progress_percent, 0.0);
        assert_eq!(progress.unlocked_count(), 0);
    }

    #[test]
    fn rejects_unsorted_and_duplicate_thresholds() {
        let err = MilestoneSchedule::new(vec![
            ReferralMilestone::new(5, Reward::EliteStatus),
            ReferralMilestone::new(3, Reward::EliteStatus),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::MilestonesNotAscending {
                index: 1,
                count: 3,
                previous: 5
            }
        );
        assert!(MilestoneSchedule::new(vec![
            ReferralMilestone::new(3, Reward::EliteStatus),
            ReferralMilestone::new(3, Reward::EliteStatus),
        ])
        .is_err());
    }

    #[test]
    fn from_unsorted_sorts_and_dedups() {
        let schedule = MilestoneSchedule::from_unsorted(vec![
            ReferralMilestone::new(10, Reward::EliteStatus),
            ReferralMilestone::new(3, Reward::PremiumTrial { days: 7 }),
            ReferralMilestone::new(3, Reward::EliteStatus),
        ]);
        let counts: Vec<u32> = schedule.milestones().iter().map(|m| m.count).collect();
        assert_eq!(counts, vec![3, 10]);
        assert_eq!(schedule.milestones()[0].reward, Reward::PremiumTrial { days: 7 });
    }

    #[test]
    fn newly_unlocked_reports_crossed_thresholds() {
        let schedule = tiers(&[3, 5, 10]);
        let crossed: Vec<u32> = schedule.newly_unlocked(2, 6).iter().map(|m| m.count).collect();
        assert_eq!(crossed, vec![3, 5]);
        assert!(schedule.newly_unlocked(6, 6).is_empty());
    }

    #[test]
    fn deserialize_validates_order() {
        let ok: MilestoneSchedule =
            serde_json::from_str(r#"[{"count":1,"reward":{"type":"elite_status"}}]"#).unwrap();
        assert_eq!(ok.len(), 1);
        let bad = serde_json::from_str::<MilestoneSchedule>(
            r#"[{"count":2,"reward":{"type":"elite_status"}},{"count":1,"reward":{"type":"elite_status"}}]"#,
        );
        assert!(bad.is_err());
    }

    fn arb_schedule() -> impl Strategy<Value = MilestoneSchedule> {
        prop::collection::btree_set(1u32..500, 0..8).prop_map(|counts| {
            MilestoneSchedule::new(
                counts
                    .into_iter()
                    .map(|c| ReferralMilestone::new(c, Reward::EliteStatus))
                    .collect(),
            )
            .unwrap()
        })
    }

    proptest! {
        #[test]
        fn progress_percent_within_bounds(schedule in arb_schedule(), current in -50i64..1000) {
            let p = schedule.progress(current).progress_percent;
            prop_assert!((0.0..=100.0).contains(&p));
        }

        #[test]
        fn progress_rank_is_monotonic(schedule in arb_schedule(), current in 0i64..600) {
            let a = schedule.progress(current).rank();
            let b = schedule.progress(current + 1).rank();
            prop_assert!(b.0 > a.0 || (b.0 == a.0 && b.1 >= a.1));
        }

        #[test]
        fn unlock_flags_match_threshold(schedule in arb_schedule(), current in 0i64..600) {
            let progress = schedule.progress(current);
            for status in &progress.milestones {
                prop_assert_eq!(status.is_unlocked, current >= status.milestone.count as i64);
            }
        }
    }
}
