//! Referral reward milestones.

pub mod experiments;
pub mod milestone;
pub mod schedule;

pub use experiments::{RewardExperiment, RewardVariant};
pub use milestone::{MilestoneSchedule, MilestoneStatus, ReferralMilestone, Reward, RewardProgress};
pub use schedule::{default_schedule, schedule_from_tiers, RewardTier};
