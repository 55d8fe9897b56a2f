//! # SportsEdge Core Library
//!
//! Business logic behind the SportsEdge prediction app. Every decision the
//! UI makes about what a user may see is computed here, so the mobile
//! client and the `sportsedge` CLI share one implementation.
//!
//! ## Architecture
//!
//! - **Access**: premium gating for pick lists and the free daily pick
//! - **Rewards**: referral milestone schedules, progress and A/B variants
//! - **Signals**: confidence/momentum badges and insight text
//! - **Services**: subscription, view-count and reward lookups that fail closed
//! - **Storage**: TOML configuration and a SQLite usage counter
//!
//! ## Key Components
//!
//! - [`AccessSession`]: per-view access lookups and gate decisions
//! - [`RewardSession`]: referral progress with unlock events
//! - [`MilestoneSchedule`]: validated, ascending reward thresholds
//! - [`Config`]: application configuration management

pub mod access;
pub mod rewards;
pub mod signals;
pub mod odds;
pub mod events;
pub mod notifications;
pub mod services;
pub mod session;
pub mod storage;
pub mod error;

pub use access::{AccessState, FreePickStep, GateInput, Presentation, UserAccessState};
pub use rewards::{MilestoneSchedule, ReferralMilestone, Reward, RewardProgress};
pub use signals::{ConfidenceColor, MomentumLabel, PredictionSignal};
pub use events::Event;
pub use notifications::{Notification, NotificationCenter};
pub use session::{AccessSession, RewardSession};
pub use storage::{Config, UsageStore};
pub use error::{ConfigError, CoreError, DatabaseError, ServiceError, ValidationError};
