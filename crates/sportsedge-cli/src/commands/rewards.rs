use clap::Subcommand;
use serde_json::json;
use sportsedge_core::rewards::RewardTier;
use sportsedge_core::services::{ExperimentRewardSource, RewardStructureProvider};
use sportsedge_core::storage::Config;
use sportsedge_core::RewardSession;

use super::{api_client, block_on, print_json};

#[derive(Subcommand)]
pub enum RewardsAction {
    /// Show referral progress against the user's schedule
    Progress {
        /// Current referral count
        #[arg(long, allow_negative_numbers = true)]
        referrals: i64,
        /// User id for A/B assignment
        #[arg(long)]
        user: Option<String>,
        /// Fetch the schedule from the backend
        #[arg(long)]
        remote: bool,
    },
    /// Show the schedule a user is assigned
    Schedule {
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        remote: bool,
    },
    /// Show a user's reward experiment variant
    Variant {
        user: String,
    },
}

pub fn run(action: RewardsAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    match action {
        RewardsAction::Progress {
            referrals,
            user,
            remote,
        } => {
            let mut session = load_session(&config, user.as_deref(), referrals, remote)?;
            let events = session.drain_events();
            print_json(&json!({
                "progress": session.progress(),
                "events": events,
            }))
        }
        RewardsAction::Schedule { user, remote } => {
            let session = load_session(&config, user.as_deref(), 0, remote)?;
            let tiers: Vec<RewardTier> = session
                .schedule()
                .milestones()
                .iter()
                .map(RewardTier::from)
                .collect();
            print_json(&tiers)
        }
        RewardsAction::Variant { user } => {
            let experiment = &config.rewards.experiment;
            let variant = experiment
                .assign(Some(&user))
                .ok_or("reward experiment has no variants")?;
            print_json(&json!({
                "experiment": experiment.id,
                "variant": variant.id,
                "bucket": experiment.bucket(&user),
                "assignmentKey": experiment.assignment_key(&user),
            }))
        }
    }
}

fn load_session(
    config: &Config,
    user: Option<&str>,
    referrals: i64,
    remote: bool,
) -> Result<RewardSession, Box<dyn std::error::Error>> {
    if remote {
        let api = api_client(config)?;
        load_with(&api, user, referrals)
    } else {
        let source = ExperimentRewardSource::new(config.rewards.experiment.clone());
        load_with(&source, user, referrals)
    }
}

fn load_with<P: RewardStructureProvider>(
    provider: &P,
    user: Option<&str>,
    referrals: i64,
) -> Result<RewardSession, Box<dyn std::error::Error>> {
    Ok(block_on(RewardSession::load(provider, user, referrals))?)
}
