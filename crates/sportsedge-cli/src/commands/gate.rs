use clap::Subcommand;
use serde_json::json;
use sportsedge_core::access::{self, GateInput};
use sportsedge_core::services::{SubscriptionLookup, ViewCounter};
use sportsedge_core::storage::{Config, UsageStore};
use sportsedge_core::AccessSession;

use super::{api_client, block_on, print_json};

#[derive(Subcommand)]
pub enum GateAction {
    /// Evaluate the gate for a premium pick list
    Check {
        /// User has an active subscription
        #[arg(long)]
        premium: bool,
        /// User already used today's free pick
        #[arg(long)]
        used_today: bool,
        /// Free uses left today
        #[arg(long, default_value_t = 1)]
        remaining: u32,
        /// No eligible games to show
        #[arg(long)]
        no_content: bool,
    },
    /// Evaluate the free daily pick flow
    FreePick {
        #[arg(long)]
        premium: bool,
        #[arg(long)]
        used_today: bool,
        #[arg(long, default_value_t = 1)]
        remaining: u32,
        /// Interstitial ad was watched
        #[arg(long)]
        ad_viewed: bool,
        #[arg(long)]
        no_content: bool,
    },
    /// Resolve a user's access against the backend (fails closed)
    User {
        /// User id; omit for an anonymous user on this device
        user_id: Option<String>,
        /// Number of eligible items on the screen
        #[arg(long, default_value_t = 1)]
        items: usize,
        #[arg(long)]
        ad_viewed: bool,
        /// Count free uses in the local store instead of the backend
        #[arg(long)]
        local: bool,
    },
}

pub fn run(action: GateAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        GateAction::Check {
            premium,
            used_today,
            remaining,
            no_content,
        } => {
            let input = GateInput {
                has_premium: premium,
                used_free_today: used_today,
                remaining_uses: remaining,
                ad_viewed: false,
            };
            let items = if no_content { 0 } else { 1 };
            print_json(&access::present(items, &input))
        }
        GateAction::FreePick {
            premium,
            used_today,
            remaining,
            ad_viewed,
            no_content,
        } => {
            let input = GateInput {
                has_premium: premium,
                used_free_today: used_today,
                remaining_uses: remaining,
                ad_viewed,
            };
            let items = if no_content { 0 } else { 1 };
            print_json(&access::present_free_pick(items, &input))
        }
        GateAction::User {
            user_id,
            items,
            ad_viewed,
            local,
        } => user_access(user_id, items, ad_viewed, local),
    }
}

fn user_access(
    user_id: Option<String>,
    items: usize,
    ad_viewed: bool,
    local: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let api = api_client(&config)?;
    let limits = config.access.limits();

    if user_id.is_some() && !local {
        let session = AccessSession::new(api.clone(), api, limits, user_id);
        return report(session, items, ad_viewed);
    }

    let store = UsageStore::open(limits)?;
    let device = if config.access.track_anonymous_per_device {
        Some(store.device_id()?)
    } else {
        None
    };
    let session = AccessSession::new(api, &store, limits, user_id).with_anonymous_subject(device);
    report(session, items, ad_viewed)
}

fn report<S: SubscriptionLookup, V: ViewCounter>(
    mut session: AccessSession<S, V>,
    items: usize,
    ad_viewed: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (gate, free_pick) = block_on(async {
        session.refresh().await;
        (
            session.present(items),
            session.present_free_pick(items, ad_viewed),
        )
    })?;

    let events = session.drain_events();
    print_json(&json!({
        "state": session.state(),
        "gate": gate,
        "freePick": free_pick,
        "events": events,
    }))
}
