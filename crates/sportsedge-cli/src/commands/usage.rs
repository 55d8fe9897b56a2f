use chrono::{DateTime, Duration, NaiveDate, Utc};
use clap::Subcommand;
use sportsedge_core::storage::{Config, UsageStore};

use super::print_json;

#[derive(Subcommand)]
pub enum UsageAction {
    /// Show today's free-use counter
    Show {
        /// Counter key; defaults to this device
        #[arg(long)]
        subject: Option<String>,
    },
    /// Count one free use
    Record {
        #[arg(long)]
        subject: Option<String>,
    },
    /// Grant extra free uses for today
    Bonus {
        #[arg(long, default_value_t = 1)]
        extra: u32,
        #[arg(long)]
        subject: Option<String>,
    },
    /// Delete counters older than the given number of days
    Purge {
        #[arg(long, default_value_t = 30)]
        days: u32,
    },
    /// Print this device's id
    Device,
}

pub fn run(action: UsageAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let store = UsageStore::open(config.access.limits())?;
    let now = Utc::now();

    let subject = |subject: Option<String>| -> Result<String, Box<dyn std::error::Error>> {
        match subject {
            Some(s) => Ok(s),
            None => Ok(store.device_id()?),
        }
    };

    match action {
        UsageAction::Show { subject: s } => {
            print_json(&store.view_count(&subject(s)?, now)?)?;
        }
        UsageAction::Record { subject: s } => {
            print_json(&store.record_view(&subject(s)?, now)?)?;
        }
        UsageAction::Bonus { extra, subject: s } => {
            print_json(&store.grant_bonus(&subject(s)?, extra, now)?)?;
        }
        UsageAction::Purge { days } => {
            let cutoff = purge_cutoff(now, days)
                .ok_or_else(|| format!("--days {days} reaches past the earliest date"))?;
            let removed = store.purge_before(cutoff)?;
            println!("removed {removed} counter(s)");
        }
        UsageAction::Device => {
            println!("{}", store.device_id()?);
        }
    }
    Ok(())
}

/// First day kept by a purge of counters older than `days`.
fn purge_cutoff(now: DateTime<Utc>, days: u32) -> Option<NaiveDate> {
    let span = Duration::try_days(i64::from(days))?;
    now.checked_sub_signed(span).map(|t| t.date_naive())
}
