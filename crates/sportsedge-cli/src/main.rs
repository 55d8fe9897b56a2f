use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "sportsedge", version, about = "SportsEdge CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Premium gate decisions
    Gate {
        #[command(subcommand)]
        action: commands::gate::GateAction,
    },
    /// Referral reward progress
    Rewards {
        #[command(subcommand)]
        action: commands::rewards::RewardsAction,
    },
    /// Confidence and momentum signals
    Signal {
        #[command(subcommand)]
        action: commands::signal::SignalAction,
    },
    /// Expected value of bets
    Odds {
        #[command(subcommand)]
        action: commands::odds::OddsAction,
    },
    /// Local free-use counter
    Usage {
        #[command(subcommand)]
        action: commands::usage::UsageAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Backend API credentials
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SPORTSEDGE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Gate { action } => commands::gate::run(action),
        Commands::Rewards { action } => commands::rewards::run(action),
        Commands::Signal { action } => commands::signal::run(action),
        Commands::Odds { action } => commands::odds::run(action),
        Commands::Usage { action } => commands::usage::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Auth { action } => commands::auth::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
