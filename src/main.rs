mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use health_balance::config::HealthConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "health-balance", version, about = "Weekly longevity score tracker")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the push reminder scheduler until interrupted
    Serve,
    /// Show the current score, or the full weekly history
    Score {
        /// Print every complete week, oldest first
        #[arg(long)]
        all: bool,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show recent weekly records, newest first
    History {
        /// Only this pillar (default: all three)
        #[arg(value_enum)]
        pillar: Option<cli::history::Pillar>,
        /// Weeks per pillar
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Emit JSON instead of tables
        #[arg(long)]
        json: bool,
    },
    /// Create or update the user profile
    Profile(cli::record::ProfileArgs),
    /// Record this week's metrics for one pillar
    Record {
        #[command(subcommand)]
        pillar: cli::record::PillarCommand,
    },
    /// Manage VAPID keys
    Keys {
        #[command(subcommand)]
        action: KeysAction,
    },
    /// Add, list or remove push subscriptions
    Subscriptions {
        #[command(subcommand)]
        action: cli::subscriptions::SubscriptionsAction,
    },
}

#[derive(Subcommand)]
enum KeysAction {
    /// Print a new VAPID key pair for VAPID_PRIVATE_KEY / VAPID_PUBLIC_KEY
    Generate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let config = HealthConfig::load()?;

    // Log to stderr so stdout stays clean for --json output.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => cli::serve(config).await?,
        Command::Score { all, json } => cli::score::run(&config, all, json)?,
        Command::History { pillar, limit, json } => cli::history::run(&config, pillar, limit, json)?,
        Command::Profile(args) => cli::record::save_profile(&config, args)?,
        Command::Record { pillar } => cli::record::run(&config, pillar)?,
        Command::Keys { action } => match action {
            KeysAction::Generate => cli::generate_keys(),
        },
        Command::Subscriptions { action } => cli::subscriptions::run(&config, action)?,
    }

    Ok(())
}
