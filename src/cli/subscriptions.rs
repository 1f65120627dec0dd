use anyhow::Result;
use clap::{Args, Subcommand};
use health_balance::config::HealthConfig;
use health_balance::db::MetricStore;
use health_balance::metrics::types::PushSubscription;

use super::open_store;

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Subcommand)]
pub enum SubscriptionsAction {
    /// Register a browser endpoint, or update its reminder slot
    Add(AddArgs),
    /// List every registered endpoint with its reminder slot
    List,
    /// Remove a subscription by endpoint
    Remove { endpoint: String },
}

#[derive(Args)]
pub struct AddArgs {
    #[arg(long)]
    pub endpoint: String,
    /// Client public key (base64url)
    #[arg(long)]
    pub p256dh: String,
    /// Client auth secret (base64url)
    #[arg(long)]
    pub auth: String,
    /// Reminder weekday, 0 = Sunday .. 6 = Saturday
    #[arg(long)]
    pub day: u32,
    /// Reminder time, HH:MM 24-hour
    #[arg(long)]
    pub time: String,
    /// IANA timezone name
    #[arg(long, default_value = "UTC")]
    pub timezone: String,
}

pub fn run(config: &HealthConfig, action: SubscriptionsAction) -> Result<()> {
    let store = open_store(config)?;

    match action {
        SubscriptionsAction::Add(args) => {
            let sub = PushSubscription {
                endpoint: args.endpoint,
                p256dh: args.p256dh,
                auth: args.auth,
                reminder_day: args.day,
                reminder_time: args.time,
                timezone: args.timezone,
            };
            sub.validate()?;
            if sub.timezone.parse::<chrono_tz::Tz>().is_err() {
                tracing::warn!(timezone = %sub.timezone, "unknown timezone, reminders will use UTC");
            }
            store.save_push_subscription(&sub)?;
            println!(
                "Subscribed {} for {} {} ({})",
                sub.endpoint, WEEKDAYS[sub.reminder_day as usize], sub.reminder_time, sub.timezone
            );
        }
        SubscriptionsAction::List => {
            let subs = store.subscriptions()?;
            if subs.is_empty() {
                println!("No push subscriptions.");
                return Ok(());
            }
            for sub in &subs {
                let day = WEEKDAYS
                    .get(sub.reminder_day as usize)
                    .copied()
                    .unwrap_or("?");
                println!(
                    "{day} {} {:<20} {}",
                    sub.reminder_time, sub.timezone, sub.endpoint
                );
            }
            println!("\n{} subscription(s)", subs.len());
        }
        SubscriptionsAction::Remove { endpoint } => {
            store.delete_push_subscription(&endpoint)?;
            println!("Removed {endpoint}");
        }
    }

    Ok(())
}
