pub mod history;
pub mod record;
pub mod score;
pub mod subscriptions;

use std::sync::Arc;

use anyhow::Result;
use health_balance::config::HealthConfig;
use health_balance::db::{MetricStore, SqliteStore};
use health_balance::push::vapid::generate_keypair;
use health_balance::push::NotificationScheduler;

/// Open the configured database.
pub fn open_store(config: &HealthConfig) -> Result<SqliteStore> {
    let db_path = config.resolved_db_path();
    let store = SqliteStore::open(&db_path, config.scoring.rhr_window_months)?;
    tracing::info!(db = %db_path.display(), "database ready");
    Ok(store)
}

/// Run the reminder scheduler until ctrl-c.
pub async fn serve(config: HealthConfig) -> Result<()> {
    let store: Arc<dyn MetricStore> = Arc::new(open_store(&config)?);

    let scheduler = if config.notifications.enabled {
        if config.notifications.vapid_private_key.is_none() {
            tracing::warn!("VAPID_PRIVATE_KEY not set, reminders will not be sent");
        }
        Some(NotificationScheduler::new(store, config.notifications.clone())?.spawn())
    } else {
        tracing::info!("notifications disabled in config");
        None
    };

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    if let Some(handle) = scheduler {
        handle.abort();
    }
    Ok(())
}

pub fn generate_keys() {
    let (private, public) = generate_keypair();
    println!("VAPID_PUBLIC_KEY={public}");
    println!("VAPID_PRIVATE_KEY={private}");
}
