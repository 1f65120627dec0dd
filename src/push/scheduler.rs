//! Weekly reminder scheduler.
//!
//! Once per tick the scheduler re-reads every subscription and, only while the
//! current week is still missing a pillar, sends a push to each subscriber
//! whose local weekday and `HH:MM` equal their configured reminder slot.
//! Sends run as detached tasks bounded by the HTTP client timeout, so one slow
//! push service cannot hold up the others or the next tick.
//!
//! The loop remembers the last slot it fired per endpoint and never fires the
//! same local `(date, HH:MM)` twice, even if two ticks land in one minute.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::client::{DeliveryOutcome, PushClient};
use super::vapid::{VapidError, VapidSigner};
use crate::config::NotificationConfig;
use crate::db::MetricStore;
use crate::metrics::types::PushSubscription;
use crate::metrics::current_week_key;

/// A subscriber's wall clock at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSlot {
    pub date: NaiveDate,
    /// 0 = Sunday .. 6 = Saturday.
    pub weekday: u32,
    /// `HH:MM`, 24-hour.
    pub time: String,
}

impl LocalSlot {
    /// Exact match on the subscriber's reminder weekday and `HH:MM`.
    pub fn matches(&self, sub: &PushSubscription) -> bool {
        self.weekday == sub.reminder_day && self.time == sub.reminder_time
    }
}

/// Resolve an IANA zone name, falling back to UTC for anything unrecognized.
pub fn resolve_timezone(name: &str) -> Tz {
    name.parse::<Tz>().unwrap_or_else(|_| {
        tracing::debug!(timezone = name, "unknown timezone, using UTC");
        Tz::UTC
    })
}

pub fn local_slot(timezone: &str, now: DateTime<Utc>) -> LocalSlot {
    let local = now.with_timezone(&resolve_timezone(timezone));
    LocalSlot {
        date: local.date_naive(),
        weekday: local.weekday().num_days_from_sunday(),
        time: local.format("%H:%M").to_string(),
    }
}

/// What a single tick decided.
#[derive(Debug)]
pub enum TickOutcome {
    NoSubscriptions,
    /// Subscriptions could not be read; nothing was evaluated.
    StoreUnavailable,
    /// All three pillars exist for this week; nobody is reminded.
    WeekComplete(NaiveDate),
    /// The VAPID key is missing or malformed; the send phase was skipped.
    KeyUnavailable,
    /// One handle per send started this tick (possibly none).
    Dispatched(Vec<JoinHandle<DeliveryOutcome>>),
}

pub struct NotificationScheduler {
    store: Arc<dyn MetricStore>,
    config: NotificationConfig,
    http: reqwest::Client,
    last_fired: HashMap<String, LocalSlot>,
}

impl NotificationScheduler {
    pub fn new(store: Arc<dyn MetricStore>, config: NotificationConfig) -> Result<Self> {
        let http = PushClient::http_client(&config)?;
        Ok(Self {
            store,
            config,
            http,
            last_fired: HashMap::new(),
        })
    }

    /// Run [`Self::run`] on the tokio runtime for the rest of the process.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Tick forever on a fixed interval.
    pub async fn run(mut self) {
        let period = Duration::from_secs(self.config.tick_secs.max(1));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(tick_secs = period.as_secs(), "notification scheduler started");
        loop {
            interval.tick().await;
            self.tick(Utc::now(), current_week_key());
        }
    }

    /// Evaluate every subscription at `now` for the week keyed by `week`.
    /// Must be called from within a tokio runtime.
    pub fn tick(&mut self, now: DateTime<Utc>, week: NaiveDate) -> TickOutcome {
        let subs = match self.store.subscriptions() {
            Ok(subs) => subs,
            Err(e) => {
                tracing::error!(error = %e, "scheduler failed to load subscriptions");
                return TickOutcome::StoreUnavailable;
            }
        };
        self.last_fired
            .retain(|endpoint, _| subs.iter().any(|s| &s.endpoint == endpoint));
        if subs.is_empty() {
            return TickOutcome::NoSubscriptions;
        }

        if self.week_is_complete(week) {
            tracing::debug!(week = %week, "skipping reminders, week is complete");
            return TickOutcome::WeekComplete(week);
        }

        let client = match self.push_client() {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(error = %e, "skipping reminders, VAPID key unavailable");
                return TickOutcome::KeyUnavailable;
            }
        };

        let mut handles = Vec::new();
        for sub in subs {
            let slot = local_slot(&sub.timezone, now);
            if !slot.matches(&sub) {
                continue;
            }
            if self.last_fired.get(&sub.endpoint) == Some(&slot) {
                tracing::debug!(endpoint = %sub.endpoint, "reminder already sent for this slot");
                continue;
            }

            tracing::info!(
                endpoint = %sub.endpoint,
                timezone = %sub.timezone,
                local_time = %slot.time,
                "sending weekly reminder"
            );
            self.last_fired.insert(sub.endpoint.clone(), slot);

            let store = Arc::clone(&self.store);
            let client = client.clone();
            handles.push(tokio::spawn(deliver_and_reconcile(store, client, sub.endpoint)));
        }

        TickOutcome::Dispatched(handles)
    }

    /// A failed read counts as a missing pillar.
    fn week_is_complete(&self, week: NaiveDate) -> bool {
        let health = self.store.health_metrics(week);
        let fitness = self.store.fitness_metrics(week);
        let cognition = self.store.cognition_metrics(week);
        matches!(
            (health, fitness, cognition),
            (Ok(Some(_)), Ok(Some(_)), Ok(Some(_)))
        )
    }

    /// Decodes the VAPID key. Called once per tick.
    fn push_client(&self) -> Result<PushClient, VapidError> {
        let private = self
            .config
            .vapid_private_key
            .as_deref()
            .ok_or(VapidError::MissingKey)?;
        let signer = VapidSigner::from_base64(
            private,
            self.config.subject.clone(),
            chrono::Duration::hours(self.config.token_lifetime_hours),
        )?;
        Ok(PushClient::new(
            self.http.clone(),
            Arc::new(signer),
            self.config.vapid_public_key.clone(),
            self.config.ttl_secs,
        ))
    }
}

/// Send one reminder and purge the subscription if the push service says it is gone.
async fn deliver_and_reconcile(
    store: Arc<dyn MetricStore>,
    client: PushClient,
    endpoint: String,
) -> DeliveryOutcome {
    let outcome = client.deliver(&endpoint).await;
    if let DeliveryOutcome::Gone(status) = outcome {
        tracing::info!(
            endpoint = %endpoint,
            status = status.as_u16(),
            "push subscription stale, purging"
        );
        if let Err(e) = store.delete_push_subscription(&endpoint) {
            tracing::error!(endpoint = %endpoint, error = %e, "failed to delete stale subscription");
        }
    }
    outcome
}
