//! Score compounding engine.
//!
//! The longevity score is never stored. Every query replays the full metric
//! history, oldest week first, as a fold over a running score:
//!
//! 1. Weeks missing any pillar are skipped outright: no aging tax, no points.
//! 2. A complete week first loses `running * age² / 8000 / 52` (the aging tax),
//!    then gains the three pillar point totals. The result is clamped at zero
//!    and carried into the next week.
//!
//! Age and the resting heart rate baseline are both evaluated against "today",
//! not against the historical week, so a birthday shifts the whole history.

use chrono::NaiveDate;
use thiserror::Error;

use super::baselines::{reaction_time_baseline, vo2_max_baseline};
use super::pillars::{cognition_points, fitness_points, health_points};
use super::types::{MasterScoreEntry, UserProfile, WeekRecord};
use crate::config::ScoringConfig;
use crate::db::MetricStore;

#[derive(Debug, Error)]
pub enum ScoreError {
    /// No profile saved yet. Expected on first run; callers show the starting score.
    #[error("profile required for master score calculation")]
    ProfileRequired,
    /// A read failed part way through the history. No partial series is returned.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Fraction of the running score lost per week at the given age.
pub fn weekly_decay_rate(age: i32) -> f64 {
    let age = f64::from(age);
    age * age / 8000.0 / 52.0
}

/// Per-week inputs that do not come from the week's own records.
#[derive(Debug, Clone, Copy)]
pub struct Baselines {
    pub age: i32,
    pub height_cm: f64,
    /// Trailing resting heart rate average; 0.0 means unavailable.
    pub rhr: f64,
    pub vo2_max: f64,
    pub reaction_ms: i32,
    pub cardio_recovery: i32,
}

impl Baselines {
    pub fn for_profile(
        profile: &UserProfile,
        rhr_baseline: f64,
        config: &ScoringConfig,
        today: NaiveDate,
    ) -> Self {
        let age = profile.age_on(today);
        Self {
            age,
            height_cm: profile.height_cm,
            rhr: rhr_baseline,
            vo2_max: vo2_max_baseline(age, profile.sex),
            reaction_ms: reaction_time_baseline(age),
            cardio_recovery: config.cardio_recovery_baseline,
        }
    }
}

/// Apply one week to the running score. Returns `None` for an incomplete week,
/// in which case the running score must be carried forward unchanged.
pub fn compound_week(running: f64, week: &WeekRecord, b: &Baselines) -> Option<MasterScoreEntry> {
    let (health, fitness, cognition) = week.complete()?;

    let rhr_baseline = if b.rhr > 0.0 {
        b.rhr
    } else {
        f64::from(health.resting_heart_rate)
    };

    let aging_tax = running * weekly_decay_rate(b.age);
    let health_score = health_points(health, b.height_cm, rhr_baseline);
    let fitness_score = fitness_points(fitness, b.vo2_max, b.cardio_recovery);
    let cognition_score = cognition_points(cognition, b.reaction_ms);

    let score = (running - aging_tax + health_score + fitness_score + cognition_score).max(0.0);

    Some(MasterScoreEntry {
        date: week.date,
        score,
        health_score,
        fitness_score,
        cognition_score,
        aging_tax,
    })
}

/// Replay an in-memory history. Input order does not matter; weeks are
/// processed strictly by ascending date. Returns one entry per complete week,
/// oldest first.
pub fn replay(
    profile: &UserProfile,
    rhr_baseline: f64,
    history: &[WeekRecord],
    config: &ScoringConfig,
    today: NaiveDate,
) -> Vec<MasterScoreEntry> {
    let baselines = Baselines::for_profile(profile, rhr_baseline, config, today);

    let mut weeks: Vec<&WeekRecord> = history.iter().collect();
    weeks.sort_by_key(|w| w.date);

    let mut running = config.starting_score;
    let mut series = Vec::new();
    for week in weeks {
        match compound_week(running, week, &baselines) {
            Some(entry) => {
                running = entry.score;
                series.push(entry);
            }
            None => tracing::trace!(date = %week.date, "skipping incomplete week"),
        }
    }
    series
}

/// Load every dated record from the store. Any read failure aborts the load.
pub fn load_history(store: &dyn MetricStore) -> anyhow::Result<Vec<WeekRecord>> {
    let mut dates = store.dates_with_data()?;
    dates.sort();
    dates.dedup();

    dates
        .into_iter()
        .map(|date| {
            Ok(WeekRecord {
                date,
                health: store.health_metrics(date)?,
                fitness: store.fitness_metrics(date)?,
                cognition: store.cognition_metrics(date)?,
            })
        })
        .collect()
}

/// Full recompute of the weekly score series from persisted data.
pub fn weekly_series(
    store: &dyn MetricStore,
    config: &ScoringConfig,
    today: NaiveDate,
) -> Result<Vec<MasterScoreEntry>, ScoreError> {
    let profile = store.user_profile()?.ok_or(ScoreError::ProfileRequired)?;
    let history = load_history(store)?;
    let rhr_baseline = store.rhr_baseline(today)?;

    Ok(replay(&profile, rhr_baseline, &history, config, today))
}

/// Latest score for display. Never fails: without a profile, without a
/// complete week, or on a storage error it falls back to the starting score.
pub fn current_score(
    store: &dyn MetricStore,
    config: &ScoringConfig,
    today: NaiveDate,
) -> MasterScoreEntry {
    match weekly_series(store, config, today) {
        Ok(mut series) => series
            .pop()
            .unwrap_or_else(|| MasterScoreEntry::starting(today, config.starting_score)),
        Err(ScoreError::ProfileRequired) => {
            tracing::debug!("no profile yet, showing starting score");
            MasterScoreEntry::starting(today, config.starting_score)
        }
        Err(ScoreError::Storage(e)) => {
            tracing::warn!(error = %e, "could not compute score, showing starting score");
            MasterScoreEntry::starting(today, config.starting_score)
        }
    }
}
