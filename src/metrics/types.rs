//! Core record definitions.
//!
//! Defines the single [`UserProfile`], the three weekly pillar records
//! ([`HealthMetrics`], [`FitnessMetrics`], [`CognitionMetrics`]), the derived
//! [`MasterScoreEntry`], and [`PushSubscription`].

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Biological sex, used only to offset the VO2max baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// SQL-compatible string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }

    /// Case-insensitive parse. Anything that is not `male` lands in the
    /// female branch, so this never fails.
    pub fn from_label(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("male") {
            Self::Male
        } else {
            Self::Female
        }
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The one user this system serves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub birth_date: NaiveDate,
    pub sex: Sex,
    pub height_cm: f64,
}

impl UserProfile {
    /// Whole years between `birth_date` and `today`.
    pub fn age_on(&self, today: NaiveDate) -> i32 {
        let mut age = today.year() - self.birth_date.year();
        if (today.month(), today.day()) < (self.birth_date.month(), self.birth_date.day()) {
            age -= 1;
        }
        age
    }
}

/// Health pillar inputs for one week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthMetrics {
    pub date: NaiveDate,
    /// Weekly average sleep score, 0-100.
    pub sleep_score: i32,
    pub waist_cm: f64,
    pub resting_heart_rate: i32,
    /// Self-assessed, 1-10.
    pub nutrition_score: f64,
}

/// Fitness pillar inputs for one week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessMetrics {
    pub date: NaiveDate,
    pub vo2_max: f64,
    pub weekly_workouts: i32,
    pub daily_steps: i32,
    pub weekly_mobility: i32,
    /// Heart rate drop 60 seconds after exertion, in BPM.
    pub cardio_recovery: i32,
}

/// Cognition pillar inputs for one week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CognitionMetrics {
    pub date: NaiveDate,
    pub dual_n_back_level: i32,
    pub reaction_time_ms: i32,
    pub weekly_mindfulness: i32,
}

/// Everything recorded for one canonical week date. Any pillar may be missing.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekRecord {
    pub date: NaiveDate,
    pub health: Option<HealthMetrics>,
    pub fitness: Option<FitnessMetrics>,
    pub cognition: Option<CognitionMetrics>,
}

impl WeekRecord {
    /// Borrow all three pillars, or `None` if the week is incomplete.
    pub fn complete(&self) -> Option<(&HealthMetrics, &FitnessMetrics, &CognitionMetrics)> {
        match (&self.health, &self.fitness, &self.cognition) {
            (Some(h), Some(f), Some(c)) => Some((h, f, c)),
            _ => None,
        }
    }
}

/// One week of the replayed score history. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MasterScoreEntry {
    pub date: NaiveDate,
    pub score: f64,
    pub health_score: f64,
    pub fitness_score: f64,
    pub cognition_score: f64,
    /// Decay removed from the running score before the pillar points were added.
    pub aging_tax: f64,
}

impl MasterScoreEntry {
    /// Placeholder shown before any complete week exists.
    pub fn starting(date: NaiveDate, score: f64) -> Self {
        Self {
            date,
            score,
            health_score: 0.0,
            fitness_score: 0.0,
            cognition_score: 0.0,
            aging_tax: 0.0,
        }
    }
}

/// A browser push registration, keyed by `endpoint`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushSubscription {
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
    /// 0 = Sunday .. 6 = Saturday, in the subscriber's timezone.
    pub reminder_day: u32,
    /// `HH:MM`, 24-hour, in the subscriber's timezone.
    pub reminder_time: String,
    /// IANA zone name such as `Europe/Stockholm`.
    pub timezone: String,
}

/// Why a subscription was refused before it reached the store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubscriptionError {
    #[error("{0} must not be empty")]
    MissingField(&'static str),
    #[error("reminder day must be 0 (Sunday) to 6 (Saturday), got {0}")]
    DayOutOfRange(u32),
    #[error("reminder time must be HH:MM (24-hour), got '{0}'")]
    InvalidTime(String),
}

impl PushSubscription {
    /// Check the fields the scheduler relies on. The timezone is not checked
    /// here; unknown zones resolve to UTC at send time.
    pub fn validate(&self) -> Result<(), SubscriptionError> {
        for (name, value) in [
            ("endpoint", &self.endpoint),
            ("p256dh", &self.p256dh),
            ("auth", &self.auth),
        ] {
            if value.trim().is_empty() {
                return Err(SubscriptionError::MissingField(name));
            }
        }
        if self.reminder_day > 6 {
            return Err(SubscriptionError::DayOutOfRange(self.reminder_day));
        }
        let time_ok = NaiveTime::parse_from_str(&self.reminder_time, "%H:%M")
            .map(|t| t.format("%H:%M").to_string() == self.reminder_time)
            .unwrap_or(false);
        if !time_ok {
            return Err(SubscriptionError::InvalidTime(self.reminder_time.clone()));
        }
        Ok(())
    }
}
