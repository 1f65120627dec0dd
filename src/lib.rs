//! Weekly health, fitness and cognition tracking with a compounding longevity score.
//!
//! One user logs three sets of weekly metrics ("pillars"). Each complete week
//! earns or loses points against age- and sex-adjusted baselines, after an
//! aging tax proportional to age² is taken from the running score:
//!
//! | Pillar | Inputs |
//! |--------|--------|
//! | **Health** | Sleep score, waist-to-height ratio, resting heart rate, nutrition |
//! | **Fitness** | VO2max, workouts, daily steps, mobility, cardio recovery |
//! | **Cognition** | Dual n-back level, reaction time, mindfulness |
//!
//! Weeks with a missing pillar are skipped entirely. The score is never stored;
//! it is replayed from raw history on every query.
//!
//! While the current week is incomplete, subscribed browsers are reminded with
//! VAPID-authenticated Web Push messages at their chosen local weekday and time.
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`db`] — SQLite schema, migrations and the [`db::MetricStore`] persistence contract
//! - [`metrics`] — Record types, baselines, pillar scorers and the score compounding engine
//! - [`push`] — VAPID signing, push delivery and the reminder scheduler

pub mod config;
pub mod db;
pub mod metrics;
pub mod push;
