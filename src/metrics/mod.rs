pub mod baselines;
pub mod engine;
pub mod pillars;
pub mod types;
pub mod week;

pub use engine::{current_score, weekly_series, ScoreError};
pub use week::{current_week_key, week_key};
