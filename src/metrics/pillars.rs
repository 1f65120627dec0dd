//! Per-pillar point scorers.
//!
//! Each scorer turns one week's raw metrics into signed points relative to a
//! baseline: positive means better than expected. Nothing is clamped here;
//! clamping happens once, on the compounded total. Integer inputs are widened
//! to `f64` before any arithmetic, so out-of-range values cannot overflow.

use super::types::{CognitionMetrics, FitnessMetrics, HealthMetrics};

/// Waist-to-height ratio treated as neutral.
const TARGET_WAIST_TO_HEIGHT: f64 = 0.48;

/// Health points: sleep, waist-to-height ratio, resting heart rate, nutrition.
pub fn health_points(m: &HealthMetrics, height_cm: f64, rhr_baseline: f64) -> f64 {
    let waist_to_height = m.waist_cm / height_cm;

    let sleep = (f64::from(m.sleep_score) - 75.0) * 2.0;
    let waist = (TARGET_WAIST_TO_HEIGHT - waist_to_height) * 1000.0;
    let rhr = (rhr_baseline - f64::from(m.resting_heart_rate)) * 5.0;
    let nutrition = (m.nutrition_score - 7.0) * 5.0;

    sleep + waist + rhr + nutrition
}

/// Fitness points: VO2max, workouts, steps, mobility, cardio recovery.
pub fn fitness_points(m: &FitnessMetrics, vo2_max_baseline: f64, recovery_baseline: i32) -> f64 {
    let vo2 = (m.vo2_max - vo2_max_baseline) * 20.0;
    let workouts = (f64::from(m.weekly_workouts) - 3.0) * 20.0;
    let steps = (f64::from(m.daily_steps) - 8000.0) / 150.0;
    let mobility = (f64::from(m.weekly_mobility) - 3.0) * 10.0;
    let recovery = (f64::from(m.cardio_recovery) - f64::from(recovery_baseline)) * 3.0;

    vo2 + workouts + steps + mobility + recovery
}

/// Cognition points: dual n-back level, reaction time, mindfulness.
pub fn cognition_points(m: &CognitionMetrics, reaction_baseline: i32) -> f64 {
    let memory = (f64::from(m.dual_n_back_level) - 2.0) * 20.0;
    let reaction = (f64::from(reaction_baseline) - f64::from(m.reaction_time_ms)) / 2.0;
    let mindfulness = (f64::from(m.weekly_mindfulness) - 3.0) * 5.0;

    memory + reaction + mindfulness
}
