//! CLI `history` command: recent records for one or all pillars.

use anyhow::Result;
use clap::ValueEnum;
use health_balance::config::HealthConfig;
use health_balance::db::MetricStore;

use super::open_store;

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Pillar {
    Health,
    Fitness,
    Cognition,
}

/// Print up to `limit` weeks per pillar, newest first.
pub fn run(config: &HealthConfig, pillar: Option<Pillar>, limit: usize, json: bool) -> Result<()> {
    let store = open_store(config)?;
    let show = |p: Pillar| pillar.map_or(true, |wanted| wanted == p);

    if json {
        let mut out = serde_json::Map::new();
        if show(Pillar::Health) {
            out.insert("health".into(), serde_json::to_value(store.recent_health_metrics(limit)?)?);
        }
        if show(Pillar::Fitness) {
            out.insert(
                "fitness".into(),
                serde_json::to_value(store.recent_fitness_metrics(limit)?)?,
            );
        }
        if show(Pillar::Cognition) {
            out.insert(
                "cognition".into(),
                serde_json::to_value(store.recent_cognition_metrics(limit)?)?,
            );
        }
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if show(Pillar::Health) {
        let rows = store.recent_health_metrics(limit)?;
        println!("Health");
        println!("{}", "=".repeat(50));
        println!("  {:<12} {:>6} {:>8} {:>5} {:>10}", "Week", "Sleep", "Waist", "RHR", "Nutrition");
        for m in &rows {
            println!(
                "  {:<12} {:>6} {:>8.1} {:>5} {:>10.1}",
                m.date.to_string(),
                m.sleep_score,
                m.waist_cm,
                m.resting_heart_rate,
                m.nutrition_score
            );
        }
        if rows.is_empty() {
            println!("  (no records)");
        }
        println!();
    }

    if show(Pillar::Fitness) {
        let rows = store.recent_fitness_metrics(limit)?;
        println!("Fitness");
        println!("{}", "=".repeat(50));
        println!(
            "  {:<12} {:>7} {:>8} {:>7} {:>8} {:>8}",
            "Week", "VO2max", "Workouts", "Steps", "Mobility", "Recovery"
        );
        for m in &rows {
            println!(
                "  {:<12} {:>7.1} {:>8} {:>7} {:>8} {:>8}",
                m.date.to_string(),
                m.vo2_max,
                m.weekly_workouts,
                m.daily_steps,
                m.weekly_mobility,
                m.cardio_recovery
            );
        }
        if rows.is_empty() {
            println!("  (no records)");
        }
        println!();
    }

    if show(Pillar::Cognition) {
        let rows = store.recent_cognition_metrics(limit)?;
        println!("Cognition");
        println!("{}", "=".repeat(50));
        println!("  {:<12} {:>7} {:>9} {:>12}", "Week", "N-back", "Reaction", "Mindfulness");
        for m in &rows {
            println!(
                "  {:<12} {:>7} {:>7}ms {:>12}",
                m.date.to_string(),
                m.dual_n_back_level,
                m.reaction_time_ms,
                m.weekly_mindfulness
            );
        }
        if rows.is_empty() {
            println!("  (no records)");
        }
    }

    Ok(())
}
