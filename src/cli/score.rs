use anyhow::Result;
use health_balance::config::HealthConfig;
use health_balance::metrics::{current_score, weekly_series, ScoreError};

use super::open_store;

/// Print the current score, or with `all` every complete week oldest first.
pub fn run(config: &HealthConfig, all: bool, json: bool) -> Result<()> {
    let store = open_store(config)?;
    let today = chrono::Local::now().date_naive();

    if !all {
        let entry = current_score(&store, &config.scoring, today);
        if json {
            println!("{}", serde_json::to_string_pretty(&entry)?);
        } else {
            println!("Master score: {:.1}", entry.score);
            println!("  Week of:    {}", entry.date);
            println!("  Health:     {:+.1}", entry.health_score);
            println!("  Fitness:    {:+.1}", entry.fitness_score);
            println!("  Cognition:  {:+.1}", entry.cognition_score);
            println!("  Aging tax:  {:.2}", entry.aging_tax);
        }
        return Ok(());
    }

    let series = match weekly_series(&store, &config.scoring, today) {
        Ok(series) => series,
        Err(ScoreError::ProfileRequired) => {
            eprintln!("No profile saved. Run `health-balance profile` first.");
            return Ok(());
        }
        Err(ScoreError::Storage(e)) => return Err(e),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&series)?);
        return Ok(());
    }

    if series.is_empty() {
        println!("No complete weeks yet. Starting score: {:.1}", config.scoring.starting_score);
        return Ok(());
    }

    println!(
        "{:<12} {:>10} {:>9} {:>9} {:>10} {:>9}",
        "Week", "Score", "Health", "Fitness", "Cognition", "Tax"
    );
    println!("{}", "-".repeat(64));
    for entry in &series {
        println!(
            "{:<12} {:>10.1} {:>+9.1} {:>+9.1} {:>+10.1} {:>9.2}",
            entry.date.to_string(),
            entry.score,
            entry.health_score,
            entry.fitness_score,
            entry.cognition_score,
            entry.aging_tax
        );
    }

    Ok(())
}
