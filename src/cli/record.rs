use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use health_balance::config::HealthConfig;
use health_balance::db::MetricStore;
use health_balance::metrics::types::{
    CognitionMetrics, FitnessMetrics, HealthMetrics, Sex, UserProfile,
};
use health_balance::metrics::week_key;

use super::open_store;

#[derive(Args)]
pub struct ProfileArgs {
    /// Birth date, YYYY-MM-DD
    #[arg(long)]
    pub birth_date: NaiveDate,
    /// `male` or `female`
    #[arg(long)]
    pub sex: String,
    /// Height in centimetres
    #[arg(long)]
    pub height: f64,
}

#[derive(Subcommand)]
pub enum PillarCommand {
    /// Sleep, waist, resting heart rate and nutrition
    Health {
        #[arg(long)]
        sleep: i32,
        #[arg(long)]
        waist: f64,
        #[arg(long)]
        rhr: i32,
        #[arg(long)]
        nutrition: f64,
        /// Any day in the target week (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// VO2max, workouts, steps, mobility and cardio recovery
    Fitness {
        #[arg(long)]
        vo2_max: f64,
        #[arg(long)]
        workouts: i32,
        #[arg(long)]
        steps: i32,
        #[arg(long)]
        mobility: i32,
        #[arg(long)]
        recovery: i32,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Dual n-back level, reaction time and mindfulness sessions
    Cognition {
        #[arg(long)]
        n_back: i32,
        #[arg(long)]
        reaction_ms: i32,
        #[arg(long)]
        mindfulness: i32,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Remove one pillar's record for a week
    Delete {
        /// health, fitness or cognition
        pillar: String,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

pub fn save_profile(config: &HealthConfig, args: ProfileArgs) -> Result<()> {
    if args.height <= 0.0 {
        bail!("height must be positive, got {}", args.height);
    }
    let store = open_store(config)?;
    let profile = UserProfile {
        birth_date: args.birth_date,
        sex: Sex::from_label(&args.sex),
        height_cm: args.height,
    };
    store.save_user_profile(&profile)?;
    println!(
        "Profile saved: born {}, {}, {} cm",
        profile.birth_date, profile.sex, profile.height_cm
    );
    Ok(())
}

fn target_week(date: Option<NaiveDate>) -> NaiveDate {
    week_key(date.unwrap_or_else(|| chrono::Local::now().date_naive()))
}

pub fn run(config: &HealthConfig, pillar: PillarCommand) -> Result<()> {
    let store = open_store(config)?;

    match pillar {
        PillarCommand::Health {
            sleep,
            waist,
            rhr,
            nutrition,
            date,
        } => {
            let date = target_week(date);
            store.save_health_metrics(&HealthMetrics {
                date,
                sleep_score: sleep,
                waist_cm: waist,
                resting_heart_rate: rhr,
                nutrition_score: nutrition,
            })?;
            println!("Health metrics saved for week of {date}");
        }
        PillarCommand::Fitness {
            vo2_max,
            workouts,
            steps,
            mobility,
            recovery,
            date,
        } => {
            let date = target_week(date);
            store.save_fitness_metrics(&FitnessMetrics {
                date,
                vo2_max,
                weekly_workouts: workouts,
                daily_steps: steps,
                weekly_mobility: mobility,
                cardio_recovery: recovery,
            })?;
            println!("Fitness metrics saved for week of {date}");
        }
        PillarCommand::Cognition {
            n_back,
            reaction_ms,
            mindfulness,
            date,
        } => {
            let date = target_week(date);
            store.save_cognition_metrics(&CognitionMetrics {
                date,
                dual_n_back_level: n_back,
                reaction_time_ms: reaction_ms,
                weekly_mindfulness: mindfulness,
            })?;
            println!("Cognition metrics saved for week of {date}");
        }
        PillarCommand::Delete { pillar, date } => {
            let date = target_week(date);
            match pillar.as_str() {
                "health" => store.delete_health_metrics(date)?,
                "fitness" => store.delete_fitness_metrics(date)?,
                "cognition" => store.delete_cognition_metrics(date)?,
                other => bail!("unknown pillar '{other}', expected health, fitness or cognition"),
            }
            println!("Deleted {pillar} metrics for week of {date}");
        }
    }

    Ok(())
}
