mod helpers;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use health_balance::config::ScoringConfig;
use health_balance::db::MetricStore;
use health_balance::metrics::engine::{replay, weekly_decay_rate};
use health_balance::metrics::types::{
    CognitionMetrics, FitnessMetrics, HealthMetrics, PushSubscription, UserProfile, WeekRecord,
};
use health_balance::metrics::{current_score, weekly_series, ScoreError};

use helpers::{cognition, complete_week, d, fitness, health, sample_profile, test_store};

fn today() -> NaiveDate {
    d("2025-12-10")
}

fn week(date: &str, rhr: i32, steps: i32) -> WeekRecord {
    let date = d(date);
    let mut f = fitness(date);
    f.daily_steps = steps;
    WeekRecord {
        date,
        health: Some(health(date, rhr)),
        fitness: Some(f),
        cognition: Some(cognition(date)),
    }
}

#[test]
fn incomplete_weeks_are_skipped_entirely() {
    let store = test_store();
    store.save_user_profile(&sample_profile()).unwrap();

    complete_week(&store, d("2025-11-16"));
    // Missing cognition
    store.save_health_metrics(&health(d("2025-11-23"), 60)).unwrap();
    store.save_fitness_metrics(&fitness(d("2025-11-23"))).unwrap();
    complete_week(&store, d("2025-11-30"));

    let series = weekly_series(&store, &ScoringConfig::default(), today()).unwrap();
    let dates: Vec<NaiveDate> = series.iter().map(|e| e.date).collect();
    assert_eq!(dates, vec![d("2025-11-16"), d("2025-11-30")]);

    // The gap week charged no tax: week 3 compounds directly off week 1.
    let rate = weekly_decay_rate(40);
    assert!((series[1].aging_tax - series[0].score * rate).abs() < 1e-9);
}

#[test]
fn completing_a_week_later_adds_it_to_the_series() {
    let store = test_store();
    store.save_user_profile(&sample_profile()).unwrap();
    let config = ScoringConfig::default();

    store.save_health_metrics(&health(d("2025-11-30"), 60)).unwrap();
    store.save_fitness_metrics(&fitness(d("2025-11-30"))).unwrap();
    assert!(weekly_series(&store, &config, today()).unwrap().is_empty());

    store.save_cognition_metrics(&cognition(d("2025-11-30"))).unwrap();
    assert_eq!(weekly_series(&store, &config, today()).unwrap().len(), 1);
}

#[test]
fn first_entry_starts_from_the_starting_score() {
    let store = test_store();
    store.save_user_profile(&sample_profile()).unwrap();
    complete_week(&store, d("2025-11-30"));

    let config = ScoringConfig::default();
    let series = weekly_series(&store, &config, today()).unwrap();
    let first = &series[0];

    let expected = config.starting_score - first.aging_tax
        + first.health_score
        + first.fitness_score
        + first.cognition_score;
    assert!((first.score - expected).abs() < 1e-9);
    assert!((first.aging_tax - 1000.0 * 1600.0 / 8000.0 / 52.0).abs() < 1e-9);
}

#[test]
fn recompute_is_deterministic() {
    let store = test_store();
    store.save_user_profile(&sample_profile()).unwrap();
    for date in ["2025-11-02", "2025-11-09", "2025-11-16"] {
        complete_week(&store, d(date));
    }

    let config = ScoringConfig::default();
    let a = weekly_series(&store, &config, today()).unwrap();
    let b = weekly_series(&store, &config, today()).unwrap();
    assert_eq!(a, b);
    assert_eq!(current_score(&store, &config, today()), *a.last().unwrap());
}

#[test]
fn same_weeks_in_a_different_order_compound_differently() {
    let profile = sample_profile();
    let config = ScoringConfig::default();

    let forward = [week("2025-11-02", 60, 14_000), week("2025-11-09", 70, 3_000)];
    let reverse = [week("2025-11-02", 70, 3_000), week("2025-11-09", 60, 14_000)];

    let a = replay(&profile, 60.0, &forward, &config, today());
    let b = replay(&profile, 60.0, &reverse, &config, today());
    let (a, b) = (a.last().unwrap().score, b.last().unwrap().score);
    assert!((a - b).abs() > 1e-6, "expected order dependence, got {a} and {b}");
}

#[test]
fn replay_sorts_by_date() {
    let profile = sample_profile();
    let config = ScoringConfig::default();
    let ordered = [week("2025-11-02", 60, 9_000), week("2025-11-09", 62, 11_000)];
    let shuffled = [ordered[1].clone(), ordered[0].clone()];

    assert_eq!(
        replay(&profile, 60.0, &ordered, &config, today()),
        replay(&profile, 60.0, &shuffled, &config, today())
    );
}

#[test]
fn score_never_goes_negative() {
    let profile = UserProfile {
        birth_date: d("1950-01-01"),
        ..sample_profile()
    };
    let config = ScoringConfig {
        starting_score: 50.0,
        ..ScoringConfig::default()
    };
    let date = d("2025-11-30");
    let awful = WeekRecord {
        date,
        health: Some(HealthMetrics {
            date,
            sleep_score: 20,
            waist_cm: 130.0,
            resting_heart_rate: 95,
            nutrition_score: 1.0,
        }),
        fitness: Some(FitnessMetrics {
            date,
            vo2_max: 15.0,
            weekly_workouts: 0,
            daily_steps: 500,
            weekly_mobility: 0,
            cardio_recovery: 5,
        }),
        cognition: Some(CognitionMetrics {
            date,
            dual_n_back_level: 1,
            reaction_time_ms: 600,
            weekly_mindfulness: 0,
        }),
    };

    let history = [awful, week("2025-12-07", 60, 8_000)];
    let series = replay(&profile, 60.0, &history, &config, today());
    assert_eq!(series[0].score, 0.0);
    // Zero running score pays zero tax.
    assert_eq!(series[1].aging_tax, 0.0);
    assert!(series.iter().all(|e| e.score >= 0.0));
}

#[test]
fn rhr_baseline_comes_from_recent_weeks() {
    let store = test_store();
    store.save_user_profile(&sample_profile()).unwrap();
    complete_week(&store, d("2025-11-23"));
    // 70 vs the 60 recorded above
    store.save_health_metrics(&health(d("2025-11-30"), 70)).unwrap();
    store.save_fitness_metrics(&fitness(d("2025-11-30"))).unwrap();
    store.save_cognition_metrics(&cognition(d("2025-11-30"))).unwrap();

    let series = weekly_series(&store, &ScoringConfig::default(), today()).unwrap();
    // Baseline is the mean of 60 and 70, so the weeks land 25 points either side.
    let diff = series[0].health_score - series[1].health_score;
    assert!((diff - 50.0).abs() < 1e-9);
}

#[test]
fn missing_profile_is_reported_and_falls_back_to_starting_score() {
    let store = test_store();
    complete_week(&store, d("2025-11-30"));
    let config = ScoringConfig::default();

    assert!(matches!(
        weekly_series(&store, &config, today()),
        Err(ScoreError::ProfileRequired)
    ));

    let entry = current_score(&store, &config, today());
    assert_eq!(entry.score, 1000.0);
    assert_eq!(entry.date, today());
    assert_eq!(entry.aging_tax, 0.0);
}

#[test]
fn no_complete_week_shows_starting_score() {
    let store = test_store();
    store.save_user_profile(&sample_profile()).unwrap();
    let entry = current_score(&store, &ScoringConfig::default(), today());
    assert_eq!(entry.score, 1000.0);
    assert_eq!(entry.health_score, 0.0);
}

/// Has a profile but every history read fails.
struct BrokenStore;

impl MetricStore for BrokenStore {
    fn user_profile(&self) -> Result<Option<UserProfile>> {
        Ok(Some(sample_profile()))
    }
    fn save_user_profile(&self, _: &UserProfile) -> Result<()> {
        Ok(())
    }
    fn health_metrics(&self, _: NaiveDate) -> Result<Option<HealthMetrics>> {
        Err(anyhow!("disk I/O error"))
    }
    fn fitness_metrics(&self, _: NaiveDate) -> Result<Option<FitnessMetrics>> {
        Err(anyhow!("disk I/O error"))
    }
    fn cognition_metrics(&self, _: NaiveDate) -> Result<Option<CognitionMetrics>> {
        Err(anyhow!("disk I/O error"))
    }
    fn recent_health_metrics(&self, _: usize) -> Result<Vec<HealthMetrics>> {
        Err(anyhow!("disk I/O error"))
    }
    fn recent_fitness_metrics(&self, _: usize) -> Result<Vec<FitnessMetrics>> {
        Err(anyhow!("disk I/O error"))
    }
    fn recent_cognition_metrics(&self, _: usize) -> Result<Vec<CognitionMetrics>> {
        Err(anyhow!("disk I/O error"))
    }
    fn save_health_metrics(&self, _: &HealthMetrics) -> Result<()> {
        Ok(())
    }
    fn save_fitness_metrics(&self, _: &FitnessMetrics) -> Result<()> {
        Ok(())
    }
    fn save_cognition_metrics(&self, _: &CognitionMetrics) -> Result<()> {
        Ok(())
    }
    fn dates_with_data(&self) -> Result<Vec<NaiveDate>> {
        Ok(vec![d("2025-11-30")])
    }
    fn rhr_baseline(&self, _: NaiveDate) -> Result<f64> {
        Ok(60.0)
    }
    fn subscriptions(&self) -> Result<Vec<PushSubscription>> {
        Ok(Vec::new())
    }
    fn save_push_subscription(&self, _: &PushSubscription) -> Result<()> {
        Ok(())
    }
    fn delete_push_subscription(&self, _: &str) -> Result<()> {
        Ok(())
    }
}

#[test]
fn storage_error_aborts_the_series() {
    let config = ScoringConfig::default();
    assert!(matches!(
        weekly_series(&BrokenStore, &config, today()),
        Err(ScoreError::Storage(_))
    ));
    assert_eq!(current_score(&BrokenStore, &config, today()).score, 1000.0);
}
