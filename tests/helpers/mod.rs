#![allow(dead_code)]

use chrono::NaiveDate;
use health_balance::db::{MetricStore, SqliteStore};
use health_balance::metrics::types::{
    CognitionMetrics, FitnessMetrics, HealthMetrics, PushSubscription, Sex, UserProfile,
};

/// Open a fresh in-memory store with schema and migrations applied.
pub fn test_store() -> SqliteStore {
    SqliteStore::open_in_memory().unwrap()
}

pub fn d(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

/// Male, 40 on 2025-12-01, 180 cm.
pub fn sample_profile() -> UserProfile {
    UserProfile {
        birth_date: d("1985-06-15"),
        sex: Sex::Male,
        height_cm: 180.0,
    }
}

pub fn health(date: NaiveDate, rhr: i32) -> HealthMetrics {
    HealthMetrics {
        date,
        sleep_score: 80,
        waist_cm: 80.0,
        resting_heart_rate: rhr,
        nutrition_score: 8.0,
    }
}

pub fn fitness(date: NaiveDate) -> FitnessMetrics {
    FitnessMetrics {
        date,
        vo2_max: 45.0,
        weekly_workouts: 4,
        daily_steps: 9000,
        weekly_mobility: 3,
        cardio_recovery: 30,
    }
}

pub fn cognition(date: NaiveDate) -> CognitionMetrics {
    CognitionMetrics {
        date,
        dual_n_back_level: 3,
        reaction_time_ms: 240,
        weekly_mindfulness: 5,
    }
}

/// Seed all three pillars for `date`.
pub fn complete_week(store: &dyn MetricStore, date: NaiveDate) {
    store.save_health_metrics(&health(date, 60)).unwrap();
    store.save_fitness_metrics(&fitness(date)).unwrap();
    store.save_cognition_metrics(&cognition(date)).unwrap();
}

pub fn subscription(endpoint: &str, day: u32, time: &str, timezone: &str) -> PushSubscription {
    PushSubscription {
        endpoint: endpoint.to_string(),
        p256dh: "BNcRdreALRFXTkOOUHK1EtK2wtaz5Ry4YfYCA_0QTpQtUbVlUls0VJXg7A8u-Ts1XbjhazAkj7I99e8QcYP7DkM".into(),
        auth: "tBHItJI5svbpez7KI4CCXg".into(),
        reminder_day: day,
        reminder_time: time.to_string(),
        timezone: timezone.to_string(),
    }
}
