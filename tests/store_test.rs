mod helpers;

use health_balance::db::{self, migrations, MetricStore, SqliteStore};
use tempfile::TempDir;

use helpers::{complete_week, d, sample_profile, subscription};

#[test]
fn open_creates_new_db_at_nonexistent_path() {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("subdir").join("health.db");
    assert!(!db_path.exists());

    let conn = db::open_database(&db_path).unwrap();
    assert!(db_path.exists());

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM health_metrics", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn busy_timeout_and_wal_are_set() {
    let tmp = TempDir::new().unwrap();
    let conn = db::open_database(tmp.path().join("health.db")).unwrap();

    let timeout: i64 = conn
        .pragma_query_value(None, "busy_timeout", |row| row.get(0))
        .unwrap();
    assert_eq!(timeout, 5000);

    let mode: String = conn
        .pragma_query_value(None, "journal_mode", |row| row.get(0))
        .unwrap();
    assert_eq!(mode.to_lowercase(), "wal");
}

#[test]
fn fresh_database_is_at_current_schema_version() {
    let tmp = TempDir::new().unwrap();
    let conn = db::open_database(tmp.path().join("health.db")).unwrap();
    assert_eq!(
        migrations::get_schema_version(&conn).unwrap(),
        migrations::CURRENT_SCHEMA_VERSION
    );
}

#[test]
fn data_survives_reopen() {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("health.db");

    {
        let store = SqliteStore::open(&db_path, 3).unwrap();
        store.save_user_profile(&sample_profile()).unwrap();
        complete_week(&store, d("2025-11-30"));
        store
            .save_push_subscription(&subscription("https://push.example.com/a", 0, "18:30", "UTC"))
            .unwrap();
    }

    let store = SqliteStore::open(&db_path, 3).unwrap();
    assert_eq!(store.user_profile().unwrap(), Some(sample_profile()));
    assert!(store.health_metrics(d("2025-11-30")).unwrap().is_some());
    assert!(store.fitness_metrics(d("2025-11-30")).unwrap().is_some());
    assert!(store.cognition_metrics(d("2025-11-30")).unwrap().is_some());
    assert_eq!(store.dates_with_data().unwrap(), vec![d("2025-11-30")]);
    assert_eq!(store.subscriptions().unwrap().len(), 1);
}

#[test]
fn rhr_window_length_is_configurable() {
    let tmp = TempDir::new().unwrap();
    let store = SqliteStore::open(tmp.path().join("health.db"), 1).unwrap();
    store
        .save_health_metrics(&helpers::health(d("2025-09-07"), 80))
        .unwrap();
    store
        .save_health_metrics(&helpers::health(d("2025-11-30"), 60))
        .unwrap();

    // September falls outside a one month window ending 2025-12-10.
    assert_eq!(store.rhr_baseline(d("2025-12-10")).unwrap(), 60.0);
}

#[test]
fn empty_window_yields_zero_baseline() {
    let store = helpers::test_store();
    assert_eq!(store.rhr_baseline(d("2025-12-10")).unwrap(), 0.0);
}

#[test]
fn resubscribing_an_endpoint_updates_the_existing_row() {
    let store = helpers::test_store();
    let first = subscription("https://push.example.com/a", 0, "18:30", "UTC");
    first.validate().unwrap();
    store.save_push_subscription(&first).unwrap();

    let mut again = subscription("https://push.example.com/a", 1, "07:15", "Europe/Stockholm");
    again.auth = "rotated".into();
    again.validate().unwrap();
    store.save_push_subscription(&again).unwrap();

    assert_eq!(store.subscriptions().unwrap(), vec![again]);
}

#[test]
fn invalid_subscriptions_are_refused_before_saving() {
    use health_balance::metrics::types::SubscriptionError;

    let bad_day = subscription("https://push.example.com/a", 7, "09:00", "UTC");
    assert_eq!(bad_day.validate(), Err(SubscriptionError::DayOutOfRange(7)));

    let bad_time = subscription("https://push.example.com/a", 1, "9am", "UTC");
    assert!(matches!(bad_time.validate(), Err(SubscriptionError::InvalidTime(_))));
}
