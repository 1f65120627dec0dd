//! Persistence contract and its SQLite implementation.
//!
//! [`MetricStore`] is the only way the score engine and the notification
//! scheduler touch storage. [`SqliteStore`] implements it over a single
//! connection guarded by a mutex, which keeps SQLite to one writer.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Context, Result};
use chrono::{Months, NaiveDate};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::metrics::types::{
    CognitionMetrics, FitnessMetrics, HealthMetrics, PushSubscription, Sex, UserProfile,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

const HEALTH_COLUMNS: &str = "date, sleep_score, waist_cm, rhr, nutrition_score";
const FITNESS_COLUMNS: &str =
    "date, vo2_max, weekly_workouts, daily_steps, weekly_mobility, cardio_recovery";
const COGNITION_COLUMNS: &str = "date, dual_n_back_level, reaction_time, weekly_mindfulness";

/// Read/write contract consumed by the core.
///
/// All methods are synchronous. Callers in async contexts may call them
/// directly for these short reads, or use `tokio::task::spawn_blocking` for
/// anything heavier.
pub trait MetricStore: Send + Sync {
    fn user_profile(&self) -> Result<Option<UserProfile>>;
    fn save_user_profile(&self, profile: &UserProfile) -> Result<()>;

    fn health_metrics(&self, date: NaiveDate) -> Result<Option<HealthMetrics>>;
    fn fitness_metrics(&self, date: NaiveDate) -> Result<Option<FitnessMetrics>>;
    fn cognition_metrics(&self, date: NaiveDate) -> Result<Option<CognitionMetrics>>;

    /// Up to `limit` records of one pillar, newest first.
    fn recent_health_metrics(&self, limit: usize) -> Result<Vec<HealthMetrics>>;
    fn recent_fitness_metrics(&self, limit: usize) -> Result<Vec<FitnessMetrics>>;
    fn recent_cognition_metrics(&self, limit: usize) -> Result<Vec<CognitionMetrics>>;

    fn save_health_metrics(&self, m: &HealthMetrics) -> Result<()>;
    fn save_fitness_metrics(&self, m: &FitnessMetrics) -> Result<()>;
    fn save_cognition_metrics(&self, m: &CognitionMetrics) -> Result<()>;

    /// Distinct dates with a record in any pillar, newest first.
    fn dates_with_data(&self) -> Result<Vec<NaiveDate>>;

    /// Mean resting heart rate over the trailing window ending at `as_of`,
    /// or 0.0 when there are no records in the window.
    fn rhr_baseline(&self, as_of: NaiveDate) -> Result<f64>;

    fn subscriptions(&self) -> Result<Vec<PushSubscription>>;
    fn save_push_subscription(&self, sub: &PushSubscription) -> Result<()>;
    fn delete_push_subscription(&self, endpoint: &str) -> Result<()>;
}

/// SQLite-backed [`MetricStore`].
pub struct SqliteStore {
    conn: Mutex<Connection>,
    rhr_window_months: u32,
}

impl SqliteStore {
    pub fn new(conn: Connection, rhr_window_months: u32) -> Self {
        Self {
            conn: Mutex::new(conn),
            rhr_window_months,
        }
    }

    /// Open the database file, creating and migrating it as needed.
    pub fn open(path: impl AsRef<Path>, rhr_window_months: u32) -> Result<Self> {
        Ok(Self::new(super::open_database(path)?, rhr_window_months))
    }

    /// Fresh in-memory store with a three month RHR window.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(super::open_memory_database()?, 3))
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| anyhow!("database lock poisoned: {e}"))
    }

    /// Remove one week's health record.
    pub fn delete_health_metrics(&self, date: NaiveDate) -> Result<()> {
        self.delete_by_date("health_metrics", date)
    }

    /// Remove one week's fitness record.
    pub fn delete_fitness_metrics(&self, date: NaiveDate) -> Result<()> {
        self.delete_by_date("fitness_metrics", date)
    }

    /// Remove one week's cognition record.
    pub fn delete_cognition_metrics(&self, date: NaiveDate) -> Result<()> {
        self.delete_by_date("cognition_metrics", date)
    }

    fn recent<T>(
        &self,
        table: &'static str,
        columns: &'static str,
        limit: usize,
        map: fn(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare(&format!("SELECT {columns} FROM {table} ORDER BY date DESC LIMIT ?1"))?;
        let rows = stmt
            .query_map(params![limit], map)?
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("failed to list recent rows from {table}"))?;
        Ok(rows)
    }

    fn delete_by_date(&self, table: &'static str, date: NaiveDate) -> Result<()> {
        self.conn()?
            .execute(
                &format!("DELETE FROM {table} WHERE date = ?1"),
                params![fmt_date(date)],
            )
            .with_context(|| format!("failed to delete from {table}"))?;
        Ok(())
    }
}

impl MetricStore for SqliteStore {
    fn user_profile(&self) -> Result<Option<UserProfile>> {
        let conn = self.conn()?;
        let profile = conn
            .query_row(
                "SELECT birth_date, sex, height_cm FROM user_profile ORDER BY id DESC LIMIT 1",
                [],
                |row| {
                    let sex: String = row.get(1)?;
                    Ok(UserProfile {
                        birth_date: date_column(row, 0)?,
                        sex: Sex::from_label(&sex),
                        height_cm: row.get(2)?,
                    })
                },
            )
            .optional()
            .context("failed to read user profile")?;
        Ok(profile)
    }

    fn save_user_profile(&self, profile: &UserProfile) -> Result<()> {
        let conn = self.conn()?;
        let existing: Option<i64> = conn
            .query_row("SELECT id FROM user_profile LIMIT 1", [], |row| row.get(0))
            .optional()?;

        let written = match existing {
            Some(id) => conn.execute(
                "UPDATE user_profile SET birth_date = ?1, sex = ?2, height_cm = ?3 WHERE id = ?4",
                params![
                    fmt_date(profile.birth_date),
                    profile.sex.as_str(),
                    profile.height_cm,
                    id
                ],
            ),
            None => conn.execute(
                "INSERT INTO user_profile (birth_date, sex, height_cm) VALUES (?1, ?2, ?3)",
                params![
                    fmt_date(profile.birth_date),
                    profile.sex.as_str(),
                    profile.height_cm
                ],
            ),
        };
        written.context("failed to save user profile")?;
        Ok(())
    }

    fn health_metrics(&self, date: NaiveDate) -> Result<Option<HealthMetrics>> {
        let conn = self.conn()?;
        let m = conn
            .query_row(
                &format!("SELECT {HEALTH_COLUMNS} FROM health_metrics WHERE date = ?1"),
                params![fmt_date(date)],
                health_row,
            )
            .optional()
            .with_context(|| format!("failed to read health metrics for {date}"))?;
        Ok(m)
    }

    fn fitness_metrics(&self, date: NaiveDate) -> Result<Option<FitnessMetrics>> {
        let conn = self.conn()?;
        let m = conn
            .query_row(
                &format!("SELECT {FITNESS_COLUMNS} FROM fitness_metrics WHERE date = ?1"),
                params![fmt_date(date)],
                fitness_row,
            )
            .optional()
            .with_context(|| format!("failed to read fitness metrics for {date}"))?;
        Ok(m)
    }

    fn cognition_metrics(&self, date: NaiveDate) -> Result<Option<CognitionMetrics>> {
        let conn = self.conn()?;
        let m = conn
            .query_row(
                &format!("SELECT {COGNITION_COLUMNS} FROM cognition_metrics WHERE date = ?1"),
                params![fmt_date(date)],
                cognition_row,
            )
            .optional()
            .with_context(|| format!("failed to read cognition metrics for {date}"))?;
        Ok(m)
    }

    fn recent_health_metrics(&self, limit: usize) -> Result<Vec<HealthMetrics>> {
        self.recent("health_metrics", HEALTH_COLUMNS, limit, health_row)
    }

    fn recent_fitness_metrics(&self, limit: usize) -> Result<Vec<FitnessMetrics>> {
        self.recent("fitness_metrics", FITNESS_COLUMNS, limit, fitness_row)
    }

    fn recent_cognition_metrics(&self, limit: usize) -> Result<Vec<CognitionMetrics>> {
        self.recent("cognition_metrics", COGNITION_COLUMNS, limit, cognition_row)
    }

    fn save_health_metrics(&self, m: &HealthMetrics) -> Result<()> {
        self.conn()?
            .execute(
                "INSERT INTO health_metrics (date, sleep_score, waist_cm, rhr, nutrition_score) \
                 VALUES (?1, ?2, ?3, ?4, ?5) \
                 ON CONFLICT(date) DO UPDATE SET \
                   sleep_score = excluded.sleep_score, \
                   waist_cm = excluded.waist_cm, \
                   rhr = excluded.rhr, \
                   nutrition_score = excluded.nutrition_score",
                params![
                    fmt_date(m.date),
                    m.sleep_score,
                    m.waist_cm,
                    m.resting_heart_rate,
                    m.nutrition_score
                ],
            )
            .context("failed to save health metrics")?;
        Ok(())
    }

    fn save_fitness_metrics(&self, m: &FitnessMetrics) -> Result<()> {
        self.conn()?
            .execute(
                "INSERT INTO fitness_metrics \
                 (date, vo2_max, weekly_workouts, daily_steps, weekly_mobility, cardio_recovery) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
                 ON CONFLICT(date) DO UPDATE SET \
                   vo2_max = excluded.vo2_max, \
                   weekly_workouts = excluded.weekly_workouts, \
                   daily_steps = excluded.daily_steps, \
                   weekly_mobility = excluded.weekly_mobility, \
                   cardio_recovery = excluded.cardio_recovery",
                params![
                    fmt_date(m.date),
                    m.vo2_max,
                    m.weekly_workouts,
                    m.daily_steps,
                    m.weekly_mobility,
                    m.cardio_recovery
                ],
            )
            .context("failed to save fitness metrics")?;
        Ok(())
    }

    fn save_cognition_metrics(&self, m: &CognitionMetrics) -> Result<()> {
        self.conn()?
            .execute(
                "INSERT INTO cognition_metrics \
                 (date, dual_n_back_level, reaction_time, weekly_mindfulness) \
                 VALUES (?1, ?2, ?3, ?4) \
                 ON CONFLICT(date) DO UPDATE SET \
                   dual_n_back_level = excluded.dual_n_back_level, \
                   reaction_time = excluded.reaction_time, \
                   weekly_mindfulness = excluded.weekly_mindfulness",
                params![
                    fmt_date(m.date),
                    m.dual_n_back_level,
                    m.reaction_time_ms,
                    m.weekly_mindfulness
                ],
            )
            .context("failed to save cognition metrics")?;
        Ok(())
    }

    fn dates_with_data(&self) -> Result<Vec<NaiveDate>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT date FROM health_metrics \
             UNION SELECT date FROM fitness_metrics \
             UNION SELECT date FROM cognition_metrics \
             ORDER BY date DESC",
        )?;
        let dates = stmt
            .query_map([], |row| date_column(row, 0))?
            .collect::<Result<Vec<_>, _>>()
            .context("failed to list dates with data")?;
        Ok(dates)
    }

    fn rhr_baseline(&self, as_of: NaiveDate) -> Result<f64> {
        let since = as_of
            .checked_sub_months(Months::new(self.rhr_window_months))
            .unwrap_or(NaiveDate::MIN);
        let avg: Option<f64> = self
            .conn()?
            .query_row(
                "SELECT AVG(rhr) FROM health_metrics WHERE date >= ?1 AND date <= ?2",
                params![fmt_date(since), fmt_date(as_of)],
                |row| row.get(0),
            )
            .context("failed to compute RHR baseline")?;
        Ok(avg.unwrap_or(0.0))
    }

    fn subscriptions(&self) -> Result<Vec<PushSubscription>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT endpoint, p256dh, auth, reminder_day, reminder_time, timezone \
             FROM push_subscriptions ORDER BY id",
        )?;
        let subs = stmt
            .query_map([], |row| {
                Ok(PushSubscription {
                    endpoint: row.get(0)?,
                    p256dh: row.get(1)?,
                    auth: row.get(2)?,
                    reminder_day: row.get(3)?,
                    reminder_time: row.get(4)?,
                    timezone: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("failed to list push subscriptions")?;
        Ok(subs)
    }

    fn save_push_subscription(&self, sub: &PushSubscription) -> Result<()> {
        self.conn()?
            .execute(
                "INSERT INTO push_subscriptions \
                 (endpoint, p256dh, auth, reminder_day, reminder_time, timezone) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
                 ON CONFLICT(endpoint) DO UPDATE SET \
                   p256dh = excluded.p256dh, \
                   auth = excluded.auth, \
                   reminder_day = excluded.reminder_day, \
                   reminder_time = excluded.reminder_time, \
                   timezone = excluded.timezone",
                params![
                    sub.endpoint,
                    sub.p256dh,
                    sub.auth,
                    sub.reminder_day,
                    sub.reminder_time,
                    sub.timezone
                ],
            )
            .context("failed to save push subscription")?;
        Ok(())
    }

    fn delete_push_subscription(&self, endpoint: &str) -> Result<()> {
        self.conn()?
            .execute(
                "DELETE FROM push_subscriptions WHERE endpoint = ?1",
                params![endpoint],
            )
            .context("failed to delete push subscription")?;
        Ok(())
    }
}

fn health_row(row: &Row<'_>) -> rusqlite::Result<HealthMetrics> {
    Ok(HealthMetrics {
        date: date_column(row, 0)?,
        sleep_score: row.get(1)?,
        waist_cm: row.get(2)?,
        resting_heart_rate: row.get(3)?,
        nutrition_score: row.get(4)?,
    })
}

fn fitness_row(row: &Row<'_>) -> rusqlite::Result<FitnessMetrics> {
    Ok(FitnessMetrics {
        date: date_column(row, 0)?,
        vo2_max: row.get(1)?,
        weekly_workouts: row.get(2)?,
        daily_steps: row.get(3)?,
        weekly_mobility: row.get(4)?,
        cardio_recovery: row.get(5)?,
    })
}

fn cognition_row(row: &Row<'_>) -> rusqlite::Result<CognitionMetrics> {
    Ok(CognitionMetrics {
        date: date_column(row, 0)?,
        dual_n_back_level: row.get(1)?,
        reaction_time_ms: row.get(2)?,
        weekly_mindfulness: row.get(3)?,
    })
}

fn fmt_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
