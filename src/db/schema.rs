//! SQL DDL for the base tables.
//!
//! Defines the three weekly pillar tables, `user_profile`, and `schema_meta`.
//! All DDL uses `IF NOT EXISTS` for idempotent initialization. Later tables
//! arrive through [`super::migrations`].

use rusqlite::Connection;

const SCHEMA_SQL: &str = r#"
-- One row per canonical week date and pillar
CREATE TABLE IF NOT EXISTS health_metrics (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT NOT NULL UNIQUE,
    sleep_score INTEGER NOT NULL,
    waist_cm REAL NOT NULL,
    rhr INTEGER NOT NULL,
    nutrition_score REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS fitness_metrics (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT NOT NULL UNIQUE,
    vo2_max REAL NOT NULL,
    weekly_workouts INTEGER NOT NULL,
    daily_steps INTEGER NOT NULL,
    weekly_mobility INTEGER NOT NULL,
    cardio_recovery INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS cognition_metrics (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT NOT NULL UNIQUE,
    dual_n_back_level INTEGER NOT NULL,
    reaction_time INTEGER NOT NULL,
    weekly_mindfulness INTEGER NOT NULL
);

-- At most one row; updated in place
CREATE TABLE IF NOT EXISTS user_profile (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    birth_date TEXT NOT NULL,
    sex TEXT NOT NULL,
    height_cm REAL NOT NULL CHECK(height_cm > 0)
);

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize all base tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // Set initial schema version if not already present
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}
