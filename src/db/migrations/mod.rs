use anyhow::Result;
use sqlx::{Executor, SqlitePool};
use tracing::info;

use crate::error::Error;

/// Schema migrations, applied in order on startup. Statements are
/// idempotent so re-running against an existing database is safe.
const MIGRATIONS: &[(&str, &str)] = &[
    (
        "0001_create_counting_events",
        r#"
        CREATE TABLE IF NOT EXISTS counting_events (
            id TEXT PRIMARY KEY,
            ip_address TEXT NOT NULL,
            mac_address TEXT NOT NULL,
            channel_id TEXT NOT NULL,
            channel_name TEXT NOT NULL,
            event_type TEXT NOT NULL,
            event_state TEXT NOT NULL,
            date_time TEXT NOT NULL,
            local_time TEXT NOT NULL,
            enter_count INTEGER NOT NULL,
            exit_count INTEGER NOT NULL,
            counting_scene_mode TEXT NOT NULL,
            extra TEXT NOT NULL,
            received_at TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    ),
    (
        "0002_index_camera_time",
        r#"
        CREATE INDEX IF NOT EXISTS idx_counting_events_camera_time
        ON counting_events (ip_address, local_time)
        "#,
    ),
    (
        "0003_index_received_at",
        r#"
        CREATE INDEX IF NOT EXISTS idx_counting_events_received_at
        ON counting_events (received_at)
        "#,
    ),
];

pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    for (name, sql) in MIGRATIONS {
        pool.execute(*sql)
            .await
            .map_err(|e| Error::Database(format!("Failed to apply migration {}: {}", name, e)))?;
        info!("Applied migration: {}", name);
    }

    Ok(())
}
