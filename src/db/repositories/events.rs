use anyhow::Result;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::db::models::{CountTotals, CountingEvent};
use crate::error::Error;

/// Events repository for the people counting event log
#[derive(Clone)]
pub struct EventsRepository {
    pool: Arc<SqlitePool>,
}

impl EventsRepository {
    /// Create a new events repository
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// Append one counting event. The log is append-only: there is no
    /// update or delete path.
    pub async fn insert(&self, event: &CountingEvent) -> Result<CountingEvent> {
        let result = sqlx::query_as::<_, CountingEvent>(
            r#"
            INSERT INTO counting_events (
                id, ip_address, mac_address, channel_id, channel_name,
                event_type, event_state, date_time, local_time,
                enter_count, exit_count, counting_scene_mode, extra,
                received_at, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            RETURNING id, ip_address, mac_address, channel_id, channel_name,
                      event_type, event_state, date_time, local_time,
                      enter_count, exit_count, counting_scene_mode, extra,
                      received_at, created_at
            "#,
        )
        .bind(&event.id)
        .bind(&event.ip_address)
        .bind(&event.mac_address)
        .bind(&event.channel_id)
        .bind(&event.channel_name)
        .bind(&event.event_type)
        .bind(&event.event_state)
        .bind(&event.date_time)
        .bind(&event.local_time)
        .bind(event.enter_count)
        .bind(event.exit_count)
        .bind(&event.counting_scene_mode)
        .bind(&event.extra)
        .bind(&event.received_at)
        .bind(event.created_at)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to store counting event: {}", e)))?;

        Ok(result)
    }

    /// Whether any event was ever stored for a camera address
    pub async fn exists_for_camera(&self, ip_address: &str) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM counting_events WHERE ip_address = ?1)
            "#,
        )
        .bind(ip_address)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to check camera events: {}", e)))?;

        Ok(exists)
    }

    /// Sum enter/exit counts for a camera over an inclusive compact-time
    /// window. Address matching is exact string equality; the window bounds
    /// compare lexicographically against `local_time`.
    pub async fn sum_in_range(
        &self,
        ip_address: &str,
        start_time: &str,
        end_time: &str,
    ) -> Result<CountTotals> {
        let totals = sqlx::query_as::<_, CountTotals>(
            r#"
            SELECT COALESCE(SUM(enter_count), 0) AS total_enter,
                   COALESCE(SUM(exit_count), 0) AS total_exit
            FROM counting_events
            WHERE ip_address = ?1
              AND local_time >= ?2
              AND local_time <= ?3
            "#,
        )
        .bind(ip_address)
        .bind(start_time)
        .bind(end_time)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to sum counting events: {}", e)))?;

        Ok(totals)
    }

    /// Latest stored events, optionally filtered by camera address
    pub async fn list_recent(
        &self,
        ip_address: Option<&str>,
        limit: Option<i64>,
    ) -> Result<Vec<CountingEvent>> {
        let limit = limit.unwrap_or(100);

        let result = match ip_address {
            Some(ip) => {
                sqlx::query_as::<_, CountingEvent>(
                    r#"
                    SELECT id, ip_address, mac_address, channel_id, channel_name,
                           event_type, event_state, date_time, local_time,
                           enter_count, exit_count, counting_scene_mode, extra,
                           received_at, created_at
                    FROM counting_events
                    WHERE ip_address = ?1
                    ORDER BY received_at DESC, created_at DESC
                    LIMIT ?2
                    "#,
                )
                .bind(ip)
                .bind(limit)
                .fetch_all(&*self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, CountingEvent>(
                    r#"
                    SELECT id, ip_address, mac_address, channel_id, channel_name,
                           event_type, event_state, date_time, local_time,
                           enter_count, exit_count, counting_scene_mode, extra,
                           received_at, created_at
                    FROM counting_events
                    ORDER BY received_at DESC, created_at DESC
                    LIMIT ?1
                    "#,
                )
                .bind(limit)
                .fetch_all(&*self.pool)
                .await
            }
        }
        .map_err(|e| Error::Database(format!("Failed to list counting events: {}", e)))?;

        Ok(result)
    }
}
