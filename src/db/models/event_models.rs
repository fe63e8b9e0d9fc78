use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::alertparser::CameraNotification;
use crate::utils::timefmt;

/// People counting event model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CountingEvent {
    pub id: String,
    pub ip_address: String,
    pub mac_address: String,
    pub channel_id: String,
    pub channel_name: String,
    pub event_type: String,
    pub event_state: String,
    /// Camera-supplied timestamp, stored verbatim
    pub date_time: String,
    /// `date_time` reduced to the compact comparable form; empty when the
    /// camera timestamp could not be understood
    pub local_time: String,
    pub enter_count: i64,
    pub exit_count: i64,
    pub counting_scene_mode: String,
    /// Vendor fields outside the modeled record
    pub extra: serde_json::Value,
    /// Service-assigned ingestion stamp, compact form
    pub received_at: String,
    pub created_at: DateTime<Utc>,
}

impl CountingEvent {
    /// Build a storable record from a validated notification, stamping it
    /// with the current ingestion time.
    pub fn from_notification(notification: &CameraNotification) -> Self {
        let local_time =
            timefmt::compact_from_camera(&notification.date_time).unwrap_or_default();

        Self {
            id: Uuid::new_v4().to_string(),
            ip_address: notification.ip_address.clone(),
            mac_address: notification.mac_address.clone(),
            channel_id: notification.channel_id.clone(),
            channel_name: notification.channel_name.clone(),
            event_type: notification.event_type.clone(),
            event_state: notification.event_state.clone(),
            date_time: notification.date_time.clone(),
            local_time,
            enter_count: notification.enter,
            exit_count: notification.exit,
            counting_scene_mode: notification.counting_scene_mode.clone(),
            extra: serde_json::to_value(&notification.extra)
                .unwrap_or(serde_json::Value::Null),
            received_at: timefmt::now_compact(),
            created_at: Utc::now(),
        }
    }
}

/// Aggregate row for a count query
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CountTotals {
    pub total_enter: i64,
    pub total_exit: i64,
}
