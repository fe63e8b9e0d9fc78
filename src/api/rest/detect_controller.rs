use axum::extract::State;
use axum::Json;
use log::info;
use serde::Serialize;
use std::sync::Arc;

use crate::api::rest::{ApiResult, AppState};
use crate::db::models::CountingEvent;
use crate::db::repositories::EventsRepository;
use crate::utils::alertparser;

#[derive(Debug, Serialize)]
pub struct DetectResponse {
    pub message: String,
}

/// POST /detect — ingest one camera notification.
///
/// Validation happens before any write: a rejected payload leaves the
/// event log untouched.
pub async fn detect(
    State(state): State<AppState>,
    body: String,
) -> ApiResult<Json<DetectResponse>> {
    let notification = alertparser::parse_notification(&body)?;

    let event = CountingEvent::from_notification(&notification);
    let repo = EventsRepository::new(Arc::clone(&state.db_pool));
    let stored = repo.insert(&event).await?;

    info!(
        "Stored counting event {} from {} (enter {}, exit {})",
        stored.id, stored.ip_address, stored.enter_count, stored.exit_count
    );

    Ok(Json(DetectResponse {
        message: "Data received and saved".to_string(),
    }))
}
