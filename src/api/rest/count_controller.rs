use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::sync::Arc;

use crate::api::rest::{ApiResult, AppState};
use crate::db::models::CountingEvent;
use crate::db::repositories::EventsRepository;
use crate::error::Error;
use crate::utils::timefmt;

#[derive(Debug, Deserialize)]
pub struct CountPeopleRequest {
    pub ip_address: String,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Serialize)]
pub struct CountPeopleResponse {
    pub success: bool,
    pub total_enter: i64,
    pub total_exit: i64,
}

/// POST /count_people — aggregate enter/exit totals for one camera over an
/// inclusive compact-time window.
pub async fn count_people(
    State(state): State<AppState>,
    Json(request): Json<CountPeopleRequest>,
) -> ApiResult<Json<CountPeopleResponse>> {
    if request.ip_address.parse::<IpAddr>().is_err() {
        return Err(Error::Validation("Invalid IP address format".to_string()).into());
    }

    if !timefmt::is_valid_compact(&request.start_time)
        || !timefmt::is_valid_compact(&request.end_time)
    {
        return Err(Error::Validation("Invalid datetime format".to_string()).into());
    }

    let repo = EventsRepository::new(Arc::clone(&state.db_pool));

    // An address never seen is an error; a window with no events is not.
    if !repo.exists_for_camera(&request.ip_address).await? {
        return Err(Error::NotFound("No events found for this IP address".to_string()).into());
    }

    let totals = repo
        .sum_in_range(&request.ip_address, &request.start_time, &request.end_time)
        .await?;

    Ok(Json(CountPeopleResponse {
        success: true,
        total_enter: totals.total_enter,
        total_exit: totals.total_exit,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ListEventsQuery {
    pub ip_address: Option<String>,
    pub limit: Option<i64>,
}

/// GET /events — latest stored events, optionally filtered by camera address
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListEventsQuery>,
) -> ApiResult<Json<Vec<CountingEvent>>> {
    let repo = EventsRepository::new(Arc::clone(&state.db_pool));
    let events = repo
        .list_recent(query.ip_address.as_deref(), query.limit)
        .await?;

    Ok(Json(events))
}
