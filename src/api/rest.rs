use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use log::info;
use serde::Serialize;
use sqlx::SqlitePool;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::config::ApiConfig;
use crate::error::Error;

pub mod count_controller;
pub mod detect_controller;

use self::count_controller::{count_people, list_events};
use self::detect_controller::detect;

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: Arc<SqlitePool>,
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub message: String,
    #[serde(skip)]
    pub status: u16,
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Parse(message) => ApiError {
                message,
                status: StatusCode::BAD_REQUEST.as_u16(),
            },
            Error::Validation(message) => ApiError {
                message,
                status: StatusCode::BAD_REQUEST.as_u16(),
            },
            // The wire contract reports an unknown camera address as a
            // client error, not a 404.
            Error::NotFound(message) => ApiError {
                message,
                status: StatusCode::BAD_REQUEST.as_u16(),
            },
            Error::Config(message) => ApiError {
                message,
                status: StatusCode::BAD_REQUEST.as_u16(),
            },
            Error::Database(message) | Error::Internal(message) => ApiError {
                message,
                status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            },
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(err) = err.downcast_ref::<Error>() {
            return err.clone().into();
        }

        ApiError {
            message: err.to_string(),
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
        }
    }
}

/// Implement IntoResponse for ApiError
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(self);
        (status, body).into_response()
    }
}

pub struct RestApi {
    config: ApiConfig,
    db_pool: Arc<SqlitePool>,
}

impl RestApi {
    pub fn new(config: &ApiConfig, db_pool: Arc<SqlitePool>) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            db_pool,
        })
    }

    /// Build the service router. Separate from `run` so tests can mount it
    /// without binding a socket.
    pub fn router(&self) -> Router {
        let state = AppState {
            db_pool: Arc::clone(&self.db_pool),
        };

        // Allow all origins and preflight requests
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
            .max_age(Duration::from_secs(3600));

        Router::new()
            .route("/detect", post(detect))
            .route("/count_people", post(count_people))
            .route("/events", get(list_events))
            .route("/health", get(health_check))
            .with_state(state)
            .layer(cors)
    }

    pub async fn run(&self) -> Result<()> {
        let app = self.router();

        let addr = self.config.address.clone() + ":" + &self.config.port.to_string();
        let addr: SocketAddr = addr.parse()?;

        info!("API server listening on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

async fn health_check(State(state): State<AppState>) -> ApiResult<&'static str> {
    sqlx::query("SELECT 1")
        .execute(&*state.db_pool)
        .await
        .map_err(|e| ApiError::from(Error::Database(format!("Health check failed: {}", e))))?;

    Ok("OK")
}
