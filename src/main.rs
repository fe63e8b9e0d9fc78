use anyhow::Result;
use env_logger::Env;
use log::{error, info};
use std::path::PathBuf;
use std::sync::Arc;

use people_counter::api::rest::RestApi;
use people_counter::config;
use people_counter::db::DatabaseService;

#[tokio::main]
async fn main() -> Result<()> {
    // Optional config file path as the first argument
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = config::load_config(config_path.as_deref())?;

    env_logger::Builder::from_env(Env::default().default_filter_or(config.api.log_level.as_str()))
        .init();

    info!("Starting people counting service");
    info!("Configuration loaded");

    let database = DatabaseService::new(&config.database).await?;

    let http_server = RestApi::new(&config.api, Arc::clone(&database.pool))?;

    tokio::select! {
        result = http_server.run() => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down...");
        }
    }

    Ok(())
}
