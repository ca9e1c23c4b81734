use anyhow::Result;
use dotenv::dotenv;
use log::{debug, info, warn};
use sales_forecast_api::config::Config;
use sales_forecast_api::routes;
use sales_forecast_api::services::forecast_store::{DataSource, ForecastStore};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    // Initialize the logger
    env_logger::init();
    info!("Logger initialized. Starting the application...");

    let config = Config::from_env()?;
    info!("Forecast data path: {}", config.csv_path.display());

    let store = ForecastStore::load(&config.csv_path)?;
    if store.source() == DataSource::Missing {
        let expected = std::env::current_dir()
            .map(|dir| dir.join(&config.csv_path))
            .unwrap_or_else(|_| config.csv_path.clone());
        warn!("Expected location: {}", expected.display());
        warn!("Serving with an empty dataset; every forecast query will return no data");
    }

    info!("Loaded {} records from CSV", store.len());
    if !store.is_empty() {
        info!("Dataset: {}", store.summary());
        for record in store.records().iter().take(5) {
            debug!("{:?}", record);
        }
    }

    let api = routes::api(Arc::new(store));
    info!("Routes configured successfully with CORS.");

    let addr = config.socket_addr();
    info!("Starting server on {}", addr);
    warp::serve(api).run(addr).await;

    Ok(())
}
