// src/bin/inspect_forecasts.rs
use anyhow::Result;
use dotenv::dotenv;
use sales_forecast_api::config::Config;
use sales_forecast_api::services::forecast_store::{DataSource, ForecastStore};
use std::env;
use std::path::PathBuf;

fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    let path = match env::args().nth(1) {
        Some(arg) => PathBuf::from(arg),
        None => Config::from_env()?.csv_path,
    };

    let store = ForecastStore::load(&path)?;
    if store.source() == DataSource::Missing {
        println!("No forecast file at {}", path.display());
        return Ok(());
    }

    println!("File:    {}", path.display());
    println!("Summary: {}", store.summary());
    println!();
    println!("{:>8} {:>8} {:>10} {:>12} {:>10}", "id", "store_id", "product_id", "date", "units");
    for record in store.records().iter().take(5) {
        println!(
            "{:>8} {:>8} {:>10} {:>12} {:>10}",
            record.id.as_deref().unwrap_or("-"),
            record.store_id,
            record.product_id,
            record.date_label,
            record.units.to_string(),
        );
    }

    Ok(())
}
