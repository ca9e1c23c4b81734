// src/config.rs
use anyhow::{Context, Result};
use log::warn;
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_CSV_PATH: &str = "all_stores_products_predicted_units.csv";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub csv_path: PathBuf,
}

impl Config {
    /// Reads HOST, PORT and FORECAST_CSV_PATH, falling back to defaults for
    /// anything unset. Call `dotenv().ok()` first if a .env file should count.
    pub fn from_env() -> Result<Self> {
        let host_str = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let host: IpAddr = host_str
            .parse()
            .with_context(|| format!("HOST must be an IP address, got '{}'", host_str))?;

        let port = match env::var("PORT") {
            Ok(port_str) => port_str
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT must be a number, got '{}'", port_str))?,
            Err(_) => {
                warn!("$PORT not set, defaulting to {}", DEFAULT_PORT);
                DEFAULT_PORT
            }
        };

        let csv_path = env::var("FORECAST_CSV_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CSV_PATH));

        Ok(Config { host, port, csv_path })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
