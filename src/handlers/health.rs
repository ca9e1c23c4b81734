// src/handlers/health.rs
use crate::models::HealthResponse;
use log::debug;
use warp::reply::Json;
use warp::Rejection;

pub async fn health_check() -> Result<Json, Rejection> {
    debug!("Health check");
    Ok(warp::reply::json(&HealthResponse {
        status: "ok",
        message: "Server is running",
    }))
}
