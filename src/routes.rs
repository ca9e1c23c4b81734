// src/routes.rs
use crate::handlers::error::ApiError;
use crate::handlers::{forecast::get_forecast, health::health_check};
use crate::services::forecast_store::ForecastStore;
use log::{error, info};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reject::Rejection;
use warp::{Filter, Reply};

/// Largest request body the forecast route will read.
pub const MAX_BODY_BYTES: u64 = 16 * 1024;

const CORS_HEADERS: [&str; 8] = [
    "accept",
    "accept-language",
    "authorization",
    "cache-control",
    "content-language",
    "content-type",
    "origin",
    "x-requested-with",
];

// Every rejection becomes {"error": ...} with a matching status.
async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message: String;

    if err.is_not_found() {
        code = StatusCode::NOT_FOUND;
        message = "Not Found".to_string();
    } else if let Some(api_error) = err.find::<ApiError>() {
        code = api_error.status_code();
        message = api_error.message.clone();
        if code.is_server_error() {
            error!("Error processing request: {}", message);
        }
    } else if err.find::<warp::reject::InvalidQuery>().is_some() {
        code = StatusCode::BAD_REQUEST;
        message = "Invalid query string".to_string();
    } else if err.find::<warp::reject::InvalidHeader>().is_some() {
        code = StatusCode::BAD_REQUEST;
        message = "Invalid request header".to_string();
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        code = StatusCode::METHOD_NOT_ALLOWED;
        message = "Method Not Allowed".to_string();
    } else {
        error!("Unhandled rejection: {:?}", err);
        code = StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error".to_string();
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

// Caps the body at `limit` bytes. Chunked bodies must also declare a length;
// requests with neither header carry no body.
fn body_limit(limit: u64) -> impl Filter<Extract = (), Error = Rejection> + Clone {
    warp::header::optional::<u64>("content-length")
        .and(warp::header::optional::<String>("transfer-encoding"))
        .and_then(move |length: Option<u64>, encoding: Option<String>| async move {
            match (length, encoding) {
                (Some(length), _) if length > limit => {
                    Err(warp::reject::custom(ApiError::payload_too_large(limit)))
                }
                (None, Some(_)) => Err(warp::reject::custom(ApiError::length_required())),
                _ => Ok(()),
            }
        })
        .untuple_one()
}

pub fn routes(store: Arc<ForecastStore>) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let store_filter = warp::any().map(move || store.clone());

    let forecast_route = warp::path!("forecast")
        .and(warp::post())
        .and(warp::query::<HashMap<String, String>>())
        .and(body_limit(MAX_BODY_BYTES))
        .and(warp::body::bytes())
        .and(store_filter)
        .and_then(get_forecast);

    let health_route = warp::path!("health")
        .and(warp::get())
        .and_then(health_check);

    info!("All routes configured successfully.");

    forecast_route
        .or(health_route)
        .recover(handle_rejection)
}

/// Any origin may call any route.
pub fn cors() -> warp::filters::cors::Builder {
    warp::cors()
        .allow_any_origin()
        .allow_headers(CORS_HEADERS)
        .allow_methods(vec!["GET", "POST", "PUT", "DELETE", "PATCH", "OPTIONS", "HEAD"])
}

/// Routes with CORS and access logging, ready to serve.
pub fn api(store: Arc<ForecastStore>) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    routes(store)
        .with(cors())
        .with(warp::log("sales_forecast_api::access"))
}
