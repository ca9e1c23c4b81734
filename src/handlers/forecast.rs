// src/handlers/forecast.rs
use super::error::ApiError;
use crate::models::{ForecastKey, ForecastResponse};
use crate::services::forecast_store::ForecastStore;
use log::{debug, info};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use warp::hyper::body::Bytes;
use warp::reply::Json;
use warp::Rejection;

const STORE_ID: &str = "store_id";
const PRODUCT_ID: &str = "product_id";

pub async fn get_forecast(
    query: HashMap<String, String>,
    body: Bytes,
    store: Arc<ForecastStore>,
) -> Result<Json, Rejection> {
    let key = resolve_key(&query, &body).map_err(warp::reject::custom)?;
    info!("Handling forecast request for {}", key);

    let points = store.query(key.store_id, key.product_id);
    debug!("Found {} forecast points for {}", points.len(), key);

    Ok(warp::reply::json(&ForecastResponse::from_points(key, points)))
}

/// Takes both ids from the query string when it carries both, otherwise from
/// the JSON body. The body is only parsed when the query string falls short.
pub fn resolve_key(query: &HashMap<String, String>, body: &[u8]) -> Result<ForecastKey, ApiError> {
    let from_query = (
        query.get(STORE_ID).filter(|v| !v.is_empty()),
        query.get(PRODUCT_ID).filter(|v| !v.is_empty()),
    );
    if let (Some(store_id), Some(product_id)) = from_query {
        return Ok(ForecastKey::new(
            parse_str(STORE_ID, store_id)?,
            parse_str(PRODUCT_ID, product_id)?,
        ));
    }

    let fields = body_fields(body)?;
    match (fields.get(STORE_ID), fields.get(PRODUCT_ID)) {
        (Some(store_id), Some(product_id)) => Ok(ForecastKey::new(
            parse_value(STORE_ID, store_id)?,
            parse_value(PRODUCT_ID, product_id)?,
        )),
        _ => Err(ApiError::missing_key()),
    }
}

// An empty or non-object body has no fields.
fn body_fields(body: &[u8]) -> Result<Map<String, Value>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Ok(Map::new()),
        Err(e) => Err(ApiError::internal(format!("Invalid JSON body: {}", e))),
    }
}

fn parse_str(field: &str, value: &str) -> Result<i64, ApiError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| ApiError::internal(format!("Invalid {}: '{}' is not an integer", field, value)))
}

// Numbers truncate toward zero and booleans count as 0/1. Values outside the
// i64 range are rejected rather than saturated.
fn parse_value(field: &str, value: &Value) -> Result<i64, ApiError> {
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(truncate_to_i64)),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::String(s) => return parse_str(field, s),
        _ => None,
    };
    parsed.ok_or_else(|| ApiError::internal(format!("Invalid {}: {} is not an integer", field, value)))
}

fn truncate_to_i64(f: f64) -> Option<i64> {
    let t = f.trunc();
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range.
    if t.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64 {
        Some(t as i64)
    } else {
        None
    }
}
