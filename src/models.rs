// src/models.rs
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::Number;
use std::fmt;

/// One row of the pre-computed forecast export.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRecord {
    pub id: Option<String>,
    pub store_id: i64,
    pub product_id: i64,
    /// Sort key. Date-only cells sit at midnight.
    pub date: NaiveDateTime,
    /// The date cell as written in the file, echoed back to clients.
    pub date_label: String,
    pub units: Number,
}

impl ForecastRecord {
    pub fn key(&self) -> ForecastKey {
        ForecastKey {
            store_id: self.store_id,
            product_id: self.product_id,
        }
    }

    pub fn to_point(&self) -> ForecastPoint {
        ForecastPoint {
            date: self.date_label.clone(),
            units: self.units.clone(),
        }
    }
}

/// Identifies a single forecast series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ForecastKey {
    pub store_id: i64,
    pub product_id: i64,
}

impl ForecastKey {
    pub fn new(store_id: i64, product_id: i64) -> Self {
        ForecastKey { store_id, product_id }
    }
}

impl fmt::Display for ForecastKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "store_id={} and product_id={}", self.store_id, self.product_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: String,
    pub units: Number,
}

#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    pub forecast: Vec<ForecastPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ForecastResponse {
    pub fn from_points(key: ForecastKey, points: Vec<ForecastPoint>) -> Self {
        if points.is_empty() {
            ForecastResponse {
                forecast: points,
                count: None,
                message: Some(format!("No data found for {}", key)),
            }
        } else {
            ForecastResponse {
                count: Some(points.len()),
                forecast: points,
                message: None,
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub records: usize,
    pub keys: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} records across {} store/product keys", self.records, self.keys)?;
        if let (Some(first), Some(last)) = (self.first_date, self.last_date) {
            write!(f, ", {} to {}", first, last)?;
        }
        Ok(())
    }
}
