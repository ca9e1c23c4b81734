// src/services/forecast_store.rs
use crate::models::{DatasetSummary, ForecastKey, ForecastPoint, ForecastRecord};
use anyhow::{anyhow, bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use csv::{ReaderBuilder, Trim};
use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::Number;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const REQUIRED_COLUMNS: [&str; 4] = ["store_id", "product_id", "date", "units"];

/// Where the in-memory table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Loaded,
    Missing,
}

// Cells are read as text and converted explicitly so errors can name the row.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default)]
    id: Option<String>,
    store_id: String,
    product_id: String,
    date: String,
    units: String,
}

/// Read-only forecast table, loaded once at startup and shared across requests.
#[derive(Debug)]
pub struct ForecastStore {
    records: Vec<ForecastRecord>,
    source: DataSource,
}

impl ForecastStore {
    /// Loads the CSV at `path`. An absent file yields an empty store flagged
    /// `DataSource::Missing`; a present but malformed file is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("Forecast CSV not found at {}", path.display());
            return Ok(ForecastStore {
                records: Vec::new(),
                source: DataSource::Missing,
            });
        }

        info!("Loading forecast data from {}", path.display());
        let file = File::open(path)
            .with_context(|| format!("Failed to open forecast CSV {}", path.display()))?;
        let store = Self::from_reader(file)
            .with_context(|| format!("Failed to load forecast CSV {}", path.display()))?;
        info!("Loaded {} forecast records", store.len());
        Ok(store)
    }

    /// Parses CSV text with a header row. Columns are matched by name.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

        let headers = rdr.headers()?.clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                bail!("Missing required column '{}'", column);
            }
        }

        let mut records = Vec::new();
        for (index, result) in rdr.deserialize::<RawRecord>().enumerate() {
            // Header is line 1.
            let line = index + 2;
            let raw = result.with_context(|| format!("Malformed row at line {}", line))?;
            let record = parse_record(raw).with_context(|| format!("Invalid row at line {}", line))?;
            records.push(record);
        }

        debug!("Parsed {} rows", records.len());
        Ok(ForecastStore {
            records,
            source: DataSource::Loaded,
        })
    }

    pub fn empty() -> Self {
        ForecastStore {
            records: Vec::new(),
            source: DataSource::Missing,
        }
    }

    /// Returns the series for one store/product pair, oldest first.
    /// Rows sharing a timestamp keep their file order. Unknown keys give an empty vec.
    pub fn query(&self, store_id: i64, product_id: i64) -> Vec<ForecastPoint> {
        let key = ForecastKey::new(store_id, product_id);
        let mut matches: Vec<&ForecastRecord> =
            self.records.iter().filter(|r| r.key() == key).collect();
        matches.sort_by_key(|r| r.date);
        matches.into_iter().map(ForecastRecord::to_point).collect()
    }

    pub fn source(&self) -> DataSource {
        self.source
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ForecastRecord] {
        &self.records
    }

    pub fn summary(&self) -> DatasetSummary {
        let keys: HashSet<ForecastKey> = self.records.iter().map(ForecastRecord::key).collect();
        DatasetSummary {
            records: self.records.len(),
            keys: keys.len(),
            first_date: self.records.iter().map(|r| r.date.date()).min(),
            last_date: self.records.iter().map(|r| r.date.date()).max(),
        }
    }
}

fn parse_record(raw: RawRecord) -> Result<ForecastRecord> {
    Ok(ForecastRecord {
        id: raw.id.filter(|id| !id.is_empty()),
        store_id: parse_id(&raw.store_id, "store_id")?,
        product_id: parse_id(&raw.product_id, "product_id")?,
        date: parse_date(&raw.date)?,
        date_label: raw.date,
        units: parse_units(&raw.units)?,
    })
}

// Exports sometimes write integer columns as "12.0".
fn parse_id(value: &str, field: &str) -> Result<i64> {
    if let Ok(id) = value.parse::<i64>() {
        return Ok(id);
    }
    match value.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
        _ => Err(anyhow!("Error parsing {} value '{}'", field, value)),
    }
}

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Accepts `YYYY-MM-DD` with an optional time of day.
fn parse_date(value: &str) -> Result<NaiveDateTime> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .ok_or_else(|| anyhow!("Error parsing date value '{}'", value))
}

fn parse_units(value: &str) -> Result<Number> {
    if let Ok(units) = value.parse::<i64>() {
        return Ok(Number::from(units));
    }
    value
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .ok_or_else(|| anyhow!("Error parsing units value '{}'", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
id,store_id,product_id,date,units
1,1,100,2024-01-03,9
2,1,100,2024-01-01,5
3,2,100,2024-01-01,4
4,1,100,2024-01-02,7
5,1,200,2024-01-01,2.5
";

    fn sample_store() -> ForecastStore {
        ForecastStore::from_reader(SAMPLE.as_bytes()).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn query_filters_and_sorts_by_date() {
        let store = sample_store();
        let points = store.query(1, 100);

        let dates: Vec<&str> = points.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-01-02", "2024-01-03"]);
        let units: Vec<i64> = points.iter().map(|p| p.units.as_i64().unwrap()).collect();
        assert_eq!(units, vec![5, 7, 9]);
    }

    #[test]
    fn query_unknown_key_is_empty() {
        let store = sample_store();
        assert!(store.query(999, 999).is_empty());
        // Matching store but not product.
        assert!(store.query(2, 200).is_empty());
    }

    #[test]
    fn query_keeps_file_order_for_same_date() {
        let csv = "\
store_id,product_id,date,units
1,100,2024-01-02,1
1,100,2024-01-01,2
1,100,2024-01-02,3
1,100,2024-01-01,4
";
        let store = ForecastStore::from_reader(csv.as_bytes()).unwrap();
        let units: Vec<i64> = store
            .query(1, 100)
            .iter()
            .map(|p| p.units.as_i64().unwrap())
            .collect();
        assert_eq!(units, vec![2, 4, 1, 3]);
    }

    #[test]
    fn query_is_repeatable() {
        let store = sample_store();
        assert_eq!(store.query(1, 100), store.query(1, 100));
    }

    #[test]
    fn units_keep_numeric_shape() {
        let store = sample_store();
        let points = store.query(1, 200);
        assert_eq!(points.len(), 1);
        assert!(points[0].units.is_f64());
        assert_eq!(points[0].units.as_f64(), Some(2.5));
    }

    #[test]
    fn id_column_is_optional_and_columns_match_by_name() {
        let csv = "units,date,product_id,store_id,region\n3,2024-02-01,7,5,north\n";
        let store = ForecastStore::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.records()[0].id, None);
        assert_eq!(store.query(5, 7).len(), 1);
    }

    #[test]
    fn time_of_day_orders_rows_within_a_day() {
        let csv = "\
store_id,product_id,date,units
1,1,2024-03-02 00:00:00,1
1,1,2024-03-01 18:00:00,2
1,1,2024-03-01T08:30:00,3
1,1,2024-03-01,4
";
        let store = ForecastStore::from_reader(csv.as_bytes()).unwrap();
        let dates: Vec<String> = store.query(1, 1).into_iter().map(|p| p.date).collect();
        assert_eq!(
            dates,
            vec![
                "2024-03-01",
                "2024-03-01T08:30:00",
                "2024-03-01 18:00:00",
                "2024-03-02 00:00:00",
            ]
        );
        assert_eq!(store.summary().last_date, Some(date("2024-03-02")));
    }

    #[test]
    fn unparsable_date_is_an_error() {
        let csv = "store_id,product_id,date,units\n1,1,01/02/2024,1\n";
        let err = ForecastStore::from_reader(csv.as_bytes()).unwrap_err();
        assert!(format!("{:#}", err).contains("01/02/2024"));
    }

    #[test]
    fn integral_float_ids_are_accepted() {
        let csv = "store_id,product_id,date,units\n1.0,100.0,2024-01-01,5\n";
        let store = ForecastStore::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(store.query(1, 100).len(), 1);
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let csv = "store_id,product_id,date\n1,100,2024-01-01\n";
        let err = ForecastStore::from_reader(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("units"));
    }

    #[test]
    fn bad_value_reports_line() {
        let csv = "store_id,product_id,date,units\n1,100,2024-01-01,5\nx,100,2024-01-02,5\n";
        let err = ForecastStore::from_reader(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ForecastStore::load(dir.path().join("absent.csv")).unwrap();
        assert_eq!(store.source(), DataSource::Missing);
        assert!(store.is_empty());
        assert!(store.query(1, 100).is_empty());
    }

    #[test]
    fn load_reads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let store = ForecastStore::load(file.path()).unwrap();
        assert_eq!(store.source(), DataSource::Loaded);
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn summary_counts_keys_and_date_range() {
        let summary = sample_store().summary();
        assert_eq!(summary.records, 5);
        assert_eq!(summary.keys, 3);
        assert_eq!(summary.first_date, Some(date("2024-01-01")));
        assert_eq!(summary.last_date, Some(date("2024-01-03")));
        assert!(ForecastStore::empty().summary().first_date.is_none());
    }
}
