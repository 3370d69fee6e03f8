// Series query client - Fetches and normalizes every configured series
use crate::application::series_repository::{RawPoint, SeriesStore, StoreConnection};
use crate::domain::error::{FetchError, PointError};
use crate::domain::series::{DataPoint, SeriesDataSet};
use crate::domain::time_range::TimeRange;
use crate::infrastructure::config::SeriesConfig;
use chrono::NaiveDateTime;
use serde_json::Value;
use std::sync::Arc;

/// Aggregation bucket width. Fixed: one point per minute.
pub const GROUP_BY_INTERVAL: &str = "1m";

/// Timestamp layout InfluxQL returns for `GROUP BY time(...)` rows.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub struct SeriesQueryClient {
    store: Arc<dyn SeriesStore>,
    series: Vec<SeriesConfig>,
    time_range: TimeRange,
    value_scale: f64,
}

impl SeriesQueryClient {
    pub fn new(
        store: Arc<dyn SeriesStore>,
        series: Vec<SeriesConfig>,
        time_range: TimeRange,
        value_scale: f64,
    ) -> Self {
        Self {
            store,
            series,
            time_range,
            value_scale,
        }
    }

    /// Fetch every configured series.
    ///
    /// Never fails: an unreachable store yields an empty data set, a failing
    /// series yields an empty entry, a malformed row is dropped.
    pub async fn fetch_all(&self) -> SeriesDataSet {
        let mut data = SeriesDataSet::new();

        let connection = match self.store.connect().await {
            Ok(connection) => connection,
            Err(e) => {
                tracing::error!("Error connecting to time-series store: {}", e);
                return data;
            }
        };
        tracing::info!("Connected to time-series store");

        for series in &self.series {
            let points = match self.fetch_series(connection.as_ref(), series).await {
                Ok(points) => points,
                Err(e) => {
                    tracing::error!("Error querying {}: {}", series.name, e);
                    Vec::new()
                }
            };
            tracing::info!("Fetched {} points for {}", points.len(), series.name);
            data.insert(series.name.clone(), points);
        }

        drop(connection);
        data
    }

    async fn fetch_series(
        &self,
        connection: &dyn StoreConnection,
        series: &SeriesConfig,
    ) -> Result<Vec<DataPoint>, FetchError> {
        let query = build_mean_query(series, &self.time_range);
        tracing::debug!("Executing query for {}: {}", series.name, query);

        let rows = connection.query_points(&query, &series.measurement).await?;

        let mut points = Vec::with_capacity(rows.len());
        for row in &rows {
            match parse_point(row, self.value_scale) {
                Ok(point) => points.push(point),
                Err(e) => tracing::warn!("Skipping point for {}: {} ({:?})", series.name, e, row),
            }
        }
        Ok(points)
    }
}

pub fn build_mean_query(series: &SeriesConfig, time_range: &TimeRange) -> String {
    format!(
        "SELECT MEAN(\"{}\") FROM \"{}\" WHERE time > now() - {} GROUP BY time({}) FILL(none)",
        series.field,
        series.measurement,
        time_range.as_literal(),
        GROUP_BY_INTERVAL
    )
}

/// Validate one raw row and scale its mean into display units.
pub fn parse_point(raw: &RawPoint, value_scale: f64) -> Result<DataPoint, PointError> {
    let time = match &raw.time {
        None | Some(Value::Null) => return Err(PointError::MissingTime),
        Some(time) => time,
    };
    let mean = match &raw.mean {
        None | Some(Value::Null) => return Err(PointError::MissingMean),
        Some(mean) => mean,
    };

    let timestamp = time
        .as_str()
        .and_then(|s| NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| PointError::InvalidTime(time.to_string()))?;

    let value = match mean {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| PointError::InvalidMean(mean.to_string()))?;

    Ok(DataPoint::new(timestamp, value * value_scale))
}
