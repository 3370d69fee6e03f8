// Power series domain models
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// One aggregated sample, already converted to display units (watts).
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl DataPoint {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Series name -> points in ascending time order.
///
/// A series that was fetched but produced nothing maps to an empty vector, so
/// "queried, no data" and "never queried" stay distinguishable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesDataSet {
    series: BTreeMap<String, Vec<DataPoint>>,
}

impl SeriesDataSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the points for `name`, sorting them by timestamp first.
    pub fn insert(&mut self, name: impl Into<String>, mut points: Vec<DataPoint>) {
        points.sort_by_key(|p| p.timestamp);
        self.series.insert(name.into(), points);
    }

    pub fn get(&self, name: &str) -> Option<&[DataPoint]> {
        self.series.get(name).map(Vec::as_slice)
    }

    /// Number of series present, with or without points.
    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    /// True when at least one series holds at least one point.
    pub fn has_data(&self) -> bool {
        self.series.values().any(|points| !points.is_empty())
    }

    pub fn total_points(&self) -> usize {
        self.series.values().map(Vec::len).sum()
    }

    /// Earliest and latest timestamp across every series.
    pub fn time_bounds(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let mut all = self.series.values().flatten().map(|p| p.timestamp);
        let first = all.next()?;
        Some(all.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t))))
    }

    /// Smallest and largest value across every series.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        let mut all = self.series.values().flatten().map(|p| p.value);
        let first = all.next()?;
        Some(all.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}
