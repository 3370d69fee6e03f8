// Test doubles shared by the application layer tests
use crate::application::chart_renderer::{BilevelEncoder, ChartPainter};
use crate::application::series_repository::{RawPoint, SeriesStore, StoreConnection};
use crate::domain::chart::CanvasSize;
use crate::domain::error::{FetchError, RenderError};
use crate::domain::series::{DataPoint, SeriesDataSet};
use crate::infrastructure::config::{RenderConfig, SeriesConfig};
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn series(name: &str, measurement: &str) -> SeriesConfig {
    SeriesConfig {
        name: name.to_string(),
        measurement: measurement.to_string(),
        field: "value".to_string(),
    }
}

pub fn render_config(output: &Path) -> RenderConfig {
    RenderConfig {
        title: "Power (Last 60m)".to_string(),
        x_axis_label: "Time".to_string(),
        y_axis_label: "Watt (W)".to_string(),
        width_px: 800,
        height_px: 480,
        output_path: output.to_path_buf(),
        series_order: vec!["Import".to_string(), "Export".to_string()],
        tick_interval_minutes: 10,
    }
}

/// "Import" and "Export" with the given number of one-minute points each.
pub fn sample_data(import_points: usize, export_points: usize) -> SeriesDataSet {
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let points = |n: usize, base: f64| {
        (0..n)
            .map(|i| DataPoint::new(start + Duration::minutes(i as i64), base + i as f64 * 10.0))
            .collect::<Vec<_>>()
    };

    let mut data = SeriesDataSet::new();
    data.insert("Import", points(import_points, 500.0));
    data.insert("Export", points(export_points, 50.0));
    data
}

/// In-memory store keyed by measurement name.
#[derive(Default)]
pub struct FakeStore {
    pub unreachable: bool,
    pub responses: HashMap<String, Result<Vec<RawPoint>, String>>,
    pub released: Arc<AtomicBool>,
    pub queries: Arc<AtomicUsize>,
}

impl FakeStore {
    pub fn with_rows(mut self, measurement: &str, rows: Vec<RawPoint>) -> Self {
        self.responses.insert(measurement.to_string(), Ok(rows));
        self
    }

    pub fn with_error(mut self, measurement: &str, error: &str) -> Self {
        self.responses
            .insert(measurement.to_string(), Err(error.to_string()));
        self
    }
}

struct FakeConnection {
    responses: HashMap<String, Result<Vec<RawPoint>, String>>,
    released: Arc<AtomicBool>,
    queries: Arc<AtomicUsize>,
}

impl Drop for FakeConnection {
    fn drop(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl SeriesStore for FakeStore {
    async fn connect(&self) -> Result<Box<dyn StoreConnection>, FetchError> {
        if self.unreachable {
            return Err(FetchError::Connection {
                endpoint: "http://localhost:8086/test".to_string(),
                reason: "ping failed".to_string(),
            });
        }
        Ok(Box::new(FakeConnection {
            responses: self.responses.clone(),
            released: self.released.clone(),
            queries: self.queries.clone(),
        }))
    }
}

#[async_trait]
impl StoreConnection for FakeConnection {
    async fn query_points(
        &self,
        query: &str,
        measurement: &str,
    ) -> Result<Vec<RawPoint>, FetchError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        assert!(query.contains(&format!("FROM \"{measurement}\"")));
        match self.responses.get(measurement) {
            Some(Ok(rows)) => Ok(rows.clone()),
            Some(Err(e)) => Err(FetchError::Query(e.clone())),
            None => Ok(Vec::new()),
        }
    }
}

/// Writes a placeholder raster and records what it was asked to draw.
#[derive(Default)]
pub struct RecordingPainter {
    pub fail: bool,
    pub calls: Arc<AtomicUsize>,
    pub canvas: Arc<Mutex<Option<CanvasSize>>>,
}

impl ChartPainter for RecordingPainter {
    fn paint(
        &self,
        _data: &SeriesDataSet,
        _config: &RenderConfig,
        canvas: CanvasSize,
        target: &Path,
    ) -> Result<(), RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut seen) = self.canvas.lock() {
            *seen = Some(canvas);
        }
        if self.fail {
            return Err(RenderError::Draw("font not found".to_string()));
        }
        std::fs::write(target, b"raster")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EncoderScript {
    Succeed,
    /// Reports success for stage 2 but writes nothing.
    SkipFirstStage,
    FailFirstStage,
    /// Writes a partial file for stage 3, then fails.
    FailSecondStage,
}

pub struct ScriptedEncoder {
    script: EncoderScript,
}

impl ScriptedEncoder {
    pub fn new(script: EncoderScript) -> Self {
        Self { script }
    }
}

impl BilevelEncoder for ScriptedEncoder {
    fn intermediate_extension(&self) -> &'static str {
        "pbm"
    }

    fn to_monochrome(
        &self,
        _source: &Path,
        target: &Path,
        _width: u32,
        _height: u32,
    ) -> Result<(), RenderError> {
        match self.script {
            EncoderScript::SkipFirstStage => Ok(()),
            EncoderScript::FailFirstStage => {
                Err(RenderError::Encoding("convert exited with status 1".to_string()))
            }
            _ => Ok(std::fs::write(target, b"P4\n800 480\n")?),
        }
    }

    fn to_bilevel(&self, _source: &Path, target: &Path) -> Result<(), RenderError> {
        match self.script {
            EncoderScript::FailSecondStage => {
                std::fs::write(target, b"TRUNC")?;
                Err(RenderError::Encoding("convert exited with status 1".to_string()))
            }
            _ => Ok(std::fs::write(target, b"final")?),
        }
    }
}
