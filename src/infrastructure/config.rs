use crate::domain::error::ConfigError;
use crate::domain::time_range::TimeRange;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_BASE: &str = "config/chart";
const ENV_PREFIX: &str = "POWER_CHART";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub influx: InfluxSettings,
    pub chart: ChartSettings,
    pub series: Vec<SeriesConfig>,
    pub display: DisplaySettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxSettings {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub database: String,
    #[serde(default = "default_scheme")]
    pub scheme: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChartSettings {
    pub title: String,
    #[serde(default = "default_x_label")]
    pub x_axis_label: String,
    #[serde(default = "default_y_label")]
    pub y_axis_label: String,
    #[serde(default)]
    pub time_range: TimeRange,
    /// Multiplier applied to every raw mean (kW -> W by default).
    #[serde(default = "default_value_scale")]
    pub value_scale: f64,
    #[serde(default = "default_tick_interval")]
    pub tick_interval_minutes: u32,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SeriesConfig {
    pub name: String,
    pub measurement: String,
    pub field: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EncoderKind {
    #[default]
    ImageMagick,
    Native,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplaySettings {
    #[serde(default = "default_width")]
    pub width_px: u32,
    #[serde(default = "default_height")]
    pub height_px: u32,
    pub output_path: PathBuf,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub encoder: EncoderKind,
    #[serde(default = "default_convert_binary")]
    pub convert_binary: String,
}

/// Everything the renderer needs, resolved from [`AppConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub title: String,
    pub x_axis_label: String,
    pub y_axis_label: String,
    pub width_px: u32,
    pub height_px: u32,
    pub output_path: PathBuf,
    /// Series names in the order they are drawn and listed in the legend.
    pub series_order: Vec<String>,
    pub tick_interval_minutes: u32,
}

fn default_port() -> u16 {
    8086
}

fn default_scheme() -> String {
    "http".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_x_label() -> String {
    "Time".to_string()
}

fn default_y_label() -> String {
    "Watt (W)".to_string()
}

fn default_value_scale() -> f64 {
    1000.0
}

fn default_tick_interval() -> u32 {
    10
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    480
}

fn default_convert_binary() -> String {
    "convert".to_string()
}

/// Load `<base>.{toml,yaml,json,...}` and apply `POWER_CHART__SECTION__KEY`
/// environment overrides on top.
pub fn load_app_config(base: &str) -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(base))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    app_config_from(settings)
}

fn app_config_from(settings: config::Config) -> anyhow::Result<AppConfig> {
    let app: AppConfig = settings.try_deserialize()?;
    app.validate()?;
    Ok(app)
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.display.width_px == 0 || self.display.height_px == 0 {
            return Err(ConfigError::InvalidDimensions {
                width: self.display.width_px,
                height: self.display.height_px,
            });
        }
        if self.series.is_empty() {
            return Err(ConfigError::NoSeries);
        }
        let mut seen = HashSet::new();
        for series in &self.series {
            if !seen.insert(series.name.as_str()) {
                return Err(ConfigError::DuplicateSeries(series.name.clone()));
            }
        }
        if self.display.output_path.file_name().is_none() {
            return Err(ConfigError::InvalidOutputPath(
                self.display.output_path.clone(),
            ));
        }
        if !self.chart.value_scale.is_finite() {
            return Err(ConfigError::InvalidValueScale(self.chart.value_scale));
        }
        Ok(())
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            title: self.chart.title.clone(),
            x_axis_label: self.chart.x_axis_label.clone(),
            y_axis_label: self.chart.y_axis_label.clone(),
            width_px: self.display.width_px,
            height_px: self.display.height_px,
            output_path: resolve_output_path(
                &self.display.output_path,
                self.display.device_id.as_deref(),
            ),
            series_order: self.series.iter().map(|s| s.name.clone()).collect(),
            tick_interval_minutes: self.chart.tick_interval_minutes.max(1),
        }
    }
}

/// Final image location. With a device id the file moves into
/// `<dir>/screens/<device_id>/<file>` so one server can host several displays.
pub fn resolve_output_path(output_path: &Path, device_id: Option<&str>) -> PathBuf {
    let device_id = device_id.map(str::trim).filter(|id| !id.is_empty());
    match (device_id, output_path.file_name()) {
        (Some(id), Some(file_name)) => output_path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join("screens")
            .join(id)
            .join(file_name),
        _ => output_path.to_path_buf(),
    }
}
