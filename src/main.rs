// Main entry point - Dependency injection and a single render cycle
mod domain;
mod application;
mod infrastructure;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::application::chart_renderer::{BilevelEncoder, ChartRenderer};
use crate::application::pipeline::{CycleOutcome, PipelineOrchestrator};
use crate::application::series_query_client::SeriesQueryClient;
use crate::infrastructure::config::{load_app_config, EncoderKind, DEFAULT_CONFIG_BASE};
use crate::infrastructure::imagemagick_encoder::ImageMagickEncoder;
use crate::infrastructure::influx_repository::InfluxRepository;
use crate::infrastructure::native_encoder::NativeEncoder;
use crate::infrastructure::plotters_painter::PlottersPainter;

const CONFIG_ENV: &str = "POWER_CHART_CONFIG";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration: CLI argument, then environment, then the default
    let config_base = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_ENV).ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_BASE.to_string());
    let app_config = load_app_config(&config_base)?;
    tracing::info!("Loaded configuration from {}", config_base);

    // Create repository (infrastructure layer)
    let repository = Arc::new(InfluxRepository::new(&app_config.influx));
    tracing::info!(
        "Using InfluxDB at {} (database {})",
        repository.base_url(),
        app_config.influx.database
    );
    tracing::info!(
        "Query window: last {} ({} s)",
        app_config.chart.time_range,
        app_config.chart.time_range.duration().as_secs()
    );

    let encoder: Box<dyn BilevelEncoder> = match app_config.display.encoder {
        EncoderKind::ImageMagick => {
            Box::new(ImageMagickEncoder::new(app_config.display.convert_binary.clone()))
        }
        EncoderKind::Native => Box::new(NativeEncoder),
    };

    // Create services (application layer)
    let client = SeriesQueryClient::new(
        repository,
        app_config.series.clone(),
        app_config.chart.time_range.clone(),
        app_config.chart.value_scale,
    );
    let renderer = ChartRenderer::new(
        app_config.render_config(),
        Box::new(PlottersPainter),
        encoder,
    );
    let orchestrator = PipelineOrchestrator::new(client, renderer);

    match orchestrator.run_cycle().await {
        CycleOutcome::Rendered(path) => tracing::info!("Chart available at {}", path.display()),
        CycleOutcome::NoData => tracing::warn!("Cycle finished without new data"),
        CycleOutcome::RenderFailed => tracing::warn!("Cycle finished, previous chart kept"),
    }

    Ok(())
}
