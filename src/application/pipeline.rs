// Pipeline orchestrator - One fetch-and-render cycle
use crate::application::chart_renderer::ChartRenderer;
use crate::application::series_query_client::SeriesQueryClient;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// No series returned a point; rendering was skipped.
    NoData,
    Rendered(PathBuf),
    /// Rendering was attempted and failed. The previous image is untouched.
    RenderFailed,
}

pub struct PipelineOrchestrator {
    client: SeriesQueryClient,
    renderer: ChartRenderer,
}

impl PipelineOrchestrator {
    pub fn new(client: SeriesQueryClient, renderer: ChartRenderer) -> Self {
        Self { client, renderer }
    }

    pub async fn run_cycle(&self) -> CycleOutcome {
        tracing::info!("Fetching data from time-series store");
        let data = self.client.fetch_all().await;

        if !data.has_data() {
            tracing::warn!("No data fetched, skipping chart generation");
            return CycleOutcome::NoData;
        }

        tracing::info!(
            "Fetched {} points across {} series, generating chart",
            data.total_points(),
            data.series_count()
        );

        match self.renderer.render(&data) {
            Ok(path) => {
                tracing::info!("Chart generation complete: {}", path.display());
                CycleOutcome::Rendered(path)
            }
            Err(e) => {
                tracing::error!("Chart generation failed: {}", e);
                CycleOutcome::RenderFailed
            }
        }
    }
}
