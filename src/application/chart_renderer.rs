// Chart renderer - Draw, reduce to monochrome, finalize as a 1-bit image
use crate::domain::chart::{CanvasSize, LineStyle};
use crate::domain::error::RenderError;
use crate::domain::series::{DataPoint, SeriesDataSet};
use crate::infrastructure::config::RenderConfig;
use std::path::{Path, PathBuf};

/// Stage 1: draws the chart as a full-colour raster.
pub trait ChartPainter: Send + Sync {
    fn paint(
        &self,
        data: &SeriesDataSet,
        config: &RenderConfig,
        canvas: CanvasSize,
        target: &Path,
    ) -> Result<(), RenderError>;
}

/// Stages 2 and 3: colour depth reduction down to a bilevel image.
pub trait BilevelEncoder: Send + Sync {
    /// File extension of the monochrome intermediate this encoder writes.
    fn intermediate_extension(&self) -> &'static str;

    /// Resize `source` to exactly `width` x `height` (aspect ratio is not
    /// preserved) and force it to pure black and white.
    fn to_monochrome(
        &self,
        source: &Path,
        target: &Path,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError>;

    /// Write the monochrome intermediate as a 1-bit, palette-free image.
    fn to_bilevel(&self, source: &Path, target: &Path) -> Result<(), RenderError>;
}

/// A series ready to draw: display position, name and its points.
#[derive(Debug, Clone, PartialEq)]
pub struct PlottableSeries<'a> {
    pub style: LineStyle,
    pub name: &'a str,
    pub points: &'a [DataPoint],
}

/// The configured series that have points, in display order. The line style
/// follows the configured position so a series keeps its pattern even when a
/// sibling has no data.
pub fn plottable_series<'a>(
    data: &'a SeriesDataSet,
    config: &'a RenderConfig,
) -> Vec<PlottableSeries<'a>> {
    config
        .series_order
        .iter()
        .enumerate()
        .filter_map(|(index, name)| {
            let points = data.get(name).filter(|points| !points.is_empty())?;
            Some(PlottableSeries {
                style: LineStyle::for_index(index),
                name: name.as_str(),
                points,
            })
        })
        .collect()
}

/// Where each stage writes. Intermediates sit next to the final image.
///
/// The last stage writes `staged`, which replaces `output` only once it is
/// complete.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub raster: PathBuf,
    pub monochrome: PathBuf,
    pub staged: PathBuf,
    pub output: PathBuf,
}

impl ArtifactPaths {
    pub fn for_output(output: &Path, intermediate_extension: &str) -> Self {
        let dir = output.parent().unwrap_or_else(|| Path::new(""));
        let stem = output
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "chart".to_string());
        let output_extension = output
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_else(|| "png".to_string());

        Self {
            raster: dir.join(format!("{}_raster_temp.png", stem)),
            monochrome: dir.join(format!("{}_1bit_temp.{}", stem, intermediate_extension)),
            staged: dir.join(format!("{}_final_temp.{}", stem, output_extension)),
            output: output.to_path_buf(),
        }
    }
}

/// Removes the listed files when dropped, whichever way the render exits.
struct TempArtifacts<'a> {
    paths: [&'a Path; 3],
}

impl Drop for TempArtifacts<'_> {
    fn drop(&mut self) {
        for path in self.paths {
            if !path.exists() {
                continue;
            }
            match std::fs::remove_file(path) {
                Ok(()) => tracing::debug!("Cleaned up: {}", path.display()),
                Err(e) => tracing::warn!("Could not remove {}: {}", path.display(), e),
            }
        }
    }
}

pub struct ChartRenderer {
    config: RenderConfig,
    painter: Box<dyn ChartPainter>,
    encoder: Box<dyn BilevelEncoder>,
}

impl ChartRenderer {
    pub fn new(
        config: RenderConfig,
        painter: Box<dyn ChartPainter>,
        encoder: Box<dyn BilevelEncoder>,
    ) -> Self {
        Self {
            config,
            painter,
            encoder,
        }
    }

    /// Produce the final 1-bit chart and return its path.
    ///
    /// On any error the previous image at the output path is left as it was
    /// and no intermediate files remain.
    pub fn render(&self, data: &SeriesDataSet) -> Result<PathBuf, RenderError> {
        if !data.has_data() {
            tracing::warn!("No data to plot");
            return Err(RenderError::NoData);
        }

        for name in &self.config.series_order {
            if data.get(name).is_none_or(|points| points.is_empty()) {
                tracing::warn!("No data for series: {}", name);
            }
        }

        let paths = ArtifactPaths::for_output(
            &self.config.output_path,
            self.encoder.intermediate_extension(),
        );
        if let Some(dir) = paths.output.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let _cleanup = TempArtifacts {
            paths: [
                paths.raster.as_path(),
                paths.monochrome.as_path(),
                paths.staged.as_path(),
            ],
        };

        let canvas = CanvasSize::for_target(self.config.width_px, self.config.height_px);
        self.painter.paint(data, &self.config, canvas, &paths.raster)?;
        if !paths.raster.exists() {
            return Err(RenderError::MissingIntermediate(paths.raster.clone()));
        }
        tracing::info!("Temporary chart raster saved to {}", paths.raster.display());

        self.encoder.to_monochrome(
            &paths.raster,
            &paths.monochrome,
            self.config.width_px,
            self.config.height_px,
        )?;
        if !paths.monochrome.exists() {
            return Err(RenderError::MissingIntermediate(paths.monochrome.clone()));
        }
        tracing::info!("Intermediate monochrome image created at {}", paths.monochrome.display());

        self.encoder.to_bilevel(&paths.monochrome, &paths.staged)?;
        if !paths.staged.exists() {
            return Err(RenderError::MissingIntermediate(paths.staged.clone()));
        }
        std::fs::rename(&paths.staged, &paths.output)?;
        tracing::info!("Final 1-bit chart image saved to {}", paths.output.display());

        Ok(paths.output.clone())
    }
}
