// In-process bilevel encoder (image + png crates)
use crate::application::chart_renderer::BilevelEncoder;
use crate::domain::error::RenderError;
use crate::infrastructure::raster::{pack_bits, threshold};
use image::ImageFormat;
use image::imageops::FilterType;
use std::path::Path;

/// Produces the same artifacts as the ImageMagick pipeline without an
/// external binary. The intermediate is an 8-bit grayscale PNG holding only
/// pure black and pure white.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeEncoder;

fn encoding_error(stage: &str, path: &Path, e: impl std::fmt::Display) -> RenderError {
    RenderError::Encoding(format!("{} {}: {}", stage, path.display(), e))
}

impl BilevelEncoder for NativeEncoder {
    fn intermediate_extension(&self) -> &'static str {
        "png"
    }

    fn to_monochrome(
        &self,
        source: &Path,
        target: &Path,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        let gray = image::open(source)
            .map_err(|e| encoding_error("cannot read", source, e))?
            .to_luma8();

        let mut resized = image::imageops::resize(&gray, width, height, FilterType::Triangle);
        threshold(&mut resized);

        resized
            .save_with_format(target, ImageFormat::Png)
            .map_err(|e| encoding_error("cannot write", target, e))
    }

    fn to_bilevel(&self, source: &Path, target: &Path) -> Result<(), RenderError> {
        let mut gray = image::open(source)
            .map_err(|e| encoding_error("cannot read", source, e))?
            .to_luma8();
        threshold(&mut gray);
        let (width, height) = gray.dimensions();

        // Encode fully in memory so a failure never leaves a truncated file
        // over the previous chart.
        let mut encoded = Vec::new();
        let mut encoder = png::Encoder::new(&mut encoded, width, height);
        encoder.set_color(png::ColorType::Grayscale);
        encoder.set_depth(png::BitDepth::One);

        let mut writer = encoder
            .write_header()
            .map_err(|e| encoding_error("cannot write", target, e))?;
        writer
            .write_image_data(&pack_bits(&gray))
            .map_err(|e| encoding_error("cannot write", target, e))?;
        writer
            .finish()
            .map_err(|e| encoding_error("cannot finish", target, e))?;

        std::fs::write(target, encoded)?;
        Ok(())
    }
}
