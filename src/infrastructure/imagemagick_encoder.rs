// ImageMagick bilevel encoder - Shells out to `convert`
use crate::application::chart_renderer::BilevelEncoder;
use crate::domain::error::RenderError;
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

#[derive(Debug, Clone)]
pub struct ImageMagickEncoder {
    binary: String,
}

impl ImageMagickEncoder {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn run(&self, args: Vec<OsString>) -> Result<(), RenderError> {
        tracing::debug!("Running {} {:?}", self.binary, args);

        let output = Command::new(&self.binary)
            .args(&args)
            .output()
            .map_err(|e| RenderError::Encoding(format!("cannot run {}: {}", self.binary, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RenderError::Encoding(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

/// `convert <src> -resize WxH! -monochrome <dst>`; the `!` forces the exact
/// size regardless of aspect ratio.
pub fn monochrome_args(source: &Path, target: &Path, width: u32, height: u32) -> Vec<OsString> {
    vec![
        source.into(),
        "-resize".into(),
        format!("{}x{}!", width, height).into(),
        "-monochrome".into(),
        target.into(),
    ]
}

/// `convert <src> -type bilevel -depth 1 -define png:color-type=0 <dst>`:
/// 1-bit grayscale PNG, no palette.
pub fn bilevel_args(source: &Path, target: &Path) -> Vec<OsString> {
    vec![
        source.into(),
        "-type".into(),
        "bilevel".into(),
        "-depth".into(),
        "1".into(),
        "-define".into(),
        "png:color-type=0".into(),
        target.into(),
    ]
}

impl BilevelEncoder for ImageMagickEncoder {
    fn intermediate_extension(&self) -> &'static str {
        "pbm"
    }

    fn to_monochrome(
        &self,
        source: &Path,
        target: &Path,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        self.run(monochrome_args(source, target, width, height))
    }

    fn to_bilevel(&self, source: &Path, target: &Path) -> Result<(), RenderError> {
        self.run(bilevel_args(source, target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::chart_renderer::{ArtifactPaths, ChartRenderer};
    use crate::application::test_support::{render_config, sample_data, RecordingPainter};

    #[test]
    fn test_monochrome_args() {
        let args = monochrome_args(Path::new("a.png"), Path::new("b.pbm"), 800, 480);
        assert_eq!(args, ["a.png", "-resize", "800x480!", "-monochrome", "b.pbm"]);
    }

    #[test]
    fn test_bilevel_args() {
        let args = bilevel_args(Path::new("b.pbm"), Path::new("chart.png"));
        assert_eq!(
            args,
            [
                "b.pbm",
                "-type",
                "bilevel",
                "-depth",
                "1",
                "-define",
                "png:color-type=0",
                "chart.png"
            ]
        );
    }

    #[test]
    fn test_missing_binary_is_an_encoding_error() {
        let encoder = ImageMagickEncoder::new("definitely-not-imagemagick");
        let result = encoder.to_bilevel(Path::new("in.pbm"), Path::new("out.png"));
        assert!(matches!(result, Err(RenderError::Encoding(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_binary_is_an_encoding_error() {
        let encoder = ImageMagickEncoder::new("false");
        let result = encoder.to_monochrome(Path::new("in.png"), Path::new("out.pbm"), 8, 8);
        assert!(matches!(result, Err(RenderError::Encoding(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_silent_first_stage_leaves_no_artifacts() {
        // `true` exits 0 without writing the intermediate.
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("chart.png");
        let renderer = ChartRenderer::new(
            render_config(&output),
            Box::new(RecordingPainter::default()),
            Box::new(ImageMagickEncoder::new("true")),
        );

        let result = renderer.render(&sample_data(3, 0));

        assert!(matches!(result, Err(RenderError::MissingIntermediate(_))));
        assert!(!output.exists());
        let paths = ArtifactPaths::for_output(&output, "pbm");
        assert!(!paths.raster.exists());
        assert!(!paths.monochrome.exists());
        assert!(!paths.staged.exists());
    }

    /// Shell stand-in for `convert`: the resize stage succeeds, the bilevel
    /// stage writes a partial file and exits 1.
    #[cfg(unix)]
    fn truncating_convert(dir: &Path) -> std::path::PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("fake-convert");
        std::fs::write(
            &script,
            "#!/bin/sh\n\
             for last; do :; done\n\
             case \" $* \" in\n\
               *\" -monochrome \"*) printf mono > \"$last\" ;;\n\
               *) printf TRUNC > \"$last\"; exit 1 ;;\n\
             esac\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_bilevel_stage_keeps_previous_chart() {
        let dir = tempfile::tempdir().unwrap();
        let bin = tempfile::tempdir().unwrap();
        let output = dir.path().join("chart.png");
        std::fs::write(&output, b"previous").unwrap();
        let convert = truncating_convert(bin.path());
        let renderer = ChartRenderer::new(
            render_config(&output),
            Box::new(RecordingPainter::default()),
            Box::new(ImageMagickEncoder::new(convert.to_string_lossy())),
        );

        let result = renderer.render(&sample_data(3, 2));

        assert!(matches!(result, Err(RenderError::Encoding(_))));
        assert_eq!(std::fs::read(&output).unwrap(), b"previous");
        let paths = ArtifactPaths::for_output(&output, "pbm");
        assert!(!paths.raster.exists());
        assert!(!paths.monochrome.exists());
        assert!(!paths.staged.exists());
    }
}
