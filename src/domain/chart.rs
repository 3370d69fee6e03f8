// Chart geometry and styling models

/// Reference density the canvas is laid out at. One canvas unit per device
/// pixel, so the drawn raster already has the target resolution.
pub const REFERENCE_DPI: f64 = 100.0;

/// Pixel size of the drawing surface, derived from the target display size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub fn for_target(width_px: u32, height_px: u32) -> Self {
        let width_in = width_px as f64 / REFERENCE_DPI;
        let height_in = height_px as f64 / REFERENCE_DPI;
        Self {
            width: (width_in * REFERENCE_DPI).round() as u32,
            height: (height_in * REFERENCE_DPI).round() as u32,
        }
    }
}

/// Stroke pattern for a plotted series. Colour is always black, so the pattern
/// is the only way to tell series apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
}

const LINE_STYLES: [LineStyle; 3] = [LineStyle::Solid, LineStyle::Dashed, LineStyle::Dotted];

impl LineStyle {
    /// Style for the series at `index` in display order, cycling when there
    /// are more series than patterns.
    pub fn for_index(index: usize) -> Self {
        LINE_STYLES[index % LINE_STYLES.len()]
    }

    /// Dash length and gap in pixels; `None` for a continuous stroke.
    pub fn dash_pattern(self) -> Option<(u32, u32)> {
        match self {
            LineStyle::Solid => None,
            LineStyle::Dashed => Some((8, 4)),
            LineStyle::Dotted => Some((2, 3)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_maps_one_to_one() {
        assert_eq!(
            CanvasSize::for_target(800, 480),
            CanvasSize {
                width: 800,
                height: 480
            }
        );
        assert_eq!(CanvasSize::for_target(1448, 1072).width, 1448);
    }

    #[test]
    fn test_line_styles_cycle() {
        assert_eq!(LineStyle::for_index(0), LineStyle::Solid);
        assert_eq!(LineStyle::for_index(1), LineStyle::Dashed);
        assert_eq!(LineStyle::for_index(2), LineStyle::Dotted);
        assert_eq!(LineStyle::for_index(3), LineStyle::Solid);
        assert_eq!(LineStyle::Solid.dash_pattern(), None);
    }
}
