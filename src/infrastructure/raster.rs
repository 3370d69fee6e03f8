// Raster helpers built on the image crate
use crate::domain::error::RenderError;
use image::{GrayImage, Luma, RgbImage};
use std::path::Path;

/// Channel value below which a pixel counts as ink when cropping.
const BACKGROUND_CUTOFF: u8 = 250;

/// Luminance below which a pixel becomes black in the bilevel output.
pub const BLACK_THRESHOLD: u8 = 128;

/// Bounding box `(x, y, width, height)` of every non-white pixel, grown by
/// `margin` and clamped to the image. `None` for a blank image.
pub fn content_bounds(img: &RgbImage, margin: u32) -> Option<(u32, u32, u32, u32)> {
    let (width, height) = img.dimensions();
    let mut bounds: Option<(u32, u32, u32, u32)> = None;

    for (x, y, pixel) in img.enumerate_pixels() {
        if pixel.0.iter().all(|&c| c >= BACKGROUND_CUTOFF) {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }

    bounds.map(|(x0, y0, x1, y1)| {
        let left = x0.saturating_sub(margin);
        let top = y0.saturating_sub(margin);
        let right = (x1 + margin).min(width - 1);
        let bottom = (y1 + margin).min(height - 1);
        (left, top, right - left + 1, bottom - top + 1)
    })
}

/// Crop the PNG at `path` in place to its content plus `margin`.
pub fn crop_to_content(path: &Path, margin: u32) -> Result<(), RenderError> {
    let img = image::open(path)
        .map_err(|e| RenderError::Draw(format!("cannot reopen {}: {}", path.display(), e)))?
        .to_rgb8();

    let Some((x, y, w, h)) = content_bounds(&img, margin) else {
        return Ok(());
    };
    if (w, h) == img.dimensions() {
        return Ok(());
    }

    image::imageops::crop_imm(&img, x, y, w, h)
        .to_image()
        .save(path)
        .map_err(|e| RenderError::Draw(format!("cannot save cropped {}: {}", path.display(), e)))
}

/// Force every pixel to pure black or pure white.
pub fn threshold(img: &mut GrayImage) {
    for pixel in img.pixels_mut() {
        *pixel = if pixel.0[0] < BLACK_THRESHOLD {
            Luma([0])
        } else {
            Luma([255])
        };
    }
}

/// Pack a grayscale image into 1-bit rows, most significant bit first,
/// each row padded to a whole byte. A set bit is white.
pub fn pack_bits(img: &GrayImage) -> Vec<u8> {
    let (width, height) = img.dimensions();
    let row_bytes = width.div_ceil(8) as usize;
    let mut packed = vec![0u8; row_bytes * height as usize];

    for (x, y, pixel) in img.enumerate_pixels() {
        if pixel.0[0] >= BLACK_THRESHOLD {
            packed[y as usize * row_bytes + (x / 8) as usize] |= 0x80 >> (x % 8);
        }
    }
    packed
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn blank(width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([255, 255, 255]))
    }

    #[test]
    fn test_content_bounds() {
        let mut img = blank(100, 60);
        img.put_pixel(20, 10, Rgb([0, 0, 0]));
        img.put_pixel(70, 40, Rgb([0, 0, 200]));

        assert_eq!(content_bounds(&img, 0), Some((20, 10, 51, 31)));
        assert_eq!(content_bounds(&img, 5), Some((15, 5, 61, 41)));
    }

    #[test]
    fn test_content_bounds_clamped_to_image() {
        let mut img = blank(10, 10);
        img.put_pixel(0, 9, Rgb([0, 0, 0]));

        assert_eq!(content_bounds(&img, 4), Some((0, 5, 5, 5)));
    }

    #[test]
    fn test_blank_image_has_no_bounds() {
        assert_eq!(content_bounds(&blank(10, 10), 2), None);
    }

    #[test]
    fn test_crop_to_content_rewrites_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raster.png");
        let mut img = blank(200, 100);
        for x in 50..150 {
            img.put_pixel(x, 50, Rgb([0, 0, 0]));
        }
        img.save(&path).unwrap();

        crop_to_content(&path, 2).unwrap();

        let cropped = image::open(&path).unwrap();
        assert_eq!((cropped.width(), cropped.height()), (104, 5));
    }

    #[test]
    fn test_threshold() {
        let mut img = GrayImage::from_raw(4, 1, vec![0, 127, 128, 255]).unwrap();
        threshold(&mut img);
        assert_eq!(img.into_raw(), vec![0, 0, 255, 255]);
    }

    #[test]
    fn test_pack_bits_pads_rows() {
        // 10 pixels wide: two bytes per row, white where the value is 255.
        let mut row = vec![0u8; 10];
        row[0] = 255;
        row[9] = 255;
        let img = GrayImage::from_raw(10, 1, row).unwrap();

        assert_eq!(pack_bits(&img), vec![0b1000_0000, 0b0100_0000]);
    }
}
