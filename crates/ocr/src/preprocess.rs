use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use std::io::Cursor;
use thiserror::Error;

/// Tesseract reads best around 300 DPI; small phone crops land well below
/// that, so anything narrower than this gets upscaled.
const TARGET_WIDTH: u32 = 1500;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Failed to load image: {0}")]
    Load(#[from] image::ImageError),
    #[error("Failed to encode processed image: {0}")]
    Encode(String),
}

/// Normalize raw image bytes (JPEG / PNG / GIF / WEBP) for recognition and
/// return PNG bytes.
///
/// Preprocessing is strictly best-effort: if the bytes cannot be decoded or
/// re-encoded, the original bytes are passed through unmodified so a
/// preprocessing failure can never abort the pipeline. The 300-DPI hint is
/// not carried in the PNG; the engine gets it as a command-line parameter.
pub fn prepare_for_ocr(data: &[u8]) -> Vec<u8> {
    match try_prepare(data) {
        Ok(png) => png,
        Err(e) => {
            tracing::warn!("Image preprocessing failed ({e}), using original image");
            data.to_vec()
        }
    }
}

fn try_prepare(data: &[u8]) -> Result<Vec<u8>, PreprocessError> {
    let img = image::load_from_memory(data)?;
    encode_as_png(normalize(img))
}

/// Grayscale → upscale → contrast ×2 → sharpen → brightness stretch.
/// The order matters: grayscale first drops colored stamps and watermarks
/// before they can skew the contrast passes.
fn normalize(img: DynamicImage) -> DynamicImage {
    let gray = DynamicImage::ImageLuma8(img.to_luma8());

    let gray = if gray.width() > 0 && gray.width() < TARGET_WIDTH {
        let scale = TARGET_WIDTH as f32 / gray.width() as f32;
        let h = (gray.height() as f32 * scale).round().max(1.0) as u32;
        gray.resize_exact(TARGET_WIDTH, h, image::imageops::FilterType::Lanczos3)
    } else {
        gray
    };

    // Two contrast passes for a stronger effect, then edge sharpening.
    let boosted = gray.adjust_contrast(15.0).adjust_contrast(15.0);
    let sharpened = boosted.unsharpen(2.0, 0);

    stretch_levels(sharpened.to_luma8())
}

/// Brightness normalization: stretch the observed luma range to 0..255.
fn stretch_levels(gray: GrayImage) -> DynamicImage {
    let (min_px, max_px) = gray
        .pixels()
        .fold((255u8, 0u8), |(mn, mx), p| (mn.min(p[0]), mx.max(p[0])));

    if max_px == min_px {
        // Uniform image — nothing to stretch.
        return DynamicImage::ImageLuma8(gray);
    }

    let range = (max_px - min_px) as u32;
    let stretched: GrayImage = ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
        let p = gray.get_pixel(x, y)[0];
        let v = ((p - min_px) as u32 * 255 / range) as u8;
        Luma([v])
    });

    DynamicImage::ImageLuma8(stretched)
}

fn encode_as_png(img: DynamicImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_gray(width: u32, height: u32, value: u8) -> DynamicImage {
        let img: GrayImage = ImageBuffer::from_fn(width, height, |_, _| Luma([value]));
        DynamicImage::ImageLuma8(img)
    }

    fn png_bytes(img: &DynamicImage) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn narrow_image_is_upscaled_to_target_width() {
        let result = normalize(solid_gray(400, 200, 128));
        assert_eq!(result.width(), TARGET_WIDTH);
        assert_eq!(result.height(), 750);
    }

    #[test]
    fn wide_image_keeps_its_size() {
        let result = normalize(solid_gray(2000, 100, 128));
        assert_eq!(result.width(), 2000);
        assert_eq!(result.height(), 100);
    }

    #[test]
    fn gradient_stretches_to_full_range() {
        let img: GrayImage =
            ImageBuffer::from_fn(256, 1, |x, _| Luma([(64 + x / 2) as u8]));
        let result = stretch_levels(img);
        let gray = result.to_luma8();
        let min = gray.pixels().map(|p| p[0]).min().unwrap();
        let max = gray.pixels().map(|p| p[0]).max().unwrap();
        assert_eq!(min, 0);
        assert_eq!(max, 255);
    }

    #[test]
    fn uniform_image_does_not_panic() {
        let result = stretch_levels(solid_gray(10, 10, 77).to_luma8());
        assert_eq!(result.width(), 10);
    }

    #[test]
    fn prepare_produces_png_header() {
        let data = png_bytes(&solid_gray(1600, 40, 100));
        let result = prepare_for_ocr(&data);
        assert_eq!(&result[..4], b"\x89PNG");
    }

    #[test]
    fn corrupt_bytes_pass_through_unmodified() {
        let garbage = b"definitely not an image".to_vec();
        assert_eq!(prepare_for_ocr(&garbage), garbage);
    }
}
