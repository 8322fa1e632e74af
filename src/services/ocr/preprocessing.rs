use crate::models::config::MAX_SCALE;
use image::imageops::FilterType;
use image::DynamicImage;

/// Uniformly upscale an image by `factor` with Lanczos3 resampling.
///
/// Factors at or below 1 return the image unchanged; factors above
/// [`MAX_SCALE`] are clamped to it.
pub fn upscale(image: DynamicImage, factor: f64) -> DynamicImage {
    if !(factor > 1.0) {
        return image;
    }
    let factor = factor.min(MAX_SCALE);

    let new_width = (image.width() as f64 * factor).round() as u32;
    let new_height = (image.height() as f64 * factor).round() as u32;

    image.resize_exact(new_width, new_height, FilterType::Lanczos3)
}

/// Encode image as PNG bytes for the OCR engines
pub fn image_to_png_bytes(image: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    image.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)?;
    Ok(buf)
}
