use image::{Rgb, RgbImage};

use crate::{
    error::{MaskError, Result},
    types::RegionMask,
};

fn check_dimensions(expected: (u32, u32), actual: (u32, u32)) -> Result<()> {
    if expected != actual {
        return Err(MaskError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

/// `fg * mask + bg * (1 - mask)` per channel, computed in floating point and
/// truncated back to 8 bits
pub fn blend(fg: &RgbImage, bg: &RgbImage, mask: &RegionMask) -> Result<RgbImage> {
    check_dimensions(bg.dimensions(), fg.dimensions())?;
    check_dimensions(bg.dimensions(), mask.dimensions())?;
    let mut output = bg.clone();
    for (x, y, pixel) in output.enumerate_pixels_mut() {
        let m = mask.value(x, y);
        if m <= 0.0 {
            continue;
        }
        let f = fg.get_pixel(x, y);
        for c in 0..3 {
            let b = pixel[c] as f32;
            pixel[c] = (b + (f[c] as f32 - b) * m) as u8;
        }
    }
    Ok(output)
}

/// Uniform colour layer blended over the mask at a fixed opacity
pub fn recolor(image: &RgbImage, mask: &RegionMask, color: Rgb<u8>, opacity: f32) -> Result<RgbImage> {
    let layer = solid(image.width(), image.height(), color);
    blend(&layer, image, &mask.scale(opacity))
}

/// `a * alpha + b * beta + gamma`, rounded and saturated to 8 bits
pub fn add_weighted(a: &RgbImage, alpha: f32, b: &RgbImage, beta: f32, gamma: f32) -> Result<RgbImage> {
    check_dimensions(a.dimensions(), b.dimensions())?;
    let mut output = a.clone();
    for (x, y, pixel) in output.enumerate_pixels_mut() {
        let q = b.get_pixel(x, y);
        for c in 0..3 {
            let v = pixel[c] as f32 * alpha + q[c] as f32 * beta + gamma;
            pixel[c] = v.round().clamp(0.0, 255.0) as u8;
        }
    }
    Ok(output)
}

/// Add a constant to every channel, saturating at white
pub fn brighten(image: &RgbImage, amount: u8) -> RgbImage {
    let mut output = image.clone();
    for pixel in output.pixels_mut() {
        for c in 0..3 {
            pixel[c] = pixel[c].saturating_add(amount);
        }
    }
    output
}

/// Image filled with one colour
pub fn solid(width: u32, height: u32, color: Rgb<u8>) -> RgbImage {
    RgbImage::from_pixel(width, height, color)
}
