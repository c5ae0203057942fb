use face_common::PixelRect;
use image::{Rgb, RgbImage};
use tracing::debug;

/// Mirror an out-of-range coordinate back inside `0..len` without repeating
/// the edge pixel (`gfedcb|abcdefgh|gfedcba`).
pub fn reflect_101(i: i32, len: u32) -> u32 {
    let len = len as i32;
    if len <= 1 {
        return 0;
    }
    let period = 2 * (len - 1);
    let mut i = i.rem_euclid(period);
    if i >= len {
        i = period - i;
    }
    i as u32
}

/// Edge-preserving smoothing.
///
/// Each output pixel is the average of a circular `radius` neighbourhood,
/// weighted by spatial distance and by the L1 colour difference to the
/// centre, so flat skin is smoothed while contrast edges survive. Only pixels
/// inside `region` are rewritten; neighbours are still read from the whole
/// image, reflected at the border.
pub fn bilateral_smooth(
    image: &RgbImage,
    radius: u32,
    sigma_color: f32,
    sigma_space: f32,
    region: Option<PixelRect>,
) -> RgbImage {
    let (width, height) = image.dimensions();
    let mut output = image.clone();
    if radius == 0 || width == 0 || height == 0 {
        return output;
    }
    let full = PixelRect::new(0, 0, width as i32, height as i32);
    let Some(area) = region.unwrap_or(full).padded_within(0, width, height) else {
        return output;
    };

    let r = radius as i32;
    let space_coeff = -0.5 / (sigma_space * sigma_space);
    let color_coeff = -0.5 / (sigma_color * sigma_color);

    let mut offsets = Vec::new();
    for dy in -r..=r {
        for dx in -r..=r {
            let d2 = (dx * dx + dy * dy) as f32;
            if d2 <= (r * r) as f32 {
                offsets.push((dx, dy, (d2 * space_coeff).exp()));
            }
        }
    }
    // colour weights for every possible L1 difference
    let color_lut: Vec<f32> = (0..=255 * 3)
        .map(|d| ((d * d) as f32 * color_coeff).exp())
        .collect();

    debug!("Bilateral smoothing {:?} with {} taps", area, offsets.len());

    for y in area.y..area.bottom() {
        for x in area.x..area.right() {
            let center = image.get_pixel(x as u32, y as u32);
            let mut sum = [0.0f32; 3];
            let mut total = 0.0f32;
            for &(dx, dy, space_weight) in &offsets {
                let nx = reflect_101(x + dx, width);
                let ny = reflect_101(y + dy, height);
                let neighbour = image.get_pixel(nx, ny);
                let diff: usize = (0..3)
                    .map(|c| (neighbour[c] as i32 - center[c] as i32).unsigned_abs() as usize)
                    .sum();
                let weight = space_weight * color_lut[diff];
                for c in 0..3 {
                    sum[c] += neighbour[c] as f32 * weight;
                }
                total += weight;
            }
            let pixel = Rgb([
                (sum[0] / total).round().clamp(0.0, 255.0) as u8,
                (sum[1] / total).round().clamp(0.0, 255.0) as u8,
                (sum[2] / total).round().clamp(0.0, 255.0) as u8,
            ]);
            output.put_pixel(x as u32, y as u32, pixel);
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect_101() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(-2, 5), 2);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(2, 5), 2);
        assert_eq!(reflect_101(7, 1), 0);
    }

    #[test]
    fn test_flat_image_is_unchanged() {
        let image = RgbImage::from_pixel(20, 20, Rgb([120, 90, 80]));
        assert_eq!(bilateral_smooth(&image, 4, 75.0, 75.0, None), image);
    }

    #[test]
    fn test_noise_is_reduced_and_edges_survive() {
        let image = RgbImage::from_fn(40, 20, |x, y| {
            let base = if x < 20 { 60 } else { 200 };
            let noise = if (x + y) % 2 == 0 { 6 } else { 0 };
            Rgb([base + noise, base + noise, base + noise])
        });
        let smooth = bilateral_smooth(&image, 3, 20.0, 5.0, None);
        let a = smooth.get_pixel(8, 10)[0] as i32;
        let b = smooth.get_pixel(9, 10)[0] as i32;
        assert!((a - b).abs() < 6);
        assert!(smooth.get_pixel(19, 10)[0] < 80);
        assert!(smooth.get_pixel(20, 10)[0] > 180);
    }

    #[test]
    fn test_region_limits_the_rewrite() {
        let image = RgbImage::from_fn(30, 30, |x, y| Rgb([((x * 7 + y * 13) % 256) as u8, 0, 0]));
        let region = PixelRect::new(10, 10, 5, 5);
        let smooth = bilateral_smooth(&image, 2, 200.0, 10.0, Some(region));
        assert_eq!(smooth.get_pixel(0, 0), image.get_pixel(0, 0));
        assert_eq!(smooth.get_pixel(20, 20), image.get_pixel(20, 20));
    }
}
