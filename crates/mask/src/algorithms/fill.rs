use image::{Rgb, RgbImage};
use tracing::debug;

use crate::{
    error::{MaskError, Result},
    types::RegionMask,
};

const NEIGHBOURS: [(i32, i32); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0), (1, 0),
    (-1, 1), (0, 1), (1, 1),
];

/// Replace every masked pixel with colour diffused in from the surrounding
/// unmasked pixels.
///
/// The hole is filled from its border inwards one ring at a time, each pixel
/// taking the mean of its already-known neighbours. A mask covering the whole
/// image has nothing to diffuse from and leaves the image unchanged.
pub fn fill_region(image: &RgbImage, mask: &RegionMask) -> Result<RgbImage> {
    if image.dimensions() != mask.dimensions() {
        return Err(MaskError::DimensionMismatch {
            expected: image.dimensions(),
            actual: mask.dimensions(),
        });
    }
    let (width, height) = image.dimensions();
    let mut output = image.clone();
    let mut known: Vec<bool> = mask.buffer().pixels().map(|p| p[0] <= 0.0).collect();
    let mut pending: Vec<(u32, u32)> = mask
        .buffer()
        .enumerate_pixels()
        .filter(|(_, _, p)| p[0] > 0.0)
        .map(|(x, y, _)| (x, y))
        .collect();
    if pending.is_empty() || pending.len() == known.len() {
        return Ok(output);
    }

    let mut rings = 0;
    while !pending.is_empty() {
        let mut ring = Vec::new();
        let mut rest = Vec::new();
        for &(x, y) in &pending {
            let mut sum = [0u32; 3];
            let mut count = 0;
            for (dx, dy) in NEIGHBOURS {
                let nx = x as i32 + dx;
                let ny = y as i32 + dy;
                if nx < 0 || ny < 0 || nx >= width as i32 || ny >= height as i32 {
                    continue;
                }
                if !known[(ny as u32 * width + nx as u32) as usize] {
                    continue;
                }
                let p = output.get_pixel(nx as u32, ny as u32);
                for c in 0..3 {
                    sum[c] += p[c] as u32;
                }
                count += 1;
            }
            if count == 0 {
                rest.push((x, y));
            } else {
                let mean = |c: usize| ((sum[c] as f32 / count as f32).round()) as u8;
                ring.push((x, y, Rgb([mean(0), mean(1), mean(2)])));
            }
        }
        if ring.is_empty() {
            break;
        }
        // a ring is committed only after all of it is computed
        for &(x, y, colour) in &ring {
            output.put_pixel(x, y, colour);
            known[(y * width + x) as usize] = true;
        }
        pending = rest;
        rings += 1;
    }
    debug!("Filled region in {} rings", rings);
    Ok(output)
}
