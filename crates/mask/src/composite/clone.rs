use image::RgbImage;
use tracing::{debug, warn};

use crate::{
    composite::placement::paste_centered,
    error::{MaskError, Result},
    types::RegionMask,
};

/// Solver settings for [`seamless_clone`]
#[derive(Debug, Clone, Copy)]
pub struct CloneSettings {
    pub max_iterations: usize,
    /// Over-relaxation factor in `(1, 2)`
    pub omega: f32,
    /// Stop once no pixel moves by more than this between sweeps
    pub tolerance: f32,
}

impl Default for CloneSettings {
    fn default() -> Self {
        Self {
            max_iterations: 400,
            omega: 1.9,
            tolerance: 0.01,
        }
    }
}

/// Gradient-domain clone of `patch`, centred on `center`.
///
/// Inside the masked interior of the patch the result keeps the patch's
/// gradients while taking its boundary values from `canvas`, so a patch with
/// different overall colour blends without a seam. The patch must sit fully
/// inside the canvas with a one pixel margin, otherwise
/// [`MaskError::CloneAnchor`] is returned.
pub fn seamless_clone(
    patch: &RgbImage,
    canvas: &RgbImage,
    mask: &RegionMask,
    center: [i32; 2],
) -> Result<RgbImage> {
    seamless_clone_with(patch, canvas, mask, center, CloneSettings::default())
}

pub fn seamless_clone_with(
    patch: &RgbImage,
    canvas: &RgbImage,
    mask: &RegionMask,
    center: [i32; 2],
    settings: CloneSettings,
) -> Result<RgbImage> {
    if patch.dimensions() != mask.dimensions() {
        return Err(MaskError::DimensionMismatch {
            expected: patch.dimensions(),
            actual: mask.dimensions(),
        });
    }
    let (pw, ph) = (patch.width() as i32, patch.height() as i32);
    let x0 = center[0] - pw / 2;
    let y0 = center[1] - ph / 2;
    if x0 < 1 || y0 < 1 || x0 + pw > canvas.width() as i32 - 1 || y0 + ph > canvas.height() as i32 - 1 {
        return Err(MaskError::CloneAnchor(format!(
            "{}x{} patch at ({}, {}) does not fit inside {}x{}",
            pw, ph, x0, y0, canvas.width(), canvas.height()
        )));
    }

    // unknowns: masked patch pixels off the patch border
    let inside = |x: i32, y: i32| x > 0 && y > 0 && x < pw - 1 && y < ph - 1 && mask.value(x as u32, y as u32) > 0.0;
    let unknowns: Vec<(i32, i32)> = (0..ph)
        .flat_map(|y| (0..pw).map(move |x| (x, y)))
        .filter(|&(x, y)| inside(x, y))
        .collect();
    if unknowns.is_empty() {
        return Err(MaskError::CloneAnchor("mask has no interior".into()));
    }

    let src = |x: i32, y: i32, c: usize| patch.get_pixel(x as u32, y as u32)[c] as f32;
    let dst = |x: i32, y: i32, c: usize| canvas.get_pixel((x0 + x) as u32, (y0 + y) as u32)[c] as f32;
    let neighbours = [(-1, 0), (1, 0), (0, -1), (0, 1)];

    let mut output = canvas.clone();
    let mut total_sweeps = 0;
    for c in 0..3 {
        // boundary offset between canvas and patch seeds the solve
        let mut offset_sum = 0.0;
        let mut offset_count = 0;
        for &(x, y) in &unknowns {
            for (dx, dy) in neighbours {
                let (nx, ny) = (x + dx, y + dy);
                if !inside(nx, ny) {
                    offset_sum += dst(nx, ny, c) - src(nx, ny, c);
                    offset_count += 1;
                }
            }
        }
        let offset = if offset_count > 0 { offset_sum / offset_count as f32 } else { 0.0 };

        let mut field: Vec<f32> = (0..ph)
            .flat_map(|y| (0..pw).map(move |x| (x, y)))
            .map(|(x, y)| if inside(x, y) { src(x, y, c) + offset } else { dst(x, y, c) })
            .collect();
        let at = |x: i32, y: i32| (y * pw + x) as usize;

        for sweep in 0..settings.max_iterations {
            let mut max_delta: f32 = 0.0;
            for &(x, y) in &unknowns {
                let mut sum = 0.0;
                for (dx, dy) in neighbours {
                    let (nx, ny) = (x + dx, y + dy);
                    sum += field[at(nx, ny)] + src(x, y, c) - src(nx, ny, c);
                }
                let current = field[at(x, y)];
                let next = current + settings.omega * (sum / 4.0 - current);
                max_delta = max_delta.max((next - current).abs());
                field[at(x, y)] = next;
            }
            total_sweeps = total_sweeps.max(sweep + 1);
            if max_delta < settings.tolerance {
                break;
            }
        }

        for &(x, y) in &unknowns {
            let pixel = output.get_pixel_mut((x0 + x) as u32, (y0 + y) as u32);
            pixel[c] = field[at(x, y)].round().clamp(0.0, 255.0) as u8;
        }
    }
    debug!("Seamless clone of {} pixels converged within {} sweeps", unknowns.len(), total_sweeps);
    Ok(output)
}

/// Gradient-domain clone, falling back to a plain masked paste when the
/// clone cannot anchor
pub fn clone_or_paste(
    patch: &RgbImage,
    canvas: &RgbImage,
    mask: &RegionMask,
    center: [i32; 2],
) -> Result<RgbImage> {
    match seamless_clone(patch, canvas, mask, center) {
        Err(MaskError::CloneAnchor(reason)) => {
            warn!("Seamless clone unavailable ({}), pasting instead", reason);
            paste_centered(canvas, patch, mask, center)
        }
        other => other,
    }
}
