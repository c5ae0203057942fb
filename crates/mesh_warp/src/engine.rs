use geo::Area;
use geo_types::{coord, Triangle};
use image::{Rgb, RgbImage};
use mask::reflect_101;
use tracing::debug;

use crate::{
    affine::{contains, triangle_affine},
    control::ControlSet,
    delaunay::triangulate,
    error::{Result, WarpError},
};

/// Per-run triangle accounting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WarpStats {
    pub triangles: usize,
    pub warped: usize,
    pub skipped: usize,
}

/// Bilinear sample with mirrored borders, so nothing dark bleeds in at the edges
fn sample(image: &RgbImage, x: f32, y: f32) -> Rgb<u8> {
    let (w, h) = image.dimensions();
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let at = |dx: i32, dy: i32| {
        let px = reflect_101(x0 as i32 + dx, w);
        let py = reflect_101(y0 as i32 + dy, h);
        image.get_pixel(px, py)
    };
    let (p00, p10, p01, p11) = (at(0, 0), at(1, 0), at(0, 1), at(1, 1));
    let mut out = [0u8; 3];
    for c in 0..3 {
        let top = p00[c] as f32 * (1.0 - fx) + p10[c] as f32 * fx;
        let bottom = p01[c] as f32 * (1.0 - fx) + p11[c] as f32 * fx;
        out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    Rgb(out)
}

/// Deform `image` by moving every control point from its source to its
/// target position.
///
/// The sources are triangulated once; each triangle is then mapped onto the
/// triangle formed by the same three points' targets. Pixels outside every
/// warped triangle keep their original value, and a degenerate triangle is
/// skipped without touching its neighbours.
pub fn warp(image: &RgbImage, controls: &ControlSet) -> Result<RgbImage> {
    warp_with_stats(image, controls).map(|(output, _)| output)
}

pub fn warp_with_stats(image: &RgbImage, controls: &ControlSet) -> Result<(RgbImage, WarpStats)> {
    if controls.len() < 3 {
        return Err(WarpError::TooFewControlPoints(controls.len()));
    }
    let (width, height) = image.dimensions();
    let mut output = image.clone();
    let mut stats = WarpStats::default();

    let points = controls.points();
    let triangles = triangulate(&controls.sources())?;
    stats.triangles = triangles.len();

    for tri in triangles {
        let src = tri.map(|i| points[i].source);
        let dst = tri.map(|i| points[i].target);

        let area = Triangle::new(
            coord! { x: dst[0][0], y: dst[0][1] },
            coord! { x: dst[1][0], y: dst[1][1] },
            coord! { x: dst[2][0], y: dst[2][1] },
        )
        .unsigned_area();
        let x0 = dst.iter().map(|p| p[0]).fold(f32::MAX, f32::min).floor().max(0.0) as i32;
        let y0 = dst.iter().map(|p| p[1]).fold(f32::MAX, f32::min).floor().max(0.0) as i32;
        let x1 = (dst.iter().map(|p| p[0]).fold(f32::MIN, f32::max).ceil() as i32).min(width as i32 - 1);
        let y1 = (dst.iter().map(|p| p[1]).fold(f32::MIN, f32::max).ceil() as i32).min(height as i32 - 1);
        if area <= 0.0 || x1 < x0 || y1 < y0 {
            stats.skipped += 1;
            continue;
        }
        let Some(forward) = triangle_affine(src, dst) else {
            stats.skipped += 1;
            continue;
        };
        let inverse = forward.invert();

        for y in y0..=y1 {
            for x in x0..=x1 {
                let (fx, fy) = (x as f32, y as f32);
                if !contains(dst, fx, fy) {
                    continue;
                }
                let (sx, sy) = inverse * (fx, fy);
                output.put_pixel(x as u32, y as u32, sample(image, sx, sy));
            }
        }
        stats.warped += 1;
    }

    debug!(
        "Warped {} of {} triangles ({} skipped)",
        stats.warped, stats.triangles, stats.skipped
    );
    Ok((output, stats))
}
