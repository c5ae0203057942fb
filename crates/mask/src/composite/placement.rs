use face_common::PixelRect;
use image::{imageops, RgbImage};
use tracing::debug;

use crate::{
    error::{MaskError, Result},
    types::RegionMask,
};

/// Matching source (patch) and destination (canvas) rectangles of equal size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub src: PixelRect,
    pub dst: PixelRect,
}

/// Clip a `width` x `height` patch whose top-left corner lands at `(x, y)`
/// against the canvas.
///
/// Both rectangles shrink by the same out-of-bounds amount on each side, so
/// the part of the patch that stays visible keeps its alignment. `None` when
/// nothing of the patch lands on the canvas.
pub fn clip_placement(
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    canvas_width: u32,
    canvas_height: u32,
) -> Option<Placement> {
    let dst_x0 = x.max(0);
    let dst_y0 = y.max(0);
    let dst_x1 = (x + width as i32).min(canvas_width as i32);
    let dst_y1 = (y + height as i32).min(canvas_height as i32);
    if dst_x0 >= dst_x1 || dst_y0 >= dst_y1 {
        return None;
    }
    let w = dst_x1 - dst_x0;
    let h = dst_y1 - dst_y0;
    Some(Placement {
        src: PixelRect::new(dst_x0 - x, dst_y0 - y, w, h),
        dst: PixelRect::new(dst_x0, dst_y0, w, h),
    })
}

/// Blend `patch` into `canvas` with its top-left corner at `(x, y)`.
///
/// `mask` has the patch's size and weights the patch against the canvas.
/// A patch entirely off the canvas is reported as
/// [`MaskError::PatchOutOfBounds`], which callers recover from as a no-op.
pub fn paste_patch(
    canvas: &RgbImage,
    patch: &RgbImage,
    mask: &RegionMask,
    x: i32,
    y: i32,
) -> Result<RgbImage> {
    if patch.dimensions() != mask.dimensions() {
        return Err(MaskError::DimensionMismatch {
            expected: patch.dimensions(),
            actual: mask.dimensions(),
        });
    }
    let placement = clip_placement(patch.width(), patch.height(), x, y, canvas.width(), canvas.height())
        .ok_or(MaskError::PatchOutOfBounds {
            x,
            y,
            width: patch.width(),
            height: patch.height(),
        })?;
    debug!("Pasting patch {:?}", placement);

    let Placement { src, dst } = placement;
    let mut output = canvas.clone();
    for j in 0..dst.height {
        for i in 0..dst.width {
            let (sx, sy) = ((src.x + i) as u32, (src.y + j) as u32);
            let m = mask.value(sx, sy);
            if m <= 0.0 {
                continue;
            }
            let f = patch.get_pixel(sx, sy);
            let pixel = output.get_pixel_mut((dst.x + i) as u32, (dst.y + j) as u32);
            for c in 0..3 {
                let b = pixel[c] as f32;
                pixel[c] = (b + (f[c] as f32 - b) * m) as u8;
            }
        }
    }
    Ok(output)
}

/// [`paste_patch`] with the patch centred on `center`
pub fn paste_centered(
    canvas: &RgbImage,
    patch: &RgbImage,
    mask: &RegionMask,
    center: [i32; 2],
) -> Result<RgbImage> {
    let x = center[0] - patch.width() as i32 / 2;
    let y = center[1] - patch.height() as i32 / 2;
    paste_patch(canvas, patch, mask, x, y)
}

/// Copy a rectangle out of an image; the rectangle must lie inside it
pub fn crop_rgb(image: &RgbImage, rect: PixelRect) -> RgbImage {
    imageops::crop_imm(image, rect.x as u32, rect.y as u32, rect.width as u32, rect.height as u32).to_image()
}

/// Resample with bicubic filtering
pub fn resize_rgb(image: &RgbImage, width: u32, height: u32) -> RgbImage {
    imageops::resize(image, width, height, imageops::FilterType::CatmullRom)
}

/// Resample with the sharper Lanczos filter
pub fn resize_rgb_lanczos(image: &RgbImage, width: u32, height: u32) -> RgbImage {
    imageops::resize(image, width, height, imageops::FilterType::Lanczos3)
}
