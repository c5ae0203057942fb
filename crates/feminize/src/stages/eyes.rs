use face_common::{LandmarkSet, Region};
use image::RgbImage;
use mask::{
    composite::{add_weighted, crop_rgb, paste_centered, recolor, resize_rgb},
    RegionMask,
};
use tracing::debug;

use crate::{
    config::EyeParams,
    error::{StageError, StageResult},
    stage::{Stage, StageKind},
    stages::{apply_per_side, landmark_extent, rgb, to_f32},
};

/// Eyes in image order: the subject's left eye sits on the image right,
/// so its outer corner points towards +x.
const SIDES: [(Region, f32); 2] = [(Region::LeftEye, 1.0), (Region::RightEye, -1.0)];

/// Cat-eye liner, lashes and a slight enlargement of each eye
pub struct EyeStage {
    params: EyeParams,
}

impl EyeStage {
    pub fn new(params: EyeParams) -> Self {
        Self { params }
    }

    /// Points on the upper half of the eye contour, left to right
    fn upper_lid(points: &[[i32; 2]]) -> Vec<[i32; 2]> {
        let min_y = points.iter().map(|p| p[1]).min().unwrap_or(0);
        let max_y = points.iter().map(|p| p[1]).max().unwrap_or(0);
        let mid_y = (min_y + max_y) / 2;
        let mut lid: Vec<[i32; 2]> = points.iter().copied().filter(|p| p[1] < mid_y + 2).collect();
        lid.sort_by_key(|p| p[0]);
        lid
    }

    /// Liner and lashes for both eyes mixed into the image in one pass.
    /// Returns `None` when neither lid is usable.
    fn makeup(&self, image: &RgbImage, landmarks: &LandmarkSet) -> StageResult<Option<RgbImage>> {
        let p = &self.params;
        let (w, h) = image.dimensions();
        let mut liner = RegionMask::empty(w, h);
        let mut lashes = RegionMask::empty(w, h);
        let mut drawn = false;

        for (region, outward) in SIDES {
            let lid = Self::upper_lid(&landmarks.region(region));
            let span = lid.last().map_or(0, |last| last[0] - lid[0][0]);
            if lid.len() <= 2 || span <= 1 {
                debug!("Skipping makeup on {}: lid too small", region);
                continue;
            }
            let outer = if outward > 0.0 { lid[lid.len() - 1] } else { lid[0] };
            let outer = to_f32(outer);
            let curve: Vec<[f32; 2]> = lid.iter().copied().map(to_f32).collect();
            liner = liner.union(&RegionMask::from_stroke(w, h, &curve, p.liner_thickness))?;
            let tip = [outer[0] + p.wing[0] * outward, outer[1] - p.wing[1]];
            liner.draw_segment(outer, tip, p.wing_thickness);

            let half = lid.len() / 2;
            let outer_half = if outward > 0.0 { &lid[half..] } else { &lid[..half] };
            for index in sample_indices(outer_half.len(), p.lash_count) {
                let root = to_f32(outer_half[index]);
                let end = [root[0] + p.lash_slant * outward, root[1] - p.lash_length];
                lashes.draw_segment(root, end, 1.0);
            }
            drawn = true;
        }

        if !drawn {
            return Ok(None);
        }
        let layer = recolor(image, &liner, rgb(p.liner_color), 1.0)?;
        let layer = recolor(&layer, &lashes, rgb(p.lash_color), 1.0)?;
        Ok(Some(add_weighted(image, 1.0 - p.makeup_opacity, &layer, p.makeup_opacity, 0.0)?))
    }

    fn enlarge(&self, image: &RgbImage, points: &[[i32; 2]]) -> StageResult<RgbImage> {
        let p = &self.params;
        let roi = landmark_extent(points, "eye")?
            .padded_within(p.padding, image.width(), image.height())
            .ok_or_else(|| StageError::degenerate("eye lies off the image"))?;
        let new_w = (roi.width as f32 * p.scale) as u32;
        let new_h = (roi.height as f32 * p.scale) as u32;
        if new_w < 2 || new_h < 2 {
            return Err(StageError::degenerate("eye crop too small"));
        }

        let enlarged = resize_rgb(&crop_rgb(image, roi), new_w, new_h);
        let half = [new_w as i32 / 2, new_h as i32 / 2];
        let mask = RegionMask::from_ellipse(new_w, new_h, half, half)
            .soften_sigma(p.mask_blur_radius, p.mask_blur_sigma);
        Ok(paste_centered(image, &enlarged, &mask, roi.center())?)
    }
}

/// `count` evenly spaced indices into a slice of `len`, truncated like an
/// integer linspace
fn sample_indices(len: usize, count: usize) -> Vec<usize> {
    match (len, count) {
        (0, _) | (_, 0) => Vec::new(),
        (_, 1) => vec![0],
        _ => (0..count).map(|i| i * (len - 1) / (count - 1)).collect(),
    }
}

impl Stage for EyeStage {
    fn kind(&self) -> StageKind {
        StageKind::Eyes
    }

    fn apply(&self, image: &RgbImage, landmarks: &LandmarkSet) -> StageResult<RgbImage> {
        let made_up = self.makeup(image, landmarks)?;
        let base = made_up.clone().unwrap_or_else(|| image.clone());

        match apply_per_side(base, SIDES.len(), "eye", |current, side| {
            self.enlarge(current, &landmarks.region(SIDES[side].0))
        }) {
            Err(e) if e.is_recoverable() => made_up.ok_or(e),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use face_common::synthetic;
    use image::Rgb;

    fn darkest(image: &RgbImage, x: std::ops::Range<u32>, y: std::ops::Range<u32>) -> u8 {
        y.flat_map(|y| x.clone().map(move |x| (x, y)))
            .map(|(x, y)| image.get_pixel(x, y)[0])
            .min()
            .unwrap()
    }

    #[test]
    fn test_upper_lid_is_sorted_and_above_centre() {
        let landmarks = synthetic::face(400, 400);
        let eye = landmarks.region(Region::LeftEye);
        let lid = EyeStage::upper_lid(&eye);
        assert!(lid.len() > 2);
        assert!(lid.windows(2).all(|w| w[0][0] <= w[1][0]));
        let max_y = eye.iter().map(|p| p[1]).max().unwrap();
        assert!(lid.iter().all(|p| p[1] < max_y));
    }

    #[test]
    fn test_sample_indices_span_the_slice() {
        assert_eq!(sample_indices(4, 5), vec![0, 0, 1, 2, 3]);
        assert_eq!(sample_indices(9, 5), vec![0, 2, 4, 6, 8]);
        assert!(sample_indices(0, 5).is_empty());
    }

    #[test]
    fn test_wing_points_outwards() {
        let image = RgbImage::from_pixel(400, 400, Rgb([200, 200, 200]));
        let landmarks = synthetic::face(400, 400);
        let out = EyeStage::new(EyeParams::default()).apply(&image, &landmarks).unwrap();

        let left = landmarks.region(Region::LeftEye);
        let outer = left.iter().max_by_key(|p| p[0]).unwrap();
        let (x, y) = (outer[0] as u32, outer[1] as u32);
        assert!(darkest(&out, x + 4..x + 12, y - 9..y + 1) < 160);

        let right = landmarks.region(Region::RightEye);
        let outer = right.iter().min_by_key(|p| p[0]).unwrap();
        let (x, y) = (outer[0] as u32, outer[1] as u32);
        assert!(darkest(&out, x - 12..x - 4, y - 9..y + 1) < 160);

        assert_eq!(out.get_pixel(200, 390), image.get_pixel(200, 390));
    }

    #[test]
    fn test_collapsed_eyes_are_degenerate() {
        let err = EyeStage::new(EyeParams::default())
            .apply(&RgbImage::new(40, 40), &synthetic::collapsed(40, 40))
            .unwrap_err();
        assert!(err.is_recoverable());
    }
}
