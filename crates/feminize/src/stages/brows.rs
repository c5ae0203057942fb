use face_common::{LandmarkSet, Region};
use image::RgbImage;
use mask::{
    composite::{add_weighted, recolor},
    fill_region, RegionMask,
};

use crate::{
    config::BrowParams,
    error::{StageError, StageResult},
    stage::{Stage, StageKind},
    stages::{apply_per_side, landmark_extent, rgb},
};

/// Which end of the brow sits next to the nose. The subject's left brow is
/// on the image right, so its nose end is the one with the smaller x.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NoseEnd {
    Start,
    End,
}

const SIDES: [(Region, NoseEnd); 2] = [(Region::LeftBrow, NoseEnd::Start), (Region::RightBrow, NoseEnd::End)];

/// Erases each brow and redraws a thinner, arched one that tapers away
/// from the nose
pub struct BrowStage {
    params: BrowParams,
}

impl BrowStage {
    pub fn new(params: BrowParams) -> Self {
        Self { params }
    }

    /// Quadratic Bezier through the lifted brow ends with its control point
    /// above the arch peak
    fn arch(&self, points: &[[i32; 2]], nose: NoseEnd) -> Option<Vec<[f32; 2]>> {
        let p = &self.params;
        let mut sorted = points.to_vec();
        sorted.sort_by_key(|p| p[0]);
        let (first, last) = (*sorted.first()?, *sorted.last()?);
        let width = last[0] - first[0];
        if width <= 0 {
            return None;
        }

        // peak sits on the outer third
        let peak_x = match nose {
            NoseEnd::Start => first[0] + 2 * width / 3,
            NoseEnd::End => first[0] + width / 3,
        };
        let lift = (width as f32 * p.arch_lift) as i32;
        let peak_y = (first[1] + last[1]) / 2 - lift;
        let start = [first[0] as f32, (first[1] - p.end_lift) as f32];
        let end = [last[0] as f32, (last[1] - p.end_lift) as f32];
        let control = [peak_x as f32, (peak_y - lift / 2) as f32];

        let steps = p.curve_steps.max(2);
        let curve = (0..steps)
            .map(|i| {
                let t = i as f32 / (steps - 1) as f32;
                let u = 1.0 - t;
                let x = u * u * start[0] + 2.0 * u * t * control[0] + t * t * end[0];
                let y = u * u * start[1] + 2.0 * u * t * control[1] + t * t * end[1];
                [x.trunc(), y.trunc()]
            })
            .collect();
        Some(curve)
    }

    fn thickness(&self, segment: usize, steps: usize, nose: NoseEnd) -> f32 {
        let progress = segment as f32 / steps as f32;
        let taper = match nose {
            NoseEnd::Start => 1.0 - progress,
            NoseEnd::End => progress,
        };
        (self.params.base_thickness * taper).trunc().max(self.params.min_thickness)
    }

    fn redraw(&self, image: &RgbImage, points: &[[i32; 2]], nose: NoseEnd) -> StageResult<RgbImage> {
        let p = &self.params;
        let (w, h) = image.dimensions();
        landmark_extent(points, "brow")?;
        let curve = self
            .arch(points, nose)
            .ok_or_else(|| StageError::degenerate("brow has no width"))?;

        let hair = RegionMask::convex_region(w, h, points).grow(p.erase_radius, p.erase_iterations);
        if hair.is_empty() {
            return Err(StageError::degenerate("brow lies off the image"));
        }
        let erased = fill_region(image, &hair)?;

        let mut stroke = RegionMask::empty(w, h);
        for (i, pair) in curve.windows(2).enumerate() {
            stroke.draw_segment(pair[0], pair[1], self.thickness(i, curve.len(), nose));
        }
        let overlay = recolor(&erased, &stroke, rgb(p.color), 1.0)?;
        Ok(add_weighted(&overlay, p.opacity, &erased, 1.0 - p.opacity, 0.0)?)
    }
}

impl Stage for BrowStage {
    fn kind(&self) -> StageKind {
        StageKind::Brows
    }

    fn apply(&self, image: &RgbImage, landmarks: &LandmarkSet) -> StageResult<RgbImage> {
        apply_per_side(image.clone(), SIDES.len(), "brow", |current, side| {
            let (region, nose) = SIDES[side];
            self.redraw(current, &landmarks.region(region), nose)
        })
    }
}
