use face_common::{landmark, LandmarkSet, PixelRect, Region};
use image::{Rgb, RgbImage};
use mask::{
    bilateral_smooth,
    composite::{add_weighted, blend, mean_color, solid},
    RegionMask,
};
use tracing::debug;

use crate::{
    config::BeardParams,
    error::{StageError, StageResult},
    stage::{Stage, StageKind},
    stages::rgb,
};

/// Removes beard and moustache shadow by smoothing the lower face and
/// pulling it toward the skin tone sampled from the forehead and cheeks
pub struct BeardStage {
    params: BeardParams,
}

impl BeardStage {
    pub fn new(params: BeardParams) -> Self {
        Self { params }
    }

    /// Moustache, chin/jaw and sideburn areas, minus a grown nose and lip halo
    fn beard_mask(&self, width: u32, height: u32, landmarks: &LandmarkSet) -> StageResult<RegionMask> {
        let mut moustache: Vec<[i32; 2]> = landmarks
            .region(Region::MoustacheTop)
            .into_iter()
            .map(|[x, y]| [x, y + self.params.nose_offset])
            .collect();
        moustache.extend(landmarks.region(Region::MoustacheLipTop).into_iter().rev());

        let mut chin = landmarks.region(Region::JawContour);
        chin.extend(landmarks.region(Region::LipsLower).into_iter().rev());

        let mut include = RegionMask::convex_region(width, height, &moustache);
        for area in [
            RegionMask::convex_region(width, height, &chin),
            RegionMask::convex_region(width, height, &landmarks.region(Region::SideburnLeft)),
            RegionMask::convex_region(width, height, &landmarks.region(Region::SideburnRight)),
        ] {
            include = include.union(&area)?;
        }

        let exclude = RegionMask::polygon_region(width, height, &landmarks.region(Region::LipsOuter))
            .union(&RegionMask::convex_region(width, height, &landmarks.region(Region::NoseWide)))?
            .grow(self.params.exclusion_radius, 1);

        Ok(include.subtract(&exclude)?.open(self.params.cleanup_radius, 1))
    }

    /// Average of the mean colours of the forehead and both cheek patches
    fn skin_tone(&self, image: &RgbImage, landmarks: &LandmarkSet) -> Rgb<u8> {
        let patches = [
            (landmark::FOREHEAD, 10),
            (landmark::LEFT_CHEEK_CENTER, 15),
            (landmark::RIGHT_CHEEK_CENTER, 15),
        ];
        let means: Vec<[f32; 3]> = patches
            .iter()
            .filter_map(|&(index, half)| {
                let [x, y] = landmarks.point(index);
                mean_color(image, PixelRect::new(x - half, y - half, 2 * half, 2 * half))
            })
            .collect();
        if means.is_empty() {
            return rgb(self.params.fallback_skin);
        }
        let channel = |c: usize| (means.iter().map(|m| m[c]).sum::<f32>() / means.len() as f32) as u8;
        Rgb([channel(0), channel(1), channel(2)])
    }
}

impl Stage for BeardStage {
    fn kind(&self) -> StageKind {
        StageKind::Beard
    }

    fn apply(&self, image: &RgbImage, landmarks: &LandmarkSet) -> StageResult<RgbImage> {
        let p = &self.params;
        let (w, h) = image.dimensions();
        let beard = self.beard_mask(w, h, landmarks)?;
        let Some(roi) = beard.bounding_box(p.padding) else {
            return Err(StageError::degenerate("beard area is empty"));
        };
        let skin = self.skin_tone(image, landmarks);
        debug!("Beard area {:?}, skin tone {:?}", roi, skin);

        let mut smoothed = image.clone();
        for _ in 0..p.smoothing_passes {
            smoothed = bilateral_smooth(&smoothed, p.smoothing_radius, p.smoothing_sigma, p.smoothing_sigma, Some(roi));
        }
        let toned = add_weighted(&smoothed, 1.0 - p.skin_weight, &solid(w, h, skin), p.skin_weight, 0.0)?;

        let mut soft = beard.soften_sigma(p.blur_radius, p.blur_sigma);
        // nothing outside the padded area may change
        let full = PixelRect::new(0, 0, w as i32, h as i32);
        for band in outside(full, roi) {
            soft.clear_rect(band);
        }
        Ok(blend(&toned, image, &soft)?)
    }
}

/// The up to four bands of `full` around `inner`
fn outside(full: PixelRect, inner: PixelRect) -> [PixelRect; 4] {
    [
        PixelRect::new(full.x, full.y, full.width, inner.y - full.y),
        PixelRect::new(full.x, inner.bottom(), full.width, full.bottom() - inner.bottom()),
        PixelRect::new(full.x, inner.y, inner.x - full.x, inner.height),
        PixelRect::new(inner.right(), inner.y, full.right() - inner.right(), inner.height),
    ]
}
