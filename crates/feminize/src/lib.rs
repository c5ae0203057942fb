//! # Feminize - Landmark-Driven Face Feminization
//!
//! Ten feature stages threaded through a fixed-order pipeline. Each stage
//! reads the detected landmark set and the current image and produces a new
//! image of the same size; shape is sculpted first, texture cleaned second,
//! features painted third and the hair composited last.
//!
//! ## Example
//!
//! ```rust,no_run
//! use face_common::JsonLandmarkProvider;
//! use feminize::{Feminizer, Pipeline};
//!
//! let pipeline = Pipeline::builder()
//!     .with_hair_asset_path("assets/hairstyle.jpg")
//!     .build()?;
//! let mut feminizer = Feminizer::new(JsonLandmarkProvider::new("face.json"), pipeline);
//!
//! let transformation = feminizer.transform_path("face.jpg")?;
//! transformation.result.save("result.png").map_err(feminize::FeminizeError::Output)?;
//! # Ok::<(), feminize::FeminizeError>(())
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod session;
pub mod stage;
pub mod stages;

use std::path::Path;

use face_common::{LandmarkProvider, LandmarkSet};
use image::RgbImage;
use tracing::info;

// Re-exports for convenience
pub use config::*;
pub use error::{ErrorKind, FeminizeError, Result, StageError, StageResult};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use session::{EditCommand, EditSession, SessionState};
pub use stage::{Phase, Stage, StageKind};

/// Input and output of one run
#[derive(Debug, Clone)]
pub struct Transformation {
    pub original: RgbImage,
    pub result: RgbImage,
    /// Landmarks detected on `original`, shared by every stage
    pub landmarks: LandmarkSet,
}

/// Detects landmarks once and runs the pipeline on them
pub struct Feminizer<P: LandmarkProvider> {
    provider: P,
    pipeline: Pipeline,
}

impl<P: LandmarkProvider> Feminizer<P> {
    pub fn new(provider: P, pipeline: Pipeline) -> Self {
        Self { provider, pipeline }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn transform(&mut self, image: RgbImage) -> Result<Transformation> {
        let landmarks = self
            .provider
            .detect(&image)?
            .ok_or(FeminizeError::NoFaceDetected)?;
        info!("Landmarks detected on {}x{} image", image.width(), image.height());

        let result = self.pipeline.run(&image, &landmarks)?;
        Ok(Transformation { original: image, result, landmarks })
    }

    /// [`Feminizer::transform`] on an image file
    pub fn transform_path<Q: AsRef<Path>>(&mut self, path: Q) -> Result<Transformation> {
        let image = image::open(path.as_ref()).map_err(FeminizeError::Input)?;
        self.transform(image.to_rgb8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use face_common::{synthetic, LandmarkError, Region};
    use image::Rgb;
    use mask::RegionMask;

    enum Detection {
        Face(LandmarkSet),
        Nothing,
        Broken,
    }

    struct FixedProvider {
        detection: Detection,
        calls: usize,
    }

    impl FixedProvider {
        fn new(detection: Detection) -> Self {
            Self { detection, calls: 0 }
        }
    }

    impl LandmarkProvider for FixedProvider {
        fn detect(&mut self, _: &RgbImage) -> face_common::Result<Option<LandmarkSet>> {
            self.calls += 1;
            match &self.detection {
                Detection::Face(set) => Ok(Some(set.clone())),
                Detection::Nothing => Ok(None),
                Detection::Broken => Err(LandmarkError::InvalidPayload { message: "truncated".into() }),
            }
        }
    }

    fn portrait(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            let n = ((x * 31 + y * 17) % 13) as u8;
            Rgb([170 + n, 130 + n, 110 + n])
        })
    }

    /// Saturated red hair over the top half of a grey card
    fn hairstyle() -> RgbImage {
        RgbImage::from_fn(120, 120, |x, y| {
            if y < 60 && (10..110).contains(&x) { Rgb([200, 40, 40]) } else { Rgb([235, 235, 235]) }
        })
    }

    fn feminizer(detection: Detection) -> Feminizer<FixedProvider> {
        let pipeline = Pipeline::builder().build().expect("Should build");
        Feminizer::new(FixedProvider::new(detection), pipeline)
    }

    fn feminizer_with_hair(detection: Detection) -> Feminizer<FixedProvider> {
        let pipeline = Pipeline::builder()
            .with_hair_asset(hairstyle())
            .build()
            .expect("Should build");
        Feminizer::new(FixedProvider::new(detection), pipeline)
    }

    #[test]
    fn test_full_run_is_deterministic_and_keeps_size() {
        let landmarks = synthetic::face(240, 260);
        let mut feminizer = feminizer(Detection::Face(landmarks));

        let first = feminizer.transform(portrait(240, 260)).expect("Should transform");
        let second = feminizer.transform(portrait(240, 260)).expect("Should transform");
        assert_eq!(first.result.dimensions(), (240, 260));
        assert_eq!(first.result, second.result);
        assert_ne!(first.result, first.original);
    }

    #[test]
    fn test_collapsed_landmarks_leave_image_unchanged() {
        let mut feminizer = feminizer(Detection::Face(synthetic::collapsed(120, 120)));
        let out = feminizer.transform(portrait(120, 120)).expect("Degenerate input should not fail");
        assert_eq!(out.result, out.original);
    }

    #[test]
    fn test_full_run_with_hairstyle_is_deterministic_and_keeps_size() {
        let landmarks = synthetic::face(240, 260);
        let mut feminizer = feminizer_with_hair(Detection::Face(landmarks.clone()));

        let first = feminizer.transform(portrait(240, 260)).expect("Should transform");
        let second = feminizer.transform(portrait(240, 260)).expect("Should transform");
        assert_eq!(first.result.dimensions(), (240, 260));
        assert_eq!(first.result, second.result);

        // hair actually ran: a run without the asset ends differently
        let bare = self::feminizer(Detection::Face(landmarks))
            .transform(portrait(240, 260))
            .expect("Should transform");
        assert_ne!(first.result, bare.result);
    }

    #[test]
    fn test_collapsed_landmarks_with_hairstyle_leave_image_unchanged() {
        let mut feminizer = feminizer_with_hair(Detection::Face(synthetic::collapsed(120, 120)));
        let out = feminizer.transform(portrait(120, 120)).expect("Degenerate input should not fail");
        assert_eq!(out.result, out.original);
    }

    #[test]
    fn test_no_face_is_reported_before_any_stage() {
        let mut feminizer = feminizer(Detection::Nothing);
        let err = feminizer.transform(portrait(50, 50)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoFaceDetected);
        assert_eq!(feminizer.provider.calls, 1);
    }

    #[test]
    fn test_provider_failure_is_a_landmark_error() {
        let mut feminizer = feminizer(Detection::Broken);
        let err = feminizer.transform(portrait(50, 50)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Landmarks);
    }

    #[test]
    fn test_unreadable_input_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image").unwrap();

        let mut feminizer = feminizer(Detection::Nothing);
        let err = feminizer.transform_path(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);
        assert_eq!(feminizer.provider.calls, 0);
    }

    #[test]
    fn test_jaw_applied_twice_keeps_narrowing() {
        let landmarks = synthetic::face(400, 400);
        let oval = RegionMask::polygon_region(400, 400, &landmarks.region(Region::FaceOval));
        let image = RgbImage::from_fn(400, 400, |x, y| {
            if oval.value(x, y) > 0.0 { Rgb([210, 170, 150]) } else { Rgb([30, 40, 60]) }
        });
        let face_width = |img: &RgbImage, y: u32| (0..400).filter(|&x| img.get_pixel(x, y)[0] > 120).count();
        let row = landmarks.point(172)[1] as u32;

        let pipeline = Pipeline::builder().build().unwrap();
        let once = pipeline.run_stage(StageKind::Jaw, &image, &landmarks).unwrap();
        let twice = pipeline.run_stage(StageKind::Jaw, &once, &landmarks).unwrap();

        let (w0, w1, w2) = (face_width(&image, row), face_width(&once, row), face_width(&twice, row));
        assert!(w1 < w0, "{w1} should be narrower than {w0}");
        assert!(w2 < w1, "{w2} should be narrower than {w1}");
    }
}
