pub mod builder;

use std::time::Instant;

use face_common::LandmarkSet;
use image::RgbImage;
use tracing::{info, warn};

use crate::{
    config::FeminizeConfig,
    error::{FeminizeError, Result, StageError},
    stage::{Stage, StageKind},
};

pub use builder::PipelineBuilder;

/// The ten feature stages in their fixed order.
///
/// Every stage sees the landmark set as it was detected on the input image;
/// nothing is re-detected between stages. A stage that reports degenerate
/// geometry leaves the image as it found it and the run carries on; any
/// other failure aborts the run and names the stage.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
    config: FeminizeConfig,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Stages must already be in `StageKind` order
    pub(crate) fn new(stages: Vec<Box<dyn Stage>>, config: FeminizeConfig) -> Self {
        Self { stages, config }
    }

    pub fn config(&self) -> &FeminizeConfig {
        &self.config
    }

    /// Stages a full run executes, in order
    pub fn enabled(&self) -> Vec<StageKind> {
        self.stages
            .iter()
            .map(|stage| stage.kind())
            .filter(|kind| self.config.is_enabled(*kind))
            .collect()
    }

    /// Thread the image through every enabled stage
    pub fn run(&self, image: &RgbImage, landmarks: &LandmarkSet) -> Result<RgbImage> {
        let started = Instant::now();
        let mut current = image.clone();
        for stage in &self.stages {
            if !self.config.is_enabled(stage.kind()) {
                info!("Stage {} disabled", stage.kind());
                continue;
            }
            current = Self::isolate(stage.as_ref(), &current, landmarks)?;
        }
        info!("Pipeline finished in {:?}", started.elapsed());
        Ok(current)
    }

    /// Run a single stage with the same failure isolation as a full run.
    /// Disabled stages still run when asked for by name.
    pub fn run_stage(&self, kind: StageKind, image: &RgbImage, landmarks: &LandmarkSet) -> Result<RgbImage> {
        let stage = self
            .stages
            .iter()
            .find(|stage| stage.kind() == kind)
            .ok_or_else(|| FeminizeError::Config(format!("stage '{kind}' is not part of this pipeline")))?;
        Self::isolate(stage.as_ref(), image, landmarks)
    }

    fn isolate(stage: &dyn Stage, image: &RgbImage, landmarks: &LandmarkSet) -> Result<RgbImage> {
        let kind = stage.kind();
        let started = Instant::now();
        info!("Stage {} started", kind);

        let outcome = stage.apply(image, landmarks).and_then(|out| {
            if out.dimensions() != image.dimensions() {
                return Err(StageError::Dimensions {
                    expected: image.dimensions(),
                    actual: out.dimensions(),
                });
            }
            Ok(out)
        });

        match outcome {
            Ok(out) => {
                info!("Stage {} finished in {:?}", kind, started.elapsed());
                Ok(out)
            }
            Err(e) if e.is_recoverable() => {
                warn!("Stage {} left the image unchanged: {}", kind, e);
                Ok(image.clone())
            }
            Err(source) => Err(FeminizeError::Stage { stage: kind, source }),
        }
    }

    /// Get information about the pipeline configuration
    pub fn info(&self) -> String {
        let enabled = self.enabled();
        let names: Vec<&'static str> = enabled.iter().map(|kind| (*kind).into()).collect();
        format!(
            "Pipeline: {} of {} stages enabled ({})",
            enabled.len(),
            self.stages.len(),
            names.join(" -> ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use face_common::synthetic;
    use image::Rgb;
    use mask::MaskError;
    use std::sync::{Arc, Mutex};

    enum Behaviour {
        Tint(u8),
        Degenerate,
        OffCanvas,
        Broken,
        Resize,
    }

    struct FakeStage {
        kind: StageKind,
        behaviour: Behaviour,
        log: Arc<Mutex<Vec<StageKind>>>,
    }

    impl Stage for FakeStage {
        fn kind(&self) -> StageKind {
            self.kind
        }

        fn apply(&self, image: &RgbImage, _: &LandmarkSet) -> crate::error::StageResult<RgbImage> {
            self.log.lock().unwrap().push(self.kind);
            match self.behaviour {
                Behaviour::Tint(v) => Ok(RgbImage::from_pixel(image.width(), image.height(), Rgb([v, v, v]))),
                Behaviour::Degenerate => Err(StageError::degenerate("nothing to do")),
                Behaviour::OffCanvas => Err(MaskError::PatchOutOfBounds { x: -500, y: 0, width: 10, height: 10 }.into()),
                Behaviour::Broken => Err(MaskError::ImageProcessing("solver diverged".into()).into()),
                Behaviour::Resize => Ok(RgbImage::new(1, 1)),
            }
        }
    }

    fn pipeline(stages: Vec<(StageKind, Behaviour)>, config: FeminizeConfig) -> (Pipeline, Arc<Mutex<Vec<StageKind>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let stages = stages
            .into_iter()
            .map(|(kind, behaviour)| Box::new(FakeStage { kind, behaviour, log: log.clone() }) as Box<dyn Stage>)
            .collect();
        (Pipeline::new(stages, config), log)
    }

    #[test]
    fn test_degenerate_stages_pass_the_image_through() {
        let (pipeline, log) = pipeline(
            vec![
                (StageKind::Nose, Behaviour::Tint(10)),
                (StageKind::Jaw, Behaviour::Degenerate),
                (StageKind::Chin, Behaviour::OffCanvas),
            ],
            FeminizeConfig::default(),
        );
        let out = pipeline
            .run(&RgbImage::new(8, 8), &synthetic::collapsed(8, 8))
            .expect("Degenerate stages should not fail the run");
        assert_eq!(*out.get_pixel(3, 3), Rgb([10, 10, 10]));
        assert_eq!(*log.lock().unwrap(), vec![StageKind::Nose, StageKind::Jaw, StageKind::Chin]);
    }

    #[test]
    fn test_unrecoverable_error_names_the_stage_and_stops() {
        let (pipeline, log) = pipeline(
            vec![
                (StageKind::Beard, Behaviour::Broken),
                (StageKind::Skin, Behaviour::Tint(1)),
            ],
            FeminizeConfig::default(),
        );
        let err = pipeline.run(&RgbImage::new(8, 8), &synthetic::collapsed(8, 8)).unwrap_err();
        assert_eq!(err.stage(), Some(StageKind::Beard));
        assert_eq!(*log.lock().unwrap(), vec![StageKind::Beard]);
    }

    #[test]
    fn test_resized_output_is_rejected() {
        let (pipeline, _) = pipeline(vec![(StageKind::Lips, Behaviour::Resize)], FeminizeConfig::default());
        let err = pipeline.run(&RgbImage::new(8, 8), &synthetic::collapsed(8, 8)).unwrap_err();
        assert!(matches!(
            err,
            FeminizeError::Stage { stage: StageKind::Lips, source: StageError::Dimensions { .. } }
        ));
    }

    #[test]
    fn test_disabled_stages_are_skipped_but_runnable_by_name() {
        let config = FeminizeConfig { disabled: vec![StageKind::Eyes], ..FeminizeConfig::default() };
        let (pipeline, log) = pipeline(
            vec![
                (StageKind::Eyes, Behaviour::Tint(50)),
                (StageKind::Brows, Behaviour::Tint(60)),
            ],
            config,
        );
        let image = RgbImage::new(4, 4);
        let landmarks = synthetic::collapsed(4, 4);

        assert_eq!(pipeline.enabled(), vec![StageKind::Brows]);
        let out = pipeline.run(&image, &landmarks).unwrap();
        assert_eq!(out.get_pixel(0, 0)[0], 60);
        assert_eq!(*log.lock().unwrap(), vec![StageKind::Brows]);

        let out = pipeline.run_stage(StageKind::Eyes, &image, &landmarks).unwrap();
        assert_eq!(out.get_pixel(0, 0)[0], 50);
        assert!(pipeline.run_stage(StageKind::Hair, &image, &landmarks).is_err());
        assert!(pipeline.info().contains("1 of 2"));
    }
}
