//! Interactive editing: stages applied one at a time to a working copy, with
//! reset to the original and export of the current state.

use std::path::PathBuf;

use face_common::LandmarkSet;
use image::RgbImage;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr, VariantNames};
use tracing::info;

use crate::{
    error::{FeminizeError, Result},
    pipeline::Pipeline,
    stage::StageKind,
};

#[derive(
    Debug, Clone,
    Serialize, Deserialize, JsonSchema,
    Display, VariantNames, IntoStaticStr,
    PartialEq
)]
#[serde(tag = "type", content = "params")]
#[strum(serialize_all = "snake_case")]
pub enum EditCommand {
    /// Run one stage on the current image
    #[serde(rename = "apply")]
    Apply { stage: StageKind },

    /// Run every enabled stage on the current image
    #[serde(rename = "apply_all")]
    ApplyAll,

    /// Go back to the original image
    #[serde(rename = "reset")]
    Reset,

    /// Write the current image to disk
    #[serde(rename = "export")]
    Export { path: PathBuf },
}

impl EditCommand {
    /// Get the JSON schema for all commands
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(EditCommand)
    }

    /// Get a list of all available command names
    pub fn command_names() -> &'static [&'static str] {
        <Self as VariantNames>::VARIANTS
    }

    /// Get a description of the command
    pub fn description(&self) -> &'static str {
        match self {
            Self::Apply { .. } => "Apply a single feature stage to the current image",
            Self::ApplyAll => "Apply every enabled stage, in pipeline order, to the current image",
            Self::Reset => "Discard all edits and return to the original image",
            Self::Export { .. } => "Save the current image; the format follows the file extension",
        }
    }

    /// Get parameter requirements for the command
    pub fn parameters_info(&self) -> Vec<(&'static str, &'static str, bool)> {
        match self {
            Self::Apply { .. } => vec![("stage", "Stage name, e.g. \"jaw\" or \"lips\"", true)],
            Self::ApplyAll => vec![],
            Self::Reset => vec![],
            Self::Export { .. } => vec![("path", "Output file path (.png, .jpg)", true)],
        }
    }
}

/// Outcome of one command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SessionState {
    /// Stages applied since the last reset, in order
    pub history: Vec<StageKind>,
    /// Set by `Export`
    pub exported: Option<PathBuf>,
}

/// Editing state over one photograph
pub struct EditSession {
    original: RgbImage,
    current: RgbImage,
    landmarks: LandmarkSet,
    pipeline: Pipeline,
    history: Vec<StageKind>,
}

impl EditSession {
    pub fn new(image: RgbImage, landmarks: LandmarkSet, pipeline: Pipeline) -> Self {
        Self {
            current: image.clone(),
            original: image,
            landmarks,
            pipeline,
            history: Vec::new(),
        }
    }

    pub fn execute(&mut self, command: EditCommand) -> Result<SessionState> {
        info!("Edit command: {}", command);
        let mut exported = None;
        match command {
            EditCommand::Apply { stage } => {
                self.current = self.pipeline.run_stage(stage, &self.current, &self.landmarks)?;
                self.history.push(stage);
            }
            EditCommand::ApplyAll => {
                self.current = self.pipeline.run(&self.current, &self.landmarks)?;
                self.history.extend(self.pipeline.enabled());
            }
            EditCommand::Reset => {
                self.current = self.original.clone();
                self.history.clear();
            }
            EditCommand::Export { path } => {
                self.current.save(&path).map_err(FeminizeError::Output)?;
                exported = Some(path);
            }
        }
        Ok(SessionState {
            history: self.history.clone(),
            exported,
        })
    }

    pub fn current(&self) -> &RgbImage {
        &self.current
    }

    pub fn original(&self) -> &RgbImage {
        &self.original
    }

    pub fn history(&self) -> &[StageKind] {
        &self.history
    }

    pub fn landmarks(&self) -> &LandmarkSet {
        &self.landmarks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PipelineBuilder;
    use face_common::synthetic;
    use image::Rgb;

    fn session() -> EditSession {
        let image = RgbImage::from_fn(200, 200, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 120]));
        let pipeline = PipelineBuilder::new().build().expect("Should build");
        EditSession::new(image, synthetic::face(200, 200), pipeline)
    }

    #[test]
    fn test_command_json_shape() {
        let command: EditCommand =
            serde_json::from_str(r#"{ "type": "apply", "params": { "stage": "lips" } }"#).expect("Should parse");
        assert_eq!(command, EditCommand::Apply { stage: StageKind::Lips });
        let reset: EditCommand = serde_json::from_str(r#"{ "type": "reset" }"#).expect("Should parse");
        assert_eq!(reset, EditCommand::Reset);
        assert!(EditCommand::command_names().contains(&"apply_all"));
        assert_eq!(reset.parameters_info().len(), 0);
    }

    #[test]
    fn test_apply_then_reset() {
        let mut session = session();
        let state = session.execute(EditCommand::Apply { stage: StageKind::Lips }).unwrap();
        assert_eq!(state.history, vec![StageKind::Lips]);
        assert_ne!(session.current(), session.original());

        let state = session.execute(EditCommand::Reset).unwrap();
        assert!(state.history.is_empty());
        assert_eq!(session.current(), session.original());
    }

    #[test]
    fn test_export_writes_current_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("current.png");
        let mut session = session();
        session.execute(EditCommand::Apply { stage: StageKind::Cheeks }).unwrap();
        let state = session.execute(EditCommand::Export { path: path.clone() }).unwrap();

        assert_eq!(state.exported.as_deref(), Some(path.as_path()));
        let written = image::open(&path).unwrap().to_rgb8();
        assert_eq!(&written, session.current());
    }

    #[test]
    fn test_export_to_unknown_format_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session();
        let err = session
            .execute(EditCommand::Export { path: dir.path().join("current.xyz") })
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Output);
    }
}
