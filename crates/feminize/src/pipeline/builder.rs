use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use image::RgbImage;
use strum::IntoEnumIterator;
use tracing::debug;

use crate::{
    config::FeminizeConfig,
    error::{FeminizeError, Result},
    pipeline::Pipeline,
    stage::StageKind,
    stages::build_stage,
};

/// Builder for the feminization pipeline.
///
/// Stage order is not configurable: every stage is instantiated in
/// [`StageKind`] order and the builder only decides parameters, which stages
/// a full run skips, and where the hairstyle comes from.
pub struct PipelineBuilder {
    config: FeminizeConfig,
    hair_asset: Option<Arc<RgbImage>>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            config: FeminizeConfig::default(),
            hair_asset: None,
        }
    }

    /// Replace all stage parameters
    pub fn with_config(mut self, config: FeminizeConfig) -> Self {
        self.config = config;
        self
    }

    /// Skip a stage in full runs
    pub fn disable(mut self, kind: StageKind) -> Self {
        if !self.config.disabled.contains(&kind) {
            self.config.disabled.push(kind);
        }
        self
    }

    /// Use an already decoded hairstyle
    pub fn with_hair_asset(mut self, asset: RgbImage) -> Self {
        self.hair_asset = Some(Arc::new(asset));
        self
    }

    /// Load the hairstyle from disk when the pipeline is built
    pub fn with_hair_asset_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.hair.asset = Some(path.as_ref().to_path_buf());
        self.hair_asset = None;
        self
    }

    fn load_asset(path: &PathBuf) -> Result<Arc<RgbImage>> {
        debug!("Loading hairstyle asset {}", path.display());
        let asset = image::open(path).map_err(|source| FeminizeError::Asset {
            path: path.clone(),
            source,
        })?;
        Ok(Arc::new(asset.to_rgb8()))
    }

    /// Instantiate every stage. Fails only if a configured hairstyle asset
    /// cannot be decoded.
    pub fn build(self) -> Result<Pipeline> {
        let hair_asset = match (self.hair_asset, &self.config.hair.asset) {
            (Some(asset), _) => Some(asset),
            (None, Some(path)) => Some(Self::load_asset(path)?),
            (None, None) => None,
        };
        let stages = StageKind::iter()
            .map(|kind| build_stage(kind, &self.config, hair_asset.clone()))
            .collect();
        Ok(Pipeline::new(stages, self.config))
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
