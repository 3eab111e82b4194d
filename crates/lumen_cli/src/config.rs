//! Render configuration file and command line overrides.

use std::path::Path;

use anyhow::{Context, Result};
use lumen_renderer::{CameraConfig, RenderConfig, SceneKind, ShadingMode};
use serde::{Deserialize, Serialize};

use crate::cli::Args;

/// Everything needed for one render. Missing sections fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub render: RenderConfig,
    pub camera: CameraConfig,
    pub scene: SceneKind,
}

impl Config {
    /// Load a config from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Apply command line values on top of the file.
    pub fn apply_args(&mut self, args: &Args) {
        let render = &mut self.render;
        if let Some(width) = args.width {
            render.width = width;
        }
        if let Some(height) = args.height {
            render.height = height;
        }
        if let Some(samples) = args.samples {
            render.samples_per_pixel = samples;
        }
        if let Some(depth) = args.depth {
            render.max_depth = depth;
        }
        if let Some(seed) = args.seed {
            render.seed = seed;
        }
        if args.time_limit.is_some() {
            render.time_limit_secs = args.time_limit;
        }
        if args.normals {
            render.shading = ShadingMode::Normals;
        }
        if let Some(scene) = args.scene {
            self.scene = scene;
        }
    }
}
