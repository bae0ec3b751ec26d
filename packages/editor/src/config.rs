use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::raycast::RaycastConfig;
use crate::EditorError;

pub const DEFAULT_CONFIG_NAME: &str = "canvas.config.json";

/// Editor tuning knobs, loaded from JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Maximum undo levels (0 = unlimited)
    pub history_limit: usize,

    /// Window in which consecutive updates of one gesture share an undo step
    pub merge_timeout_ms: u64,

    /// Minimum interval between hover raycasts
    pub hover_throttle_ms: u64,

    /// Step used when quantizing rotation
    pub rotation_snap_degrees: f64,

    /// Quantize rotation without holding the modifier
    pub snap_rotation: bool,

    /// Maximum difference between gaps still considered uniform
    pub gap_tolerance: f64,

    pub raycast: RaycastConfig,

    pub min_zoom: f64,
    pub max_zoom: f64,

    pub animation_duration_ms: u64,

    /// Ruler thickness in screen pixels; guides released over it are removed
    pub ruler_size: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: 100,
            merge_timeout_ms: 300,
            hover_throttle_ms: 30,
            rotation_snap_degrees: 15.0,
            snap_rotation: false,
            gap_tolerance: 1.01,
            raycast: RaycastConfig::default(),
            min_zoom: 0.01,
            max_zoom: 256.0,
            animation_duration_ms: 250,
            ruler_size: 20.0,
        }
    }
}

impl EditorConfig {
    /// Load config from a file; a missing file yields the defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EditorError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(json: &str) -> Result<Self, EditorError> {
        let config: EditorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EditorError> {
        if self.min_zoom <= 0.0 || self.min_zoom > self.max_zoom {
            return Err(EditorError::Config(format!(
                "zoom range {}..{} is empty",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.rotation_snap_degrees <= 0.0 {
            return Err(EditorError::Config(
                "rotationSnapDegrees must be positive".to_string(),
            ));
        }
        if self.gap_tolerance < 0.0 {
            return Err(EditorError::Config("gapTolerance must not be negative".to_string()));
        }
        Ok(())
    }

    pub fn merge_timeout(&self) -> Duration {
        Duration::from_millis(self.merge_timeout_ms)
    }

    pub fn hover_throttle(&self) -> Duration {
        Duration::from_millis(self.hover_throttle_ms)
    }

    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_duration_ms)
    }
}
