// Editor settings, loaded from an optional JSON file. Every field has a default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::STROKE_COLOR;

pub const DEFAULT_INSTRUCTION: &str = "Erase the masked area.";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushConfig {
    /// Starting line width in image pixels.
    pub size: f64,
    pub min_size: f64,
    pub max_size: f64,
    /// How much one bracket key press grows/shrinks the brush.
    pub step: f64,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            size: 40.0,
            min_size: 5.0,
            max_size: 100.0,
            step: 5.0,
        }
    }
}

impl BrushConfig {
    pub fn clamp(&self, size: f64) -> f64 {
        size.clamp(self.min_size, self.max_size)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub brush: BrushConfig,
    /// Opacity of the whole mask layer on screen (strokes themselves are opaque).
    pub overlay_opacity: f32,
    pub stroke_color: [u8; 3],
    /// Sent when the user leaves the instruction empty.
    pub default_instruction: String,
    /// Cap on undo snapshots; `None` keeps the whole session.
    pub history_limit: Option<usize>,
    pub max_window_width: usize,
    pub max_window_height: usize,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            brush: BrushConfig::default(),
            overlay_opacity: 0.7,
            stroke_color: STROKE_COLOR,
            default_instruction: DEFAULT_INSTRUCTION.to_string(),
            history_limit: None,
            max_window_width: 1280,
            max_window_height: 800,
            request_timeout_secs: 120,
        }
    }
}

impl Config {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(s).map_err(|e| Error::config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let cfg = Self::from_json_str(&text)?;
        tracing::info!(path = %path.display(), "loaded config");
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        let b = &self.brush;
        if !(b.min_size > 0.0) || b.min_size > b.max_size {
            return Err(Error::config(format!(
                "brush sizes must satisfy 0 < min_size <= max_size (got {} and {})",
                b.min_size, b.max_size
            )));
        }
        if !(0.0..=1.0).contains(&self.overlay_opacity) {
            return Err(Error::config("overlay_opacity must be within 0..=1"));
        }
        if self.max_window_width == 0 || self.max_window_height == 0 {
            return Err(Error::config("window bounds must be non-zero"));
        }
        Ok(())
    }

    /// The user's instruction, or the default one when it is blank.
    pub fn instruction_or_default(&self, instruction: &str) -> String {
        let trimmed = instruction.trim();
        if trimmed.is_empty() {
            self.default_instruction.clone()
        } else {
            trimmed.to_string()
        }
    }
}
