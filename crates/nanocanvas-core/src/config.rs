//! Editor configuration.

use crate::generation::AssemblerConfig;
use crate::snap::{GRID_SIZE, SNAP_DISTANCE, SnapConfig};
use crate::tools::ToolSettings;
use serde::{Deserialize, Serialize};

/// Tunable constants for the editor. Missing JSON fields keep their defaults;
/// unknown ones are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    pub grid_size: f64,
    pub snap_distance: f64,
    /// Drawn shapes smaller than this on either axis are discarded.
    pub min_shape_extent: f64,
    pub selection_raster_target: f64,
    pub image_raster_target: f64,
    pub placement_gap: f64,
    pub default_visual_width: f64,
    pub default_text: String,
    pub font_family: String,
    /// Width uploaded images are scaled to on insert.
    pub upload_width: f64,
    pub gallery_cap: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            snap_distance: SNAP_DISTANCE,
            min_shape_extent: 5.0,
            selection_raster_target: 1536.0,
            image_raster_target: 1024.0,
            placement_gap: 20.0,
            default_visual_width: 400.0,
            default_text: "Type Here".to_string(),
            font_family: "Inter".to_string(),
            upload_width: 300.0,
            gallery_cap: 50,
        }
    }
}

impl EditorConfig {
    /// Parse a JSON object. Arrays and scalars are rejected.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if !value.is_object() {
            return Err(serde::de::Error::custom("editor config must be a JSON object"));
        }
        serde_json::from_value(value)
    }

    pub fn snap(&self) -> SnapConfig {
        SnapConfig {
            grid_size: self.grid_size,
            snap_distance: self.snap_distance,
        }
    }

    pub fn tool_settings(&self) -> ToolSettings {
        ToolSettings {
            min_shape_extent: self.min_shape_extent,
            default_text: self.default_text.clone(),
            font_family: self.font_family.clone(),
            snap: self.snap(),
        }
    }

    pub fn assembler(&self) -> AssemblerConfig {
        AssemblerConfig {
            selection_target: self.selection_raster_target,
            image_target: self.image_raster_target,
            placement_gap: self.placement_gap,
            default_visual_width: self.default_visual_width,
        }
    }
}
