//! The wafer-map JSON document: the persisted shape a saved map round-trips
//! through.
//!
//! Importing never mutates existing state: the document is parsed, a fresh
//! grid is generated from its parameters, and saved chips are reconciled
//! onto it by position. Any failure along the way surfaces before a map is
//! produced, so the caller's active collection stays untouched.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use wafermap_core::chip::Chip;
use wafermap_core::grid::GridError;
use wafermap_core::map::WaferMap;
use wafermap_core::reconcile;
use wafermap_core::wafer::{ChipSpec, WaferSpec};

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("malformed wafer map document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("document parameters are invalid: {0}")]
    Invalid(#[from] GridError),
}

/// Wafer parameters as persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaferParams {
    pub diameter: f64,
    pub flat_angle: f64,
    pub excluded_radius: f64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub export_timestamp: String,
}

impl WaferParams {
    pub fn to_spec(&self) -> WaferSpec {
        WaferSpec::new(self.diameter, self.flat_angle, self.excluded_radius)
    }
}

/// Chip parameters as persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChipParams {
    pub width: f64,
    pub height: f64,
    #[serde(default = "default_label_font_size")]
    pub label_font_size: f64,
}

fn default_label_font_size() -> f64 {
    ChipSpec::default().label_font_size
}

impl ChipParams {
    pub fn to_spec(&self) -> ChipSpec {
        ChipSpec {
            width_mm: self.width,
            height_mm: self.height,
            label_font_size: self.label_font_size,
        }
    }
}

/// A complete saved wafer map.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaferDocument {
    pub wafer_params: WaferParams,
    pub chip_params: ChipParams,
    pub chips: Vec<Chip>,
}

impl WaferDocument {
    /// Snapshot the current map for export.
    pub fn from_map(map: &WaferMap, export_timestamp: &str) -> Self {
        Self {
            wafer_params: WaferParams {
                diameter: map.wafer.diameter_mm,
                flat_angle: map.wafer.flat_angle_deg,
                excluded_radius: map.wafer.excluded_radius_mm,
                name: map.name.clone(),
                export_timestamp: export_timestamp.to_string(),
            },
            chip_params: ChipParams {
                width: map.chip.width_mm,
                height: map.chip.height_mm,
                label_font_size: map.chip.label_font_size,
            },
            chips: map.grid().chips().to_vec(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, ImportError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Rebuild a live map: regenerate from the document's parameters, then
    /// reconcile the document's chips onto the fresh grid by position.
    pub fn into_map(self) -> Result<WaferMap, ImportError> {
        let wafer = self.wafer_params.to_spec();
        let chip = self.chip_params.to_spec();
        let grid = reconcile::reconcile(&self.chips, &wafer, &chip)?;
        log::info!(
            "imported wafer map '{}': {} chips, {} inside",
            self.wafer_params.name,
            grid.len(),
            grid.inside_count()
        );
        Ok(WaferMap::from_parts(
            &self.wafer_params.name,
            wafer,
            chip,
            grid,
        ))
    }
}

/// Serialize a map to the document JSON.
pub fn export(map: &WaferMap, export_timestamp: &str) -> Result<String, serde_json::Error> {
    WaferDocument::from_map(map, export_timestamp).to_json()
}

/// Parse document JSON and rebuild a live map from it.
pub fn import(json: &str) -> Result<WaferMap, ImportError> {
    WaferDocument::from_json(json)?.into_map()
}
