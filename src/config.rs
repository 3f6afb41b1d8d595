//! Rendering options, passed through to the rendering surface.

use serde::{Deserialize, Serialize};

use crate::layout::LayeredLayout;
use crate::measure::TextMetrics;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiagramConfig {
    pub allow_loose_links: bool,
    pub allow_canvas_translation: bool,
    pub allow_canvas_zoom: bool,
    /// Cap on drawn points per link, endpoints included; 0 means no cap
    pub max_number_points_per_link: usize,
    /// Draw routed links; when off, links are straight lines between ports
    pub smart_routing: bool,
    pub class_name: String,
    pub layout: LayeredLayout,
    /// Used for both node sizing and drawing
    pub metrics: TextMetrics,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            allow_loose_links: false,
            allow_canvas_translation: true,
            allow_canvas_zoom: true,
            max_number_points_per_link: 0,
            smart_routing: true,
            class_name: "database-diagram-canvas".to_string(),
            layout: LayeredLayout::default(),
            metrics: TextMetrics::default(),
        }
    }
}

impl DiagramConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
