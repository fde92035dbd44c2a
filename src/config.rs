use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::model::Size;

/// Auto-layout geometry. Values are canvas units at 1x zoom.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// X coordinate every row is centered on.
    pub canvas_center_x: f32,
    /// Y coordinate of the first row.
    pub start_y: f32,
    /// Horizontal gap between nodes within a row.
    pub h_padding: f32,
    /// Vertical gap between rows.
    pub v_padding: f32,
    /// Pill size applied to any collapsed node.
    pub collapsed_size: Size,
    pub prompt_expanded_size: Size,
    pub template_expanded_size: Size,
    pub group_expanded_size: Size,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            canvas_center_x: 640.0,
            start_y: 80.0,
            h_padding: 60.0,
            v_padding: 80.0,
            collapsed_size: Size::new(160.0, 40.0),
            prompt_expanded_size: Size::new(260.0, 180.0),
            template_expanded_size: Size::new(260.0, 200.0),
            group_expanded_size: Size::new(420.0, 320.0),
        }
    }
}

/// Edge-curve thresholds. Tuned for the default rendering scale; kept as
/// configuration rather than constants so hosts at other scales can adjust.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoutingConfig {
    /// Below this endpoint distance the edge gets a single bulged quadratic.
    pub short_distance: f32,
    pub short_bulge_min: f32,
    pub short_bulge_ratio: f32,
    /// Below this |dy| a forward edge is treated as same-row.
    pub flat_dy: f32,
    pub flat_arc_min: f32,
    pub flat_arc_ratio: f32,
    /// Horizontal step-around column for backward edges.
    pub backward_offset_min: f32,
    pub backward_offset_max: f32,
    pub backward_offset_ratio: f32,
    pub backward_pad_min: f32,
    pub backward_pad_ratio: f32,
    /// Control-point reach for ordinary forward cubics.
    pub forward_offset_ratio: f32,
    pub forward_offset_max: f32,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            short_distance: 100.0,
            short_bulge_min: 30.0,
            short_bulge_ratio: 0.3,
            flat_dy: 50.0,
            flat_arc_min: 60.0,
            flat_arc_ratio: 0.3,
            backward_offset_min: 80.0,
            backward_offset_max: 150.0,
            backward_offset_ratio: 0.5,
            backward_pad_min: 40.0,
            backward_pad_ratio: 0.2,
            forward_offset_ratio: 0.25,
            forward_offset_max: 60.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GroupingConfig {
    /// How far a child may overhang its parent before drag-out releases it.
    pub escape_margin: f32,
    /// Minimum relative inset for captured nodes; the y component keeps them
    /// clear of the group's header band.
    pub header_inset_x: f32,
    pub header_inset_y: f32,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            escape_margin: 24.0,
            header_inset_x: 12.0,
            header_inset_y: 44.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub layout: LayoutConfig,
    pub routing: RoutingConfig,
    pub grouping: GroupingConfig,
}

/// Loads a config file over the defaults; `None` yields the defaults. Fields
/// absent from the file keep their default values.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    let config: Config = serde_json::from_str(&contents)?;
    Ok(config)
}
