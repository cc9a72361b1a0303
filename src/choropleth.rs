//! # Map Renderer
//!
//! Builds renderable map view models from filtered tract tables. The tile
//! and layer rendering itself belongs to the UI's mapping collaborator; this
//! module decides colors, tooltips and framing and serializes cleanly to
//! JSON.
//!
//! Two map kinds are produced:
//! - a choropleth over a per-year value column, binned into a sequential
//!   yellow-to-red scale and joined strictly by tract identifier
//! - a uniform red overlay of the LILA zones with a six-field tooltip
//!
//! A missing value or rank column is not an error here: the contract is an
//! empty base map plus a user-visible warning, so the page keeps rendering.

use geo::Geometry;
use log::warn;
use serde::Serialize;

use crate::detail::format_localized;
use crate::filter::{filter_by_rank, Selection};
use crate::{
    GeoTable, FOOD_INDEX_COLUMN, MEDIAN_INCOME_COLUMN, NTA_NAME_COLUMN, POVERTY_RATE_COLUMN,
    SNAP_COLUMN, TRACT_ID_COLUMN, ZONE_TRACT_COLUMN,
};

/// Sequential yellow-to-red palette, low to high.
pub const YLORRD: [&str; 6] = [
    "#ffffb2", "#fed976", "#feb24c", "#fd8d3c", "#f03b20", "#bd0026",
];

/// Fixed framing and opacity defaults for every rendered map.
#[derive(Debug, Clone, Serialize)]
pub struct MapConfig {
    /// Map center as (latitude, longitude).
    pub center: (f64, f64),
    /// Initial zoom level.
    pub zoom: u8,
    /// Choropleth fill opacity.
    pub fill_opacity: f64,
    /// Choropleth boundary line opacity.
    pub line_opacity: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            // Brooklyn's approximate centroid
            center: (40.7128, -74.0060),
            zoom: 10,
            fill_opacity: 0.7,
            line_opacity: 0.2,
        }
    }
}

/// One tooltip line: label and display value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipField {
    pub label: String,
    pub value: String,
}

impl TooltipField {
    fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// One rendered tract: geometry, styling and tooltip, keyed by identifier.
#[derive(Debug, Clone, Serialize)]
pub struct MapRegion {
    /// Tract identifier (the join key; never geometry intersection).
    pub key: String,
    pub geometry: Geometry<f64>,
    /// Fill color, or `None` when the tract's value did not parse.
    pub fill_color: Option<String>,
    pub fill_opacity: f64,
    pub line_weight: f64,
    pub line_opacity: f64,
    pub tooltip: Vec<TooltipField>,
}

/// A renderable map: fixed framing plus regions and an optional inline
/// warning.
#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    pub center: (f64, f64),
    pub zoom: u8,
    /// Legend title for the color scale, when one applies.
    pub legend: Option<String>,
    /// Layer toggling enabled.
    pub layer_control: bool,
    pub regions: Vec<MapRegion>,
    /// User-visible message (e.g. a missing column); the map still renders.
    pub warning: Option<String>,
}

impl MapView {
    /// An empty base map with the fixed framing.
    pub fn empty(config: &MapConfig) -> Self {
        Self {
            center: config.center,
            zoom: config.zoom,
            legend: None,
            layer_control: true,
            regions: Vec::new(),
            warning: None,
        }
    }

    /// Serialize for the mapping collaborator.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Six-step equal-width color scale over a value range.
#[derive(Debug, Clone, Serialize)]
pub struct ColorScale {
    min: f64,
    max: f64,
    steps: Vec<String>,
}

impl ColorScale {
    /// Fit the scale to the observed values. `None` when no value is numeric.
    pub fn fit(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            min,
            max,
            steps: YLORRD.iter().map(|c| c.to_string()).collect(),
        })
    }

    /// Color for a value. Values outside the fitted range clamp to the ends;
    /// a zero-width range collapses to the top step.
    pub fn color_for(&self, value: f64) -> &str {
        let span = self.max - self.min;
        if span <= 0.0 {
            return &self.steps[self.steps.len() - 1];
        }
        let t = ((value - self.min) / span).clamp(0.0, 1.0);
        let idx = ((t * self.steps.len() as f64) as usize).min(self.steps.len() - 1);
        &self.steps[idx]
    }
}

/// Build a choropleth map for one year's value column.
///
/// The value and rank columns must exist; if either is absent the result is
/// an empty base map carrying a user-visible warning, never a panic. A
/// specific rank restricts rows before colors are binned. The color join is
/// strictly by tract identifier.
pub fn choropleth_map(
    table: &GeoTable,
    year: i32,
    value_col: &str,
    rank_col: &str,
    rank: &Selection,
    legend: &str,
    config: &MapConfig,
) -> MapView {
    let mut map = MapView::empty(config);
    map.legend = Some(legend.to_string());

    if !table.has_column(value_col) || !table.has_column(rank_col) {
        warn!(
            "[Map] Column '{}' or '{}' does not exist in the data",
            value_col, rank_col
        );
        map.warning = Some(format!(
            "Column '{}' or '{}' does not exist in the data.",
            value_col, rank_col
        ));
        return map;
    }

    let rows = filter_by_rank(table, rank_col, rank);

    let values: Vec<f64> = rows
        .rows()
        .iter()
        .filter_map(|row| numeric_cell(&rows, row, value_col))
        .collect();
    let scale = ColorScale::fit(&values);

    for row in rows.rows() {
        let tract_id = rows.cell(row, TRACT_ID_COLUMN).unwrap_or_default();
        let raw_value = rows.cell(row, value_col).unwrap_or_default();
        let raw_rank = rows.cell(row, rank_col).unwrap_or_default();

        let fill_color = numeric_cell(&rows, row, value_col)
            .and_then(|v| scale.as_ref().map(|s| s.color_for(v).to_string()));

        map.regions.push(MapRegion {
            key: tract_id.to_string(),
            geometry: row.geometry().clone(),
            fill_color,
            fill_opacity: config.fill_opacity,
            line_weight: 1.0,
            line_opacity: config.line_opacity,
            tooltip: vec![
                TooltipField::new("Census Tract Area", tract_id),
                TooltipField::new(format!("{year} {legend}"), format_localized(raw_value)),
                TooltipField::new("Rank", raw_rank),
            ],
        });
    }

    map
}

/// Build the uniform red LILA zone overlay with its six-field tooltip.
pub fn zone_overlay_map(table: &GeoTable, config: &MapConfig) -> MapView {
    let mut map = MapView::empty(config);

    for row in table.rows() {
        let cell = |column: &str| table.cell(row, column).unwrap_or_default().to_string();
        map.regions.push(MapRegion {
            key: cell(ZONE_TRACT_COLUMN),
            geometry: row.geometry().clone(),
            fill_color: Some("red".to_string()),
            fill_opacity: 0.6,
            line_weight: 1.0,
            line_opacity: 1.0,
            tooltip: vec![
                TooltipField::new("Census Tract Area:", cell(ZONE_TRACT_COLUMN)),
                TooltipField::new("NTA Name:", cell(NTA_NAME_COLUMN)),
                TooltipField::new("Food Index:", cell(FOOD_INDEX_COLUMN)),
                TooltipField::new(
                    "Median Family Income:",
                    format_localized(&cell(MEDIAN_INCOME_COLUMN)),
                ),
                TooltipField::new("Poverty Rate:", cell(POVERTY_RATE_COLUMN)),
                TooltipField::new("SNAP Benefits:", cell(SNAP_COLUMN)),
            ],
        });
    }

    map
}

fn numeric_cell(table: &GeoTable, row: &crate::TractRow, column: &str) -> Option<f64> {
    table.cell(row, column)?.trim().parse::<f64>().ok()
}
