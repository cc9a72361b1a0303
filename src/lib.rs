//! # Desert Atlas
//!
//! Food desert indicator mapping and census tract filtering for Brooklyn.
//!
//! This library provides the data side of an interactive food-desert
//! dashboard:
//! - CSV datasets with well-known-text geometry parsed into [`geo`] types
//! - Cascading neighborhood / census-tract filtering
//! - Choropleth map view models (color binning keyed by tract identifier)
//! - Detail cards, analysis-table operations, and CSV export
//!
//! Chart and tile rendering stay external: every operation returns a plain,
//! serializable view model that a UI layer hands to its charting or mapping
//! collaborator.
//!
//! ## Quick Start
//!
//! ```rust
//! use desert_atlas::{cascade, GeoTable, Selection, ZoneSelection};
//!
//! let mut table = GeoTable::new(vec![
//!     "Census Tract Area".into(),
//!     "NTA Name".into(),
//!     "geometry".into(),
//! ])
//! .unwrap();
//! table
//!     .push_row(vec![
//!         "36047000100".into(),
//!         "Greenpoint".into(),
//!         "POLYGON((-73.96 40.73,-73.95 40.73,-73.95 40.74,-73.96 40.73))".into(),
//!     ])
//!     .unwrap();
//!
//! let selection = ZoneSelection {
//!     neighborhood: Selection::All,
//!     tract: Selection::Only("36047000100".into()),
//! };
//! let outcome = cascade(&table, &selection);
//! assert_eq!(outcome.rows.len(), 1);
//! ```

use geo::Geometry;
use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{AtlasError, OptionExt, Result};

// Geo data loader (CSV + well-known-text geometry)
pub mod loader;
pub use loader::{load_geo_table, load_plain_table};

// Process-wide memoized dataset catalog
pub mod catalog;
pub use catalog::{with_catalog, CatalogStats, DataCatalog, CATALOG};

// Cascading tract filter
pub mod filter;
pub use filter::{
    cascade, filter_by_rank, rank_options, Selection, ZoneFilterOutcome, ZoneSelection,
};

// Choropleth map view models
pub mod choropleth;
pub use choropleth::{
    choropleth_map, zone_overlay_map, ColorScale, MapConfig, MapRegion, MapView, TooltipField,
};

// Detail panel cards
pub mod detail;
pub use detail::{coverage_cards, format_localized, zone_cards, CoverageCard, ZoneCard};

// Analysis-table operations (box plot / line chart / heatmap inputs)
pub mod analysis;
pub use analysis::{
    correlation_matrix, filter_year_range, select_columns, year_bounds, CorrelationMatrix,
};

// CSV export and share links
pub mod export;
pub use export::{csv_download_href, share_mailto_link, table_to_csv, DownloadLink};

// Page controller (navigation dispatch over the loaded datasets)
pub mod pages;
pub use pages::{
    AnalysisView, AppState, CommentsView, CoverageTab, DashboardController, DatasetPaths, Page,
    PageView, StaticPage, VisualizationView, ZoneTab,
};

// ============================================================================
// Well-Known Columns & Constants
// ============================================================================

/// Column holding well-known-text geometry in every geo dataset.
pub const GEOMETRY_COLUMN: &str = "geometry";

/// Tract identifier column in the coverage datasets.
pub const TRACT_ID_COLUMN: &str = "TRACTCE";

/// Tract identifier column in the LILA zone dataset.
pub const ZONE_TRACT_COLUMN: &str = "Census Tract Area";

/// Neighborhood Tabulation Area name column.
pub const NTA_NAME_COLUMN: &str = "NTA Name";

/// Food index column in the LILA zone dataset.
pub const FOOD_INDEX_COLUMN: &str = "Food Index";

/// Median family income column. The source data carries the padding spaces
/// in the header; they are part of the column name.
pub const MEDIAN_INCOME_COLUMN: &str = " Median Family Income ";

/// Poverty rate column in the LILA zone dataset.
pub const POVERTY_RATE_COLUMN: &str = "Education below high school diploma (Poverty Rate)";

/// SNAP benefits percentage column.
pub const SNAP_COLUMN: &str = "SNAP Benefits %";

/// First year with coverage ratio / rank columns.
pub const YEAR_MIN: i32 = 2003;

/// Last year with coverage ratio / rank columns.
pub const YEAR_MAX: i32 = 2017;

/// All years carrying per-year rank and coverage ratio columns.
pub fn coverage_years() -> std::ops::RangeInclusive<i32> {
    YEAR_MIN..=YEAR_MAX
}

/// Rank column name for a year, e.g. `2003_rank`.
pub fn rank_column(year: i32) -> String {
    format!("{year}_rank")
}

/// Supermarket coverage ratio column name for a year.
pub fn supermarket_value_column(year: i32) -> String {
    format!("{year}_supermarket coverage ratio")
}

/// Fast food coverage ratio column name for a year.
pub fn fast_food_value_column(year: i32) -> String {
    format!("{year}_Fast Food Coverage Ratio")
}

// ============================================================================
// Core Types
// ============================================================================

/// Coordinate reference system tag for a geometry-bearing table.
///
/// All source datasets are longitude/latitude degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Crs {
    Epsg4326,
}

impl Crs {
    /// EPSG code for this CRS.
    pub fn epsg_code(&self) -> u32 {
        match self {
            Crs::Epsg4326 => 4326,
        }
    }
}

/// One census tract row: raw cells parallel to the table's columns plus the
/// parsed geometry.
///
/// Cell text is kept verbatim so that CSV export reproduces the source file.
#[derive(Debug, Clone, PartialEq)]
pub struct TractRow {
    cells: Vec<String>,
    geometry: Geometry<f64>,
}

impl TractRow {
    /// Parsed geometry for this tract.
    pub fn geometry(&self) -> &Geometry<f64> {
        &self.geometry
    }

    /// Raw cells in column order.
    pub fn cells(&self) -> &[String] {
        &self.cells
    }
}

/// A geometry-bearing table of census tract records.
///
/// Column order and raw cell text are preserved exactly as read, so exporting
/// back to CSV round-trips the source file. The geometry column is parsed
/// once at construction; a malformed cell rejects the whole table.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoTable {
    columns: Vec<String>,
    geometry_col: usize,
    crs: Crs,
    rows: Vec<TractRow>,
}

impl GeoTable {
    /// Create an empty table with the given columns.
    ///
    /// Fails with `MissingColumn` if no `geometry` column is present.
    pub fn new(columns: Vec<String>) -> crate::Result<Self> {
        let geometry_col = columns
            .iter()
            .position(|c| c == GEOMETRY_COLUMN)
            .ok_or_missing_column(GEOMETRY_COLUMN, "table header")?;
        Ok(Self {
            columns,
            geometry_col,
            crs: Crs::Epsg4326,
            rows: Vec::new(),
        })
    }

    /// Append a row of raw cells, parsing the geometry cell from
    /// well-known text.
    ///
    /// Fails with `MalformedGeometry` if the cell is not valid WKT, or
    /// `Internal` if the cell count does not match the header.
    pub fn push_row(&mut self, cells: Vec<String>) -> crate::Result<()> {
        if cells.len() != self.columns.len() {
            return Err(AtlasError::Internal {
                message: format!(
                    "Row {} has {} cells, expected {}",
                    self.rows.len(),
                    cells.len(),
                    self.columns.len()
                ),
            });
        }
        let geometry = parse_wkt_cell(&cells[self.geometry_col], self.rows.len())?;
        self.rows.push(TractRow { cells, geometry });
        Ok(())
    }

    /// Column names in file order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Index of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Whether a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Index of the geometry column.
    pub fn geometry_column_index(&self) -> usize {
        self.geometry_col
    }

    /// Coordinate reference system tag.
    pub fn crs(&self) -> Crs {
        self.crs
    }

    /// All rows.
    pub fn rows(&self) -> &[TractRow] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell text for a row and column name. `None` if the column is absent.
    pub fn cell<'a>(&self, row: &'a TractRow, column: &str) -> Option<&'a str> {
        let idx = self.column_index(column)?;
        row.cells.get(idx).map(String::as_str)
    }

    /// Unique non-empty values of a column, in first-appearance order.
    pub fn unique_values(&self, column: &str) -> Vec<String> {
        let Some(idx) = self.column_index(column) else {
            return Vec::new();
        };
        let mut seen = std::collections::HashSet::new();
        let mut values = Vec::new();
        for row in &self.rows {
            let value = row.cells[idx].as_str();
            if !value.is_empty() && seen.insert(value.to_string()) {
                values.push(value.to_string());
            }
        }
        values
    }

    /// Rows whose `column` cell equals `value` exactly, as a new table.
    ///
    /// An unknown column yields an empty table (a filter over nothing).
    pub fn filter_by_column(&self, column: &str, value: &str) -> GeoTable {
        match self.column_index(column) {
            Some(idx) => self.filter_where(|row| row.cells[idx] == value),
            None => GeoTable {
                columns: self.columns.clone(),
                geometry_col: self.geometry_col,
                crs: self.crs,
                rows: Vec::new(),
            },
        }
    }

    /// Rows matching a predicate, as a new table. The source is never
    /// mutated; filters produce transient views.
    pub fn filter_where<F>(&self, predicate: F) -> GeoTable
    where
        F: Fn(&TractRow) -> bool,
    {
        GeoTable {
            columns: self.columns.clone(),
            geometry_col: self.geometry_col,
            crs: self.crs,
            rows: self.rows.iter().filter(|r| predicate(r)).cloned().collect(),
        }
    }
}

/// A geometry-free table (the plain analysis datasets).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlainTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl PlainTable {
    /// Create an empty table with the given columns.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row of raw cells.
    pub fn push_row(&mut self, cells: Vec<String>) -> crate::Result<()> {
        if cells.len() != self.columns.len() {
            return Err(AtlasError::Internal {
                message: format!(
                    "Row {} has {} cells, expected {}",
                    self.rows.len(),
                    cells.len(),
                    self.columns.len()
                ),
            });
        }
        self.rows.push(cells);
        Ok(())
    }

    /// Column names in file order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Index of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All rows.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell text at a row index and column name.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx).map(String::as_str)
    }

    /// A column parsed as numbers; cells that fail to parse are `None`.
    pub fn numeric_column(&self, column: &str) -> Vec<Option<f64>> {
        let Some(idx) = self.column_index(column) else {
            return vec![None; self.rows.len()];
        };
        self.rows
            .iter()
            .map(|row| row[idx].trim().parse::<f64>().ok())
            .collect()
    }
}

/// Parse a single WKT cell into a geometry.
fn parse_wkt_cell(cell: &str, row: usize) -> crate::Result<Geometry<f64>> {
    use wkt::TryFromWkt;

    Geometry::try_from_wkt_str(cell.trim()).map_err(|e| AtlasError::MalformedGeometry {
        row,
        message: e.to_string(),
    })
}

// ============================================================================
// Tests
// ============================================================================
