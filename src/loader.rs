//! # Geo Data Loader
//!
//! Reads the static CSV datasets that back the dashboard. The geometry
//! column holds well-known-text strings and is parsed into [`geo`] types at
//! load; every table is tagged with WGS84 (EPSG:4326).
//!
//! A malformed geometry cell fails the whole load: all downstream rendering
//! depends on valid geometry, so there is nothing useful to recover to.
//! Loads are not memoized here; the [`catalog`](crate::catalog) wraps this
//! module with the process-lifetime cache.

use std::path::Path;

use log::info;

use crate::error::{AtlasError, OptionExt, Result};
use crate::{GeoTable, PlainTable, GEOMETRY_COLUMN};

/// Load a geometry-bearing CSV into a [`GeoTable`].
///
/// - Fails with `NotFound` if the file is missing.
/// - Fails with `MissingColumn` if there is no `geometry` column.
/// - Fails with `MalformedGeometry` if any geometry cell is not valid WKT.
pub fn load_geo_table(path: &Path) -> Result<GeoTable> {
    let mut reader = open_reader(path)?;

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();
    headers
        .iter()
        .position(|h| h == GEOMETRY_COLUMN)
        .ok_or_missing_column(GEOMETRY_COLUMN, &path.display().to_string())?;

    let mut table = GeoTable::new(headers)?;
    for record in reader.records() {
        let record = record?;
        let cells: Vec<String> = record.iter().map(|c| c.to_string()).collect();
        table.push_row(cells)?;
    }

    info!(
        "[Loader] Loaded {} tracts from {} (EPSG:{})",
        table.len(),
        path.display(),
        table.crs().epsg_code()
    );
    Ok(table)
}

/// Load a geometry-free analysis CSV into a [`PlainTable`].
pub fn load_plain_table(path: &Path) -> Result<PlainTable> {
    let mut reader = open_reader(path)?;

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut table = PlainTable::new(headers);
    for record in reader.records() {
        let record = record?;
        let cells: Vec<String> = record.iter().map(|c| c.to_string()).collect();
        table.push_row(cells)?;
    }

    info!(
        "[Loader] Loaded {} rows from {}",
        table.len(),
        path.display()
    );
    Ok(table)
}

fn open_reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    if !path.exists() {
        return Err(AtlasError::NotFound {
            path: path.display().to_string(),
        });
    }
    csv::Reader::from_path(path).map_err(AtlasError::from)
}
