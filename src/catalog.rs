//! # Dataset Catalog
//!
//! Process-wide memoization of loaded datasets, keyed by file path.
//!
//! The source files never change during a session, so the catalog is
//! populated once and carries no invalidation mechanism. Loading the same
//! path twice returns the same shared table (the memoized `Arc`), which makes
//! repeated page re-renders free of file I/O.
//!
//! The global [`CATALOG`] singleton gives the UI layer one shared cache; unit
//! tests that need isolation construct their own [`DataCatalog`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use log::debug;
use once_cell::sync::Lazy;

use crate::error::Result;
use crate::loader::{load_geo_table, load_plain_table};
use crate::{GeoTable, PlainTable};

/// Memoization table for loaded datasets.
#[derive(Debug, Default)]
pub struct DataCatalog {
    geo_tables: HashMap<PathBuf, Arc<GeoTable>>,
    plain_tables: HashMap<PathBuf, Arc<PlainTable>>,
}

impl DataCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a geometry-bearing dataset, memoized by path.
    pub fn geo_table(&mut self, path: &Path) -> Result<Arc<GeoTable>> {
        if let Some(table) = self.geo_tables.get(path) {
            debug!("[Catalog] Cache hit for {}", path.display());
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(load_geo_table(path)?);
        self.geo_tables.insert(path.to_path_buf(), Arc::clone(&table));
        Ok(table)
    }

    /// Load a plain analysis dataset, memoized by path.
    pub fn plain_table(&mut self, path: &Path) -> Result<Arc<PlainTable>> {
        if let Some(table) = self.plain_tables.get(path) {
            debug!("[Catalog] Cache hit for {}", path.display());
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(load_plain_table(path)?);
        self.plain_tables
            .insert(path.to_path_buf(), Arc::clone(&table));
        Ok(table)
    }

    /// Whether a path is already cached (either table kind).
    pub fn is_cached(&self, path: &Path) -> bool {
        self.geo_tables.contains_key(path) || self.plain_tables.contains_key(path)
    }

    /// Drop every cached table.
    pub fn clear(&mut self) {
        self.geo_tables.clear();
        self.plain_tables.clear();
    }

    /// Catalog statistics for monitoring.
    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            geo_table_count: self.geo_tables.len() as u32,
            plain_table_count: self.plain_tables.len() as u32,
        }
    }
}

/// Catalog statistics for monitoring.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CatalogStats {
    pub geo_table_count: u32,
    pub plain_table_count: u32,
}

// ============================================================================
// Global Singleton
// ============================================================================

/// Global catalog instance shared by every page render in the process.
pub static CATALOG: Lazy<Mutex<DataCatalog>> = Lazy::new(|| Mutex::new(DataCatalog::new()));

/// Get a lock on the global catalog.
pub fn with_catalog<F, R>(f: F) -> R
where
    F: FnOnce(&mut DataCatalog) -> R,
{
    let mut catalog = CATALOG.lock().unwrap();
    f(&mut catalog)
}
