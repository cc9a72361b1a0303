//! # Tract Filter
//!
//! Cascading neighborhood / census-tract selection over a loaded dataset.
//!
//! The dashboard's two dropdowns are mutually coupled: picking a tract
//! narrows the neighborhood choices and back-fills the neighborhood
//! selection, while picking a neighborhood narrows the tract choices. That
//! coupling is expressed here as a pure function
//! `(table, selection) -> (filtered rows, updated selection, option lists)`
//! so selection-state computation is independently testable, decoupled from
//! any widget framework.
//!
//! Rank filtering for the coverage tabs lives here too: option extraction
//! keeps only digit-string ranks (non-ranked tracts have empty cells) and a
//! specific rank restricts rows by exact string match.

use serde::{Deserialize, Serialize};

use crate::error::{OptionExt, Result};
use crate::{rank_column, GeoTable, NTA_NAME_COLUMN, ZONE_TRACT_COLUMN};

/// Label used by every dropdown for the no-restriction choice.
pub const ALL_OPTION: &str = "All";

/// One dropdown's state: everything, or a single value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    All,
    Only(String),
}

impl Selection {
    /// Whether this selection places no restriction.
    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    /// Build a selection from a dropdown label ("All" maps to `All`).
    pub fn from_label(label: &str) -> Self {
        if label == ALL_OPTION {
            Selection::All
        } else {
            Selection::Only(label.to_string())
        }
    }

    /// The dropdown label for this selection.
    pub fn label(&self) -> &str {
        match self {
            Selection::All => ALL_OPTION,
            Selection::Only(value) => value,
        }
    }
}

impl Default for Selection {
    fn default() -> Self {
        Selection::All
    }
}

/// Combined state of the neighborhood and tract dropdowns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneSelection {
    pub neighborhood: Selection,
    pub tract: Selection,
}

/// Result of applying a [`ZoneSelection`] to a dataset.
#[derive(Debug, Clone)]
pub struct ZoneFilterOutcome {
    /// The working subset of tracts.
    pub rows: GeoTable,
    /// The selection after cascading updates (the neighborhood may have been
    /// back-filled from a tract pick).
    pub selection: ZoneSelection,
    /// Refreshed neighborhood dropdown options, "All" first.
    pub neighborhood_options: Vec<String>,
    /// Refreshed tract dropdown options, "All" first.
    pub tract_options: Vec<String>,
}

/// Compute the working subset of tracts from the user's selections.
///
/// Tract selection takes precedence over neighborhood selection:
/// - A specific tract yields the single (or zero) matching row from the
///   full dataset, and the neighborhood options are recomputed from that
///   result. If the neighborhood was "All" it falls back to the first
///   non-"All" option (and stays "All" when the result is empty).
/// - Otherwise a specific neighborhood yields all of its tracts.
/// - Otherwise the full dataset.
///
/// An empty result is valid and renders as an empty map and card list.
pub fn cascade(table: &GeoTable, selection: &ZoneSelection) -> ZoneFilterOutcome {
    let mut neighborhood_options = with_all_option(table.unique_values(NTA_NAME_COLUMN));

    // Tract options always derive from the neighborhood-filtered view
    let neighborhood_rows = match &selection.neighborhood {
        Selection::Only(name) => table.filter_by_column(NTA_NAME_COLUMN, name),
        Selection::All => table.clone(),
    };
    let tract_options = with_all_option(neighborhood_rows.unique_values(ZONE_TRACT_COLUMN));

    let (rows, neighborhood) = match &selection.tract {
        Selection::Only(tract_id) => {
            let rows = table.filter_by_column(ZONE_TRACT_COLUMN, tract_id);
            neighborhood_options = with_all_option(rows.unique_values(NTA_NAME_COLUMN));
            let neighborhood = if selection.neighborhood.is_all() {
                neighborhood_options
                    .get(1)
                    .map(|name| Selection::Only(name.clone()))
                    .unwrap_or(Selection::All)
            } else {
                selection.neighborhood.clone()
            };
            (rows, neighborhood)
        }
        Selection::All => (neighborhood_rows, selection.neighborhood.clone()),
    };

    ZoneFilterOutcome {
        rows,
        selection: ZoneSelection {
            neighborhood,
            tract: selection.tract.clone(),
        },
        neighborhood_options,
        tract_options,
    }
}

/// Rank dropdown options for a year: unique digit-string ranks, sorted
/// numerically, without the "All" prefix.
///
/// Non-digit rank values are silently dropped. Empty cells mark non-ranked
/// tracts; any other non-numeric text is assumed to be a data-quality issue
/// in the source file, not a distinct rank.
///
/// Fails with `MissingColumn` if the year has no rank column.
pub fn rank_options(table: &GeoTable, year: i32) -> Result<Vec<String>> {
    let column = rank_column(year);
    table
        .column_index(&column)
        .ok_or_missing_column(&column, "the dataset")?;

    let mut options: Vec<String> = table
        .unique_values(&column)
        .into_iter()
        .filter(|rank| !rank.is_empty() && rank.chars().all(|c| c.is_ascii_digit()))
        .collect();
    options.sort_by_key(|rank| rank.parse::<u64>().unwrap_or(u64::MAX));
    Ok(options)
}

/// Restrict rows to a specific rank by exact string match.
///
/// `Selection::All` is the identity; an unknown rank column yields an empty
/// table.
pub fn filter_by_rank(table: &GeoTable, rank_col: &str, rank: &Selection) -> GeoTable {
    match rank {
        Selection::All => table.clone(),
        Selection::Only(value) => table.filter_by_column(rank_col, value),
    }
}

fn with_all_option(values: Vec<String>) -> Vec<String> {
    let mut options = Vec::with_capacity(values.len() + 1);
    options.push(ALL_OPTION.to_string());
    options.extend(values);
    options
}
