//! # Analysis Table Operations
//!
//! The data side of the analysis page: column subsets for the income box
//! plot, year-range filtering for the employment line charts, and the
//! Pearson correlation matrix behind the annotated heatmap. The charts
//! themselves are drawn by the UI's charting collaborator.

use serde::Serialize;

use crate::error::{OptionExt, Result};
use crate::PlainTable;

/// A subset of columns, preserving the requested order.
///
/// Fails with `MissingColumn` for an unknown name.
pub fn select_columns(table: &PlainTable, names: &[String]) -> Result<PlainTable> {
    let indices: Vec<usize> = names
        .iter()
        .map(|name| {
            table
                .column_index(name)
                .ok_or_missing_column(name, "the analysis table")
        })
        .collect::<Result<_>>()?;

    let mut subset = PlainTable::new(names.to_vec());
    for row in table.rows() {
        let cells = indices.iter().map(|&i| row[i].clone()).collect();
        subset.push_row(cells)?;
    }
    Ok(subset)
}

/// Rows whose `year_col` value lies in `[min, max]` inclusive.
///
/// Rows with unparseable years are dropped, matching a numeric comparison
/// over the column.
pub fn filter_year_range(
    table: &PlainTable,
    year_col: &str,
    min: i32,
    max: i32,
) -> Result<PlainTable> {
    let idx = table
        .column_index(year_col)
        .ok_or_missing_column(year_col, "the analysis table")?;

    let mut filtered = PlainTable::new(table.columns().to_vec());
    for row in table.rows() {
        if let Ok(year) = row[idx].trim().parse::<i32>() {
            if year >= min && year <= max {
                filtered.push_row(row.clone())?;
            }
        }
    }
    Ok(filtered)
}

/// Smallest and largest year present in a column. `None` when no cell
/// parses.
pub fn year_bounds(table: &PlainTable, year_col: &str) -> Option<(i32, i32)> {
    let years: Vec<i32> = table
        .numeric_column(year_col)
        .into_iter()
        .flatten()
        .map(|y| y as i32)
        .collect();
    let min = years.iter().min()?;
    let max = years.iter().max()?;
    Some((*min, *max))
}

/// Pearson correlation matrix over a set of columns.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    /// Column labels, identical on both axes.
    pub columns: Vec<String>,
    /// `values[i][j]` is the correlation between columns `i` and `j`.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Matrix rounded for heatmap annotation display.
    pub fn rounded(&self, digits: u32) -> Vec<Vec<f64>> {
        let factor = 10f64.powi(digits as i32);
        self.values
            .iter()
            .map(|row| row.iter().map(|v| (v * factor).round() / factor).collect())
            .collect()
    }
}

/// Compute the Pearson correlation matrix for the given columns.
///
/// Each pair is correlated over the rows where both cells parse as numbers.
/// Pairs with fewer than two complete observations, or a zero-variance
/// column, yield NaN for that entry.
pub fn correlation_matrix(table: &PlainTable, columns: &[String]) -> Result<CorrelationMatrix> {
    let series: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|name| {
            table
                .column_index(name)
                .ok_or_missing_column(name, "the correlation table")?;
            Ok(table.numeric_column(name))
        })
        .collect::<Result<_>>()?;

    let n = columns.len();
    let mut values = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = pearson(&series[i], &series[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        columns: columns.to_vec(),
        values,
    })
}

/// Pearson correlation over pairwise-complete observations.
fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys.iter())
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    cov / denom
}
