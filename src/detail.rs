//! # Detail Panel
//!
//! Formatted cards for the rows of a filtered table, one card per tract.
//! Pure formatting; the numbers come straight from the dataset cells.

use serde::Serialize;

use crate::{
    rank_column, GeoTable, FOOD_INDEX_COLUMN, MEDIAN_INCOME_COLUMN, NTA_NAME_COLUMN,
    POVERTY_RATE_COLUMN, SNAP_COLUMN, TRACT_ID_COLUMN, ZONE_TRACT_COLUMN,
};

/// Card for one LILA zone tract: identifier plus socioeconomic fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneCard {
    pub nta_name: String,
    pub tract_id: String,
    pub food_index: String,
    pub median_income: String,
    pub poverty_rate: String,
    pub snap_percent: String,
}

/// Card for one tract on a coverage tab: identifier, value and rank for the
/// selected year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageCard {
    pub tract_id: String,
    pub year: i32,
    pub value: String,
    pub rank: String,
}

/// Build one zone card per row of a filtered LILA table.
pub fn zone_cards(table: &GeoTable) -> Vec<ZoneCard> {
    table
        .rows()
        .iter()
        .map(|row| {
            let cell = |column: &str| table.cell(row, column).unwrap_or_default().to_string();
            ZoneCard {
                nta_name: cell(NTA_NAME_COLUMN),
                tract_id: cell(ZONE_TRACT_COLUMN),
                food_index: cell(FOOD_INDEX_COLUMN),
                median_income: format_localized(&cell(MEDIAN_INCOME_COLUMN)),
                poverty_rate: cell(POVERTY_RATE_COLUMN),
                snap_percent: cell(SNAP_COLUMN),
            }
        })
        .collect()
}

/// Build one coverage card per row of a filtered coverage table.
pub fn coverage_cards(table: &GeoTable, year: i32, value_col: &str) -> Vec<CoverageCard> {
    let rank_col = rank_column(year);
    table
        .rows()
        .iter()
        .map(|row| CoverageCard {
            tract_id: table
                .cell(row, TRACT_ID_COLUMN)
                .unwrap_or_default()
                .to_string(),
            year,
            value: format_localized(table.cell(row, value_col).unwrap_or_default()),
            rank: table.cell(row, &rank_col).unwrap_or_default().to_string(),
        })
        .collect()
}

/// Localized number formatting: thousands separators on the integer part.
///
/// Cells that are not plain numbers (percentages, text, empty) pass through
/// verbatim.
pub fn format_localized(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.parse::<f64>().is_err() {
        return raw.to_string();
    }

    let (sign, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", trimmed),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GEOMETRY_COLUMN;

    #[test]
    fn test_format_localized() {
        assert_eq!(format_localized("1234567"), "1,234,567");
        assert_eq!(format_localized("52500"), "52,500");
        assert_eq!(format_localized("987"), "987");
        assert_eq!(format_localized("12345.678"), "12,345.678");
        assert_eq!(format_localized("-1234"), "-1,234");
        // Non-numeric cells pass through
        assert_eq!(format_localized("18%"), "18%");
        assert_eq!(format_localized(""), "");
        assert_eq!(format_localized("n/a"), "n/a");
    }

    #[test]
    fn test_zone_cards() {
        let mut table = GeoTable::new(vec![
            ZONE_TRACT_COLUMN.to_string(),
            NTA_NAME_COLUMN.to_string(),
            FOOD_INDEX_COLUMN.to_string(),
            MEDIAN_INCOME_COLUMN.to_string(),
            POVERTY_RATE_COLUMN.to_string(),
            SNAP_COLUMN.to_string(),
            GEOMETRY_COLUMN.to_string(),
        ])
        .unwrap();
        table
            .push_row(vec![
                "101".to_string(),
                "Greenpoint".to_string(),
                "2.5".to_string(),
                "52500".to_string(),
                "18%".to_string(),
                "24%".to_string(),
                "POINT(-73.95 40.73)".to_string(),
            ])
            .unwrap();

        let cards = zone_cards(&table);
        assert_eq!(cards.len(), 1);
        assert_eq!(
            cards[0],
            ZoneCard {
                nta_name: "Greenpoint".to_string(),
                tract_id: "101".to_string(),
                food_index: "2.5".to_string(),
                median_income: "52,500".to_string(),
                poverty_rate: "18%".to_string(),
                snap_percent: "24%".to_string(),
            }
        );
    }

    #[test]
    fn test_coverage_cards() {
        let mut table = GeoTable::new(vec![
            TRACT_ID_COLUMN.to_string(),
            "2003_supermarket coverage ratio".to_string(),
            "2003_rank".to_string(),
            GEOMETRY_COLUMN.to_string(),
        ])
        .unwrap();
        table
            .push_row(vec![
                "101".to_string(),
                "0.25".to_string(),
                "3".to_string(),
                "POINT(-73.95 40.73)".to_string(),
            ])
            .unwrap();

        let cards = coverage_cards(&table, 2003, "2003_supermarket coverage ratio");
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].tract_id, "101");
        assert_eq!(cards[0].value, "0.25");
        assert_eq!(cards[0].rank, "3");
    }

    #[test]
    fn test_empty_table_yields_no_cards() {
        let table = GeoTable::new(vec![GEOMETRY_COLUMN.to_string()]).unwrap();
        assert!(zone_cards(&table).is_empty());
        assert!(coverage_cards(&table, 2003, "x").is_empty());
    }
}
