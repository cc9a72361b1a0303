//! # Export & Sharing
//!
//! Client-side CSV reproduction of a loaded table plus the two sidebar
//! links: the base64 download href and the mail-to share link. Nothing here
//! touches the network.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;

use crate::error::{AtlasError, Result};
use crate::GeoTable;

/// Published URL of the hosted dashboard, baked into the share link.
pub const APP_URL: &str = "https://samplefooddesert01.streamlit.app/";

/// Share message body text.
pub const SHARE_TEXT: &str = "Check out this Food Desert Analysis App!";

/// A client-side download: data URI plus the suggested file name.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadLink {
    pub href: String,
    pub filename: String,
}

/// Serialize a table back to CSV: UTF-8, comma-delimited, header row,
/// identical column set and order.
///
/// Cells were kept verbatim at load (including the WKT geometry text), so
/// the output reproduces the source file.
pub fn table_to_csv(table: &GeoTable) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.cells())?;
    }

    let bytes = writer.into_inner().map_err(|e| AtlasError::Csv {
        message: e.to_string(),
    })?;
    String::from_utf8(bytes).map_err(|e| AtlasError::Internal {
        message: e.to_string(),
    })
}

/// Build a `data:` URI download link for a table.
pub fn csv_download_href(table: &GeoTable, filename: &str) -> Result<DownloadLink> {
    let csv = table_to_csv(table)?;
    let encoded = STANDARD.encode(csv.as_bytes());
    Ok(DownloadLink {
        href: format!("data:file/csv;base64,{encoded}"),
        filename: filename.to_string(),
    })
}

/// Build the mail-to share link: fixed subject, share text and app URL in
/// the body, separated by an encoded newline. No network call is made.
pub fn share_mailto_link() -> String {
    format!("mailto:?subject=Food Desert Analysis App&body={SHARE_TEXT}%0A{APP_URL}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GEOMETRY_COLUMN, ZONE_TRACT_COLUMN};

    fn lila_table() -> GeoTable {
        let mut table = GeoTable::new(vec![
            ZONE_TRACT_COLUMN.to_string(),
            "NTA Name".to_string(),
            GEOMETRY_COLUMN.to_string(),
        ])
        .unwrap();
        table
            .push_row(vec![
                "101".to_string(),
                "Greenpoint".to_string(),
                "POLYGON((-73.96 40.73,-73.95 40.73,-73.95 40.74,-73.96 40.73))".to_string(),
            ])
            .unwrap();
        table
            .push_row(vec![
                "201".to_string(),
                "Bushwick".to_string(),
                "POINT(-73.92 40.69)".to_string(),
            ])
            .unwrap();
        table
    }

    #[test]
    fn test_csv_round_trip() {
        let table = lila_table();
        let csv = table_to_csv(&table).unwrap();

        // Re-parse through the loader path
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, csv.as_bytes()).unwrap();
        std::io::Write::flush(&mut file).unwrap();
        let reloaded = crate::load_geo_table(file.path()).unwrap();

        assert_eq!(reloaded.len(), table.len());
        assert_eq!(reloaded.columns(), table.columns());
        assert_eq!(&reloaded, &table);
    }

    #[test]
    fn test_csv_has_header_row() {
        let table = lila_table();
        let csv = table_to_csv(&table).unwrap();
        let first_line = csv.lines().next().unwrap();
        assert_eq!(first_line, "Census Tract Area,NTA Name,geometry");
    }

    #[test]
    fn test_download_href() {
        let table = lila_table();
        let link = csv_download_href(&table, "LILAZones_geo.csv").unwrap();

        assert!(link.href.starts_with("data:file/csv;base64,"));
        assert_eq!(link.filename, "LILAZones_geo.csv");

        let encoded = link.href.strip_prefix("data:file/csv;base64,").unwrap();
        let decoded = STANDARD.decode(encoded).unwrap();
        assert_eq!(
            String::from_utf8(decoded).unwrap(),
            table_to_csv(&table).unwrap()
        );
    }

    #[test]
    fn test_share_mailto_link() {
        let link = share_mailto_link();
        assert!(link.starts_with("mailto:?subject=Food Desert Analysis App"));
        assert!(link.contains(SHARE_TEXT));
        assert!(link.contains("%0A"));
        assert!(link.ends_with(APP_URL));
    }
}
