//! # Page Controller
//!
//! Navigation dispatch over the loaded datasets. The controller opens the
//! seven static files through the catalog once, then renders a view model
//! for whichever page the navigation selector points at. Each interaction
//! re-renders the current page from scratch against the cached, read-only
//! tables; widget state lives in [`AppState`] and nothing else survives a
//! navigation change.

use std::path::PathBuf;
use std::sync::Arc;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::analysis::{
    correlation_matrix, filter_year_range, select_columns, year_bounds, CorrelationMatrix,
};
use crate::catalog::with_catalog;
use crate::choropleth::{choropleth_map, zone_overlay_map, MapConfig, MapView};
use crate::detail::{coverage_cards, zone_cards, CoverageCard, ZoneCard};
use crate::error::Result;
use crate::export::{csv_download_href, share_mailto_link, DownloadLink};
use crate::filter::{cascade, filter_by_rank, rank_options, Selection, ZoneSelection};
use crate::{
    fast_food_value_column, rank_column, supermarket_value_column, GeoTable, PlainTable, YEAR_MIN,
};

// ============================================================================
// Navigation
// ============================================================================

/// The five fixed pages of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Page {
    Home,
    DataAnalysis,
    DataVisualization,
    Comments,
    Guide,
}

impl Page {
    /// All pages, in sidebar order.
    pub const ALL: [Page; 5] = [
        Page::Home,
        Page::DataAnalysis,
        Page::DataVisualization,
        Page::Comments,
        Page::Guide,
    ];

    /// Display title for the navigation selector.
    pub fn title(&self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::DataAnalysis => "Data Analysis",
            Page::DataVisualization => "Data Visualization",
            Page::Comments => "Comments",
            Page::Guide => "Guide",
        }
    }

    /// Sidebar icon for the page.
    pub fn icon(&self) -> &'static str {
        match self {
            Page::Home => "🏠",
            Page::DataAnalysis => "📊",
            Page::DataVisualization => "📈",
            Page::Comments => "💬",
            Page::Guide => "📖",
        }
    }
}

// ============================================================================
// Widget State
// ============================================================================

/// Every widget value the UI framework retains between interactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppState {
    /// Cascading dropdowns on the LILA zones tab.
    pub zone_selection: ZoneSelection,
    /// Year slider on the supermarket tab.
    pub supermarket_year: i32,
    /// Rank selector on the supermarket tab.
    pub supermarket_rank: Selection,
    /// Year slider on the fast food tab.
    pub fast_food_year: i32,
    /// Rank selector on the fast food tab.
    pub fast_food_rank: Selection,
    /// Race columns picked for the income box plot; `None` means all.
    pub income_columns: Option<Vec<String>>,
    /// Year range slider for the convenience store chart; `None` means full.
    pub conv_store_years: Option<(i32, i32)>,
    /// Year range slider for the eating establishment chart; `None` means full.
    pub eating_years: Option<(i32, i32)>,
    /// Columns picked for the correlation heatmap; `None` means all.
    pub correlation_columns: Option<Vec<String>>,
    /// Draft text in the comment box. Never persisted anywhere.
    pub comment_draft: String,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            zone_selection: ZoneSelection::default(),
            supermarket_year: YEAR_MIN,
            supermarket_rank: Selection::All,
            fast_food_year: YEAR_MIN,
            fast_food_rank: Selection::All,
            income_columns: None,
            conv_store_years: None,
            eating_years: None,
            correlation_columns: None,
            comment_draft: String::new(),
        }
    }
}

// ============================================================================
// Dataset Paths
// ============================================================================

/// Locations of the seven static input files, next to the process by
/// default.
#[derive(Debug, Clone)]
pub struct DatasetPaths {
    pub lila_zones: PathBuf,
    pub supermarkets: PathBuf,
    pub fast_food: PathBuf,
    pub socioeconomics: PathBuf,
    pub convenience_stores: PathBuf,
    pub eating_places: PathBuf,
    pub correlation: PathBuf,
}

impl Default for DatasetPaths {
    fn default() -> Self {
        Self {
            lila_zones: PathBuf::from("LILAZones_geo.csv"),
            supermarkets: PathBuf::from("supermarkets.csv"),
            fast_food: PathBuf::from("Fast Food Restaurants.csv"),
            socioeconomics: PathBuf::from("dataset_socioeconomics.csv"),
            convenience_stores: PathBuf::from("dataset_convStores.csv"),
            eating_places: PathBuf::from("dataset_eating.csv"),
            correlation: PathBuf::from("dataset_forCorrPlot.csv"),
        }
    }
}

// ============================================================================
// Page View Models
// ============================================================================

/// Static text page (Home, Guide).
#[derive(Debug, Clone, Serialize)]
pub struct StaticPage {
    pub title: String,
    pub body: Vec<String>,
}

/// The analysis page: filtered chart inputs for the external charting
/// collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisView {
    /// Income-by-race subset for the box plot.
    pub income_by_race: PlainTable,
    /// Convenience store employment rows inside the selected year range.
    pub convenience_employment: PlainTable,
    /// Year slider bounds for the convenience store chart.
    pub convenience_year_bounds: Option<(i32, i32)>,
    /// Eating establishment employment rows inside the selected year range.
    pub eating_employment: PlainTable,
    /// Year slider bounds for the eating establishment chart.
    pub eating_year_bounds: Option<(i32, i32)>,
    /// Correlation matrix for the annotated heatmap.
    pub correlation: CorrelationMatrix,
}

/// The LILA zones tab: cascading dropdowns, overlay map and detail cards.
#[derive(Debug, Clone, Serialize)]
pub struct ZoneTab {
    pub neighborhood_options: Vec<String>,
    pub tract_options: Vec<String>,
    pub selection: ZoneSelection,
    pub map: MapView,
    /// Shown once a specific neighborhood (or tract) is selected.
    pub cards: Vec<ZoneCard>,
}

/// A coverage ratio tab (supermarket or fast food).
#[derive(Debug, Clone, Serialize)]
pub struct CoverageTab {
    pub year: i32,
    pub rank_options: Vec<String>,
    pub selected_rank: Selection,
    pub map: MapView,
    /// Shown only when a specific rank is selected.
    pub cards: Vec<CoverageCard>,
}

/// The visualization page: three tabs plus the sidebar links.
#[derive(Debug, Clone, Serialize)]
pub struct VisualizationView {
    pub zones: ZoneTab,
    pub supermarkets: CoverageTab,
    pub fast_food: CoverageTab,
    pub share_link: String,
    pub download: DownloadLink,
}

/// The comments page. Input is discarded, never stored.
#[derive(Debug, Clone, Serialize)]
pub struct CommentsView {
    pub prompt: String,
}

/// Rendered view model for one page.
#[derive(Debug, Clone, Serialize)]
pub enum PageView {
    Home(StaticPage),
    Analysis(Box<AnalysisView>),
    Visualization(Box<VisualizationView>),
    Comments(CommentsView),
    Guide(StaticPage),
}

// ============================================================================
// Dashboard Controller
// ============================================================================

/// Owns the loaded datasets and renders page view models.
///
/// All seven tables are loaded (memoized) when the controller opens; every
/// `render` call is a pure read over them.
pub struct DashboardController {
    lila_zones: Arc<GeoTable>,
    supermarkets: Arc<GeoTable>,
    fast_food: Arc<GeoTable>,
    socioeconomics: Arc<PlainTable>,
    convenience_stores: Arc<PlainTable>,
    eating_places: Arc<PlainTable>,
    correlation: Arc<PlainTable>,
    map_config: MapConfig,
}

impl DashboardController {
    /// Load every dataset through the global catalog and build a controller.
    pub fn open(paths: &DatasetPaths) -> Result<Self> {
        with_catalog(|catalog| {
            Ok(Self {
                lila_zones: catalog.geo_table(&paths.lila_zones)?,
                supermarkets: catalog.geo_table(&paths.supermarkets)?,
                fast_food: catalog.geo_table(&paths.fast_food)?,
                socioeconomics: catalog.plain_table(&paths.socioeconomics)?,
                convenience_stores: catalog.plain_table(&paths.convenience_stores)?,
                eating_places: catalog.plain_table(&paths.eating_places)?,
                correlation: catalog.plain_table(&paths.correlation)?,
                map_config: MapConfig::default(),
            })
        })
    }

    /// Build a controller from already-loaded tables (used by tests and by
    /// callers with their own catalog).
    #[allow(clippy::too_many_arguments)]
    pub fn from_tables(
        lila_zones: Arc<GeoTable>,
        supermarkets: Arc<GeoTable>,
        fast_food: Arc<GeoTable>,
        socioeconomics: Arc<PlainTable>,
        convenience_stores: Arc<PlainTable>,
        eating_places: Arc<PlainTable>,
        correlation: Arc<PlainTable>,
    ) -> Self {
        Self {
            lila_zones,
            supermarkets,
            fast_food,
            socioeconomics,
            convenience_stores,
            eating_places,
            correlation,
            map_config: MapConfig::default(),
        }
    }

    /// Render the view model for a page.
    pub fn render(&self, page: Page, state: &AppState) -> Result<PageView> {
        info!("[Pages] Rendering {}", page.title());
        match page {
            Page::Home => Ok(PageView::Home(home_page())),
            Page::DataAnalysis => Ok(PageView::Analysis(Box::new(self.analysis_view(state)?))),
            Page::DataVisualization => Ok(PageView::Visualization(Box::new(
                self.visualization_view(state)?,
            ))),
            Page::Comments => Ok(PageView::Comments(CommentsView {
                prompt: "Leave your comments here:".to_string(),
            })),
            Page::Guide => Ok(PageView::Guide(guide_page())),
        }
    }

    /// Accept a submitted comment. The text is logged and discarded; there
    /// is no comment store.
    pub fn submit_comment(&self, text: &str) {
        info!("[Pages] Comment received ({} chars), discarded", text.len());
    }

    fn analysis_view(&self, state: &AppState) -> Result<AnalysisView> {
        let income_columns = state
            .income_columns
            .clone()
            .unwrap_or_else(|| self.socioeconomics.columns().to_vec());
        let income_by_race = select_columns(&self.socioeconomics, &income_columns)?;

        let convenience_year_bounds = year_bounds(&self.convenience_stores, "year");
        let (conv_min, conv_max) = state
            .conv_store_years
            .or(convenience_year_bounds)
            .unwrap_or((i32::MIN, i32::MAX));
        let convenience_employment =
            filter_year_range(&self.convenience_stores, "year", conv_min, conv_max)?;

        let eating_year_bounds = year_bounds(&self.eating_places, "year");
        let (eat_min, eat_max) = state
            .eating_years
            .or(eating_year_bounds)
            .unwrap_or((i32::MIN, i32::MAX));
        let eating_employment =
            filter_year_range(&self.eating_places, "year", eat_min, eat_max)?;

        let correlation_columns = state
            .correlation_columns
            .clone()
            .unwrap_or_else(|| self.correlation.columns().to_vec());
        let correlation = correlation_matrix(&self.correlation, &correlation_columns)?;

        Ok(AnalysisView {
            income_by_race,
            convenience_employment,
            convenience_year_bounds,
            eating_employment,
            eating_year_bounds,
            correlation,
        })
    }

    fn visualization_view(&self, state: &AppState) -> Result<VisualizationView> {
        let zones = self.zone_tab(state);
        let supermarkets = self.coverage_tab(
            &self.supermarkets,
            state.supermarket_year,
            &state.supermarket_rank,
            &supermarket_value_column(state.supermarket_year),
            "Supermarket Coverage Ratio",
        );
        let fast_food = self.coverage_tab(
            &self.fast_food,
            state.fast_food_year,
            &state.fast_food_rank,
            &fast_food_value_column(state.fast_food_year),
            "Fast Food Coverage Ratio",
        );
        let download = csv_download_href(&self.lila_zones, "LILAZones_geo.csv")?;

        Ok(VisualizationView {
            zones,
            supermarkets,
            fast_food,
            share_link: share_mailto_link(),
            download,
        })
    }

    fn zone_tab(&self, state: &AppState) -> ZoneTab {
        let outcome = cascade(&self.lila_zones, &state.zone_selection);
        let map = zone_overlay_map(&outcome.rows, &self.map_config);
        let cards = if outcome.selection.neighborhood.is_all() {
            Vec::new()
        } else {
            zone_cards(&outcome.rows)
        };
        ZoneTab {
            neighborhood_options: outcome.neighborhood_options,
            tract_options: outcome.tract_options,
            selection: outcome.selection,
            map,
            cards,
        }
    }

    fn coverage_tab(
        &self,
        table: &GeoTable,
        year: i32,
        rank: &Selection,
        value_col: &str,
        legend: &str,
    ) -> CoverageTab {
        let rank_col = rank_column(year);
        let options = match rank_options(table, year) {
            Ok(options) => options,
            Err(e) => {
                warn!("[Pages] {}", e);
                Vec::new()
            }
        };

        let map = choropleth_map(table, year, value_col, &rank_col, rank, legend, &self.map_config);

        let cards = match rank {
            Selection::All => Vec::new(),
            Selection::Only(_) => {
                let rows = filter_by_rank(table, &rank_col, rank);
                coverage_cards(&rows, year, value_col)
            }
        };

        CoverageTab {
            year,
            rank_options: options,
            selected_rank: rank.clone(),
            map,
            cards,
        }
    }
}

fn home_page() -> StaticPage {
    StaticPage {
        title: Page::Home.title().to_string(),
        body: vec![
            "Welcome to the Food Desert Analysis App".to_string(),
            "This app helps to analyze food desert regions in Brooklyn.".to_string(),
        ],
    }
}

fn guide_page() -> StaticPage {
    StaticPage {
        title: Page::Guide.title().to_string(),
        body: vec![
            "Use the sidebar to move between pages.".to_string(),
            "Data Analysis: pick races, year ranges and columns to redraw the charts."
                .to_string(),
            "Data Visualization: filter tracts by neighborhood, tract id, year and rank; \
             hover a tract for its details."
                .to_string(),
            "The sidebar offers an email share link and a CSV download of the LILA zone table."
                .to_string(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GEOMETRY_COLUMN, NTA_NAME_COLUMN, TRACT_ID_COLUMN, ZONE_TRACT_COLUMN};

    fn lila_table() -> Arc<GeoTable> {
        let mut table = GeoTable::new(vec![
            ZONE_TRACT_COLUMN.to_string(),
            NTA_NAME_COLUMN.to_string(),
            GEOMETRY_COLUMN.to_string(),
        ])
        .unwrap();
        for (tract, nta) in [("101", "Greenpoint"), ("201", "Bushwick")] {
            table
                .push_row(vec![
                    tract.to_string(),
                    nta.to_string(),
                    "POLYGON((-73.96 40.73,-73.95 40.73,-73.95 40.74,-73.96 40.73))".to_string(),
                ])
                .unwrap();
        }
        Arc::new(table)
    }

    fn coverage_table(value_col: &str) -> Arc<GeoTable> {
        let mut table = GeoTable::new(vec![
            TRACT_ID_COLUMN.to_string(),
            value_col.to_string(),
            "2003_rank".to_string(),
            GEOMETRY_COLUMN.to_string(),
        ])
        .unwrap();
        for (tract, value, rank) in [("101", "0.4", "3"), ("201", "0.9", "7")] {
            table
                .push_row(vec![
                    tract.to_string(),
                    value.to_string(),
                    rank.to_string(),
                    "POINT(-73.95 40.73)".to_string(),
                ])
                .unwrap();
        }
        Arc::new(table)
    }

    fn plain_years() -> Arc<PlainTable> {
        let mut table = PlainTable::new(vec!["year".to_string(), "count_emp_4453".to_string()]);
        for (year, count) in [("2003", "100"), ("2004", "110"), ("2005", "120")] {
            table
                .push_row(vec![year.to_string(), count.to_string()])
                .unwrap();
        }
        Arc::new(table)
    }

    fn numeric_pair() -> Arc<PlainTable> {
        let mut table = PlainTable::new(vec!["a".to_string(), "b".to_string()]);
        for (a, b) in [("1", "2"), ("2", "4"), ("3", "6")] {
            table
                .push_row(vec![a.to_string(), b.to_string()])
                .unwrap();
        }
        Arc::new(table)
    }

    fn controller() -> DashboardController {
        DashboardController::from_tables(
            lila_table(),
            coverage_table("2003_supermarket coverage ratio"),
            coverage_table("2003_Fast Food Coverage Ratio"),
            numeric_pair(),
            plain_years(),
            plain_years(),
            numeric_pair(),
        )
    }

    #[test]
    fn test_page_metadata() {
        assert_eq!(Page::ALL.len(), 5);
        assert_eq!(Page::DataVisualization.title(), "Data Visualization");
        assert_eq!(Page::Comments.icon(), "💬");
    }

    #[test]
    fn test_render_home_and_guide() {
        let controller = controller();
        let state = AppState::default();

        let home = controller.render(Page::Home, &state).unwrap();
        assert!(matches!(home, PageView::Home(_)));

        let guide = controller.render(Page::Guide, &state).unwrap();
        match guide {
            PageView::Guide(page) => assert!(!page.body.is_empty()),
            other => panic!("expected Guide, got {:?}", other),
        }
    }

    #[test]
    fn test_render_comments_discards_input() {
        let controller = controller();
        let view = controller
            .render(Page::Comments, &AppState::default())
            .unwrap();
        assert!(matches!(view, PageView::Comments(_)));
        // No storage to assert against; the call must simply not fail
        controller.submit_comment("the map is great");
    }

    #[test]
    fn test_render_analysis_defaults() {
        let controller = controller();
        let view = controller
            .render(Page::DataAnalysis, &AppState::default())
            .unwrap();

        match view {
            PageView::Analysis(analysis) => {
                assert_eq!(analysis.income_by_race.len(), 3);
                assert_eq!(analysis.convenience_year_bounds, Some((2003, 2005)));
                assert_eq!(analysis.convenience_employment.len(), 3);
                assert_eq!(analysis.correlation.columns.len(), 2);
            }
            other => panic!("expected Analysis, got {:?}", other),
        }
    }

    #[test]
    fn test_render_analysis_with_year_range() {
        let controller = controller();
        let state = AppState {
            conv_store_years: Some((2004, 2005)),
            ..AppState::default()
        };
        let view = controller.render(Page::DataAnalysis, &state).unwrap();

        match view {
            PageView::Analysis(analysis) => {
                assert_eq!(analysis.convenience_employment.len(), 2);
            }
            other => panic!("expected Analysis, got {:?}", other),
        }
    }

    #[test]
    fn test_render_visualization_defaults() {
        let controller = controller();
        let view = controller
            .render(Page::DataVisualization, &AppState::default())
            .unwrap();

        match view {
            PageView::Visualization(viz) => {
                assert_eq!(viz.zones.map.regions.len(), 2);
                assert!(viz.zones.cards.is_empty());
                assert_eq!(viz.supermarkets.rank_options, vec!["3", "7"]);
                assert_eq!(viz.supermarkets.map.regions.len(), 2);
                assert!(viz.supermarkets.cards.is_empty());
                assert!(viz.share_link.starts_with("mailto:"));
                assert!(viz.download.href.starts_with("data:file/csv;base64,"));
            }
            other => panic!("expected Visualization, got {:?}", other),
        }
    }

    #[test]
    fn test_visualization_specific_rank_shows_cards() {
        let controller = controller();
        let state = AppState {
            supermarket_rank: Selection::Only("3".to_string()),
            ..AppState::default()
        };
        let view = controller.render(Page::DataVisualization, &state).unwrap();

        match view {
            PageView::Visualization(viz) => {
                assert_eq!(viz.supermarkets.map.regions.len(), 1);
                assert_eq!(viz.supermarkets.cards.len(), 1);
                assert_eq!(viz.supermarkets.cards[0].tract_id, "101");
            }
            other => panic!("expected Visualization, got {:?}", other),
        }
    }

    #[test]
    fn test_visualization_missing_year_columns_warn_not_crash() {
        let controller = controller();
        let state = AppState {
            supermarket_year: 2010, // fixture only has 2003 columns
            ..AppState::default()
        };
        let view = controller.render(Page::DataVisualization, &state).unwrap();

        match view {
            PageView::Visualization(viz) => {
                assert!(viz.supermarkets.rank_options.is_empty());
                assert!(viz.supermarkets.map.regions.is_empty());
                assert!(viz.supermarkets.map.warning.is_some());
            }
            other => panic!("expected Visualization, got {:?}", other),
        }
    }

    #[test]
    fn test_open_loads_all_datasets_through_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let write = |name: &str, contents: &str| {
            let path = dir.path().join(name);
            std::fs::write(&path, contents).unwrap();
            path
        };

        let geo_csv = "TRACTCE,Census Tract Area,NTA Name,\
                       2003_supermarket coverage ratio,2003_Fast Food Coverage Ratio,\
                       2003_rank,geometry\n\
                       101,101,Greenpoint,0.4,0.2,3,POINT(-73.95 40.73)\n";
        let plain_csv = "year,a,b\n2003,1,2\n2004,2,4\n";

        let paths = DatasetPaths {
            lila_zones: write("LILAZones_geo.csv", geo_csv),
            supermarkets: write("supermarkets.csv", geo_csv),
            fast_food: write("Fast Food Restaurants.csv", geo_csv),
            socioeconomics: write("dataset_socioeconomics.csv", plain_csv),
            convenience_stores: write("dataset_convStores.csv", plain_csv),
            eating_places: write("dataset_eating.csv", plain_csv),
            correlation: write("dataset_forCorrPlot.csv", plain_csv),
        };

        let controller = DashboardController::open(&paths).unwrap();
        let view = controller
            .render(Page::DataVisualization, &AppState::default())
            .unwrap();
        assert!(matches!(view, PageView::Visualization(_)));

        // Second open hits the memoized tables
        let again = DashboardController::open(&paths).unwrap();
        assert!(Arc::ptr_eq(&controller.lila_zones, &again.lila_zones));
    }

    #[test]
    fn test_zone_tab_cascade_backfill() {
        let controller = controller();
        let state = AppState {
            zone_selection: ZoneSelection {
                neighborhood: Selection::All,
                tract: Selection::Only("101".to_string()),
            },
            ..AppState::default()
        };
        let view = controller.render(Page::DataVisualization, &state).unwrap();

        match view {
            PageView::Visualization(viz) => {
                assert_eq!(viz.zones.map.regions.len(), 1);
                assert_eq!(
                    viz.zones.selection.neighborhood,
                    Selection::Only("Greenpoint".to_string())
                );
                assert_eq!(viz.zones.cards.len(), 1);
            }
            other => panic!("expected Visualization, got {:?}", other),
        }
    }
}
