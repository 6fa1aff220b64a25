//! Fixed colors used by the chart builders.

/// Default fill for single-series bars and histograms.
pub const DEFAULT_SERIES_COLOR: &str = "#273bd8";

/// Colors assigned to split series, in category order.
pub const SPLIT_PALETTE: [&str; 10] = [
    "#636efa", "#ef553b", "#00cc96", "#ab63fa", "#ffa15a", "#19d3f3", "#ff6692", "#b6e880",
    "#ff97ff", "#fecb52",
];

/// Per-position colors for multi-line charts: navy, red, grey.
pub const LINE_COLORS: [&str; 3] = ["#01295C", "#EB2226", "#777777"];

/// Opacity applied to every multi-line trace.
pub const LINE_OPACITY: f64 = 0.8;

/// Opacity of the category-counts bar trace.
pub const COUNT_BAR_OPACITY: f64 = 0.8;

/// Default opacity of the primary histogram trace.
pub const HISTOGRAM_OPACITY: f64 = 0.75;

/// Outline width forced onto the first histogram trace.
pub const HISTOGRAM_BAR_OUTLINE: f64 = 0.5;

/// Color for a split series, cycling when there are more series than colors.
pub fn split_color(index: usize) -> &'static str {
    SPLIT_PALETTE[index % SPLIT_PALETTE.len()]
}
