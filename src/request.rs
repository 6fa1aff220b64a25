//! Chart requests.
//!
//! One struct per chart kind. Required fields go through `new`; everything
//! optional has a serde default, so requests deserialize from plan JSON or
//! build up through the `with_*` setters.

use crate::palette;
use crate::DocumentOptions;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// How bar series stack against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarMode {
    Group,
    Stack,
    Overlay,
    Relative,
}

/// Distribution plot drawn above a histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Marginal {
    Box,
    Violin,
}

fn default_series_color() -> String {
    palette::DEFAULT_SERIES_COLOR.to_string()
}

fn default_histogram_opacity() -> f64 {
    palette::HISTOGRAM_OPACITY
}

fn default_secondary_range() -> [f64; 2] {
    [0.0, 10.0]
}

fn default_true() -> bool {
    true
}

// === Bar ===

/// Request for a bar chart document.
///
/// Without `y`, the chart plots per-category counts of `x`. With `y`, the
/// two columns plot directly and may be split into colored series, arranged
/// by `barmode`, and faceted into a panel grid.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BarChart {
    pub x: String,
    #[serde(default)]
    pub y: Option<String>,
    pub title: String,
    #[serde(default)]
    pub x_title: Option<String>,
    #[serde(default)]
    pub y_title: Option<String>,
    /// Base output path; the bar document suffix is appended on write.
    pub output_path: PathBuf,
    #[serde(default = "default_series_color")]
    pub color: String,
    #[serde(default)]
    pub barmode: Option<BarMode>,
    #[serde(default)]
    pub split_by: Option<String>,
    #[serde(default)]
    pub facet_row: Option<String>,
    #[serde(default)]
    pub facet_col: Option<String>,
    /// Column display renames. Keys are column names, values replace them
    /// in axis titles, legend titles and facet labels.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Free-form layout patch applied after the figure is built.
    #[serde(default)]
    pub layout_updates: Option<Value>,
    #[serde(default)]
    pub document: DocumentOptions,
}

impl BarChart {
    pub fn new(
        x: impl Into<String>,
        title: impl Into<String>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            x: x.into(),
            y: None,
            title: title.into(),
            x_title: None,
            y_title: None,
            output_path: output_path.into(),
            color: default_series_color(),
            barmode: None,
            split_by: None,
            facet_row: None,
            facet_col: None,
            labels: BTreeMap::new(),
            layout_updates: None,
            document: DocumentOptions::default(),
        }
    }

    pub fn with_y(mut self, column: impl Into<String>) -> Self {
        self.y = Some(column.into());
        self
    }

    pub fn with_axis_titles(mut self, x_title: impl Into<String>, y_title: impl Into<String>) -> Self {
        self.x_title = Some(x_title.into());
        self.y_title = Some(y_title.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_barmode(mut self, barmode: BarMode) -> Self {
        self.barmode = Some(barmode);
        self
    }

    pub fn with_split(mut self, column: impl Into<String>) -> Self {
        self.split_by = Some(column.into());
        self
    }

    pub fn with_facet_row(mut self, column: impl Into<String>) -> Self {
        self.facet_row = Some(column.into());
        self
    }

    pub fn with_facet_col(mut self, column: impl Into<String>) -> Self {
        self.facet_col = Some(column.into());
        self
    }

    pub fn with_label(mut self, column: impl Into<String>, display: impl Into<String>) -> Self {
        self.labels.insert(column.into(), display.into());
        self
    }

    pub fn with_layout_updates(mut self, updates: Value) -> Self {
        self.layout_updates = Some(updates);
        self
    }

    pub fn with_document_options(mut self, document: DocumentOptions) -> Self {
        self.document = document;
        self
    }

    /// Display name for a column after label renaming.
    pub fn display_name<'a>(&'a self, column: &'a str) -> &'a str {
        self.labels.get(column).map(String::as_str).unwrap_or(column)
    }
}

// === Histogram ===

/// Request for a histogram document.
///
/// `marginal` and `secondary` are mutually exclusive: the marginal plot
/// replaces the overlay path.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Histogram {
    pub x: String,
    /// Legend name for the primary trace.
    pub name: String,
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    /// Base output path; the histogram document suffix is appended on write.
    pub output_path: PathBuf,
    #[serde(default = "default_histogram_opacity")]
    pub opacity: f64,
    #[serde(default = "default_series_color")]
    pub color: String,
    #[serde(default)]
    pub marginal: Option<Marginal>,
    #[serde(default)]
    pub log_x: bool,
    #[serde(default)]
    pub log_y: bool,
    /// Upper bound on bin count, forwarded to the figure untouched.
    #[serde(default)]
    pub nbins: Option<usize>,
    #[serde(default)]
    pub secondary: Option<SecondaryAxis>,
    #[serde(default)]
    pub document: DocumentOptions,
}

impl Histogram {
    pub fn new(
        x: impl Into<String>,
        name: impl Into<String>,
        title: impl Into<String>,
        x_title: impl Into<String>,
        y_title: impl Into<String>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            x: x.into(),
            name: name.into(),
            title: title.into(),
            x_title: x_title.into(),
            y_title: y_title.into(),
            output_path: output_path.into(),
            opacity: default_histogram_opacity(),
            color: default_series_color(),
            marginal: None,
            log_x: false,
            log_y: false,
            nbins: None,
            secondary: None,
            document: DocumentOptions::default(),
        }
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_marginal(mut self, marginal: Marginal) -> Self {
        self.marginal = Some(marginal);
        self
    }

    pub fn with_log_x(mut self) -> Self {
        self.log_x = true;
        self
    }

    pub fn with_log_y(mut self) -> Self {
        self.log_y = true;
        self
    }

    pub fn with_nbins(mut self, nbins: usize) -> Self {
        self.nbins = Some(nbins);
        self
    }

    pub fn with_secondary(mut self, secondary: SecondaryAxis) -> Self {
        self.secondary = Some(secondary);
        self
    }

    pub fn with_document_options(mut self, document: DocumentOptions) -> Self {
        self.document = document;
        self
    }
}

/// Second histogram overlaid on its own right-hand y axis.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SecondaryAxis {
    pub x: String,
    /// Legend name for the secondary trace.
    pub name: String,
    #[serde(default)]
    pub opacity: Option<f64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub nbins: Option<usize>,
    /// Fixed display range of the secondary y axis.
    #[serde(default = "default_secondary_range")]
    pub range: [f64; 2],
}

impl SecondaryAxis {
    pub fn new(x: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            name: name.into(),
            opacity: None,
            title: None,
            nbins: None,
            range: default_secondary_range(),
        }
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_nbins(mut self, nbins: usize) -> Self {
        self.nbins = Some(nbins);
        self
    }

    pub fn with_range(mut self, range: [f64; 2]) -> Self {
        self.range = range;
        self
    }
}

// === Multi-line ===

/// One line of a multi-line chart: the column it reads and its legend name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LineSeries {
    pub column: String,
    pub name: String,
}

impl LineSeries {
    pub fn new(column: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            name: name.into(),
        }
    }
}

/// Request for a multi-line chart document.
///
/// Two series are required and a third is optional; colors are fixed by
/// position. The x axis carries a range slider unless switched off.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MultiLine {
    pub x: String,
    pub first: LineSeries,
    pub second: LineSeries,
    #[serde(default)]
    pub third: Option<LineSeries>,
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    /// Base output path; the document suffix is appended on write.
    pub output_path: PathBuf,
    #[serde(default)]
    pub reverse_x: bool,
    #[serde(default = "default_true")]
    pub range_slider: bool,
    #[serde(default)]
    pub document: DocumentOptions,
}

impl MultiLine {
    pub fn new(
        x: impl Into<String>,
        first: LineSeries,
        second: LineSeries,
        title: impl Into<String>,
        x_title: impl Into<String>,
        y_title: impl Into<String>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            x: x.into(),
            first,
            second,
            third: None,
            title: title.into(),
            x_title: x_title.into(),
            y_title: y_title.into(),
            output_path: output_path.into(),
            reverse_x: false,
            range_slider: default_true(),
            document: DocumentOptions::default(),
        }
    }

    pub fn with_third(mut self, series: LineSeries) -> Self {
        self.third = Some(series);
        self
    }

    pub fn with_reversed_x(mut self) -> Self {
        self.reverse_x = true;
        self
    }

    pub fn with_range_slider(mut self, visible: bool) -> Self {
        self.range_slider = visible;
        self
    }

    pub fn with_document_options(mut self, document: DocumentOptions) -> Self {
        self.document = document;
        self
    }

    /// The two or three series in drawing order.
    pub fn series(&self) -> Vec<&LineSeries> {
        let mut all = vec![&self.first, &self.second];
        if let Some(third) = &self.third {
            all.push(third);
        }
        all
    }
}

// === Tests ===
