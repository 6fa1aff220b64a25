// Library exports for plotdoc

pub mod csv_reader;
pub mod data;
pub mod document;
pub mod error;
pub mod figure;
pub mod palette;
pub mod plan;
pub mod render;
pub mod request;
pub mod transform;
pub mod util;

pub use data::Dataset;
pub use error::{RenderError, Result};
pub use render::{render_bar, render_histogram, render_multi_line};
pub use request::{BarChart, Histogram, LineSeries, MultiLine, SecondaryAxis};

use serde::Deserialize;

/// Where a document's plotly.js script comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
pub enum ScriptSource {
    /// Reference the pinned CDN build.
    #[serde(rename = "cdn")]
    #[default]
    Cdn,
    /// Reference a plotly.min.js expected next to the document.
    #[serde(rename = "local")]
    Local,
}

/// Document-level settings shared by every chart kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
pub struct DocumentOptions {
    #[serde(default)]
    pub script: ScriptSource,
}
