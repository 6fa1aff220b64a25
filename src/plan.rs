//! Plan execution: a batch of chart requests rendered against one dataset.

use crate::data::Dataset;
use crate::error::Result;
use crate::render;
use crate::request::{BarChart, Histogram, MultiLine};
use crate::transform;
use crate::ScriptSource;
use log::info;
use serde::Deserialize;
use std::path::Path;

/// One chart in a plan: a tagged request plus an optional pre-aggregation.
///
/// With `group_by` set, the chart renders against the row counts per
/// combination of those columns (a derived dataset carrying a "Count"
/// column) instead of the raw rows.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanEntry {
    Bar {
        #[serde(default)]
        group_by: Vec<String>,
        #[serde(flatten)]
        chart: BarChart,
    },
    Histogram {
        #[serde(default)]
        group_by: Vec<String>,
        #[serde(flatten)]
        chart: Histogram,
    },
    MultiLine {
        #[serde(default)]
        group_by: Vec<String>,
        #[serde(flatten)]
        chart: MultiLine,
    },
}

impl PlanEntry {
    pub fn group_by(&self) -> &[String] {
        match self {
            PlanEntry::Bar { group_by, .. }
            | PlanEntry::Histogram { group_by, .. }
            | PlanEntry::MultiLine { group_by, .. } => group_by,
        }
    }

    /// Prefix the entry's output path with the run's output directory.
    /// An absolute output path is left as is.
    pub fn rebase(&mut self, out_dir: &Path) {
        let output_path = match self {
            PlanEntry::Bar { chart, .. } => &mut chart.output_path,
            PlanEntry::Histogram { chart, .. } => &mut chart.output_path,
            PlanEntry::MultiLine { chart, .. } => &mut chart.output_path,
        };
        *output_path = out_dir.join(output_path.as_path());
    }

    pub fn set_script(&mut self, script: ScriptSource) {
        match self {
            PlanEntry::Bar { chart, .. } => chart.document.script = script,
            PlanEntry::Histogram { chart, .. } => chart.document.script = script,
            PlanEntry::MultiLine { chart, .. } => chart.document.script = script,
        }
    }

    /// Render this entry, aggregating first when `group_by` is set.
    pub fn render(&self, data: &Dataset) -> Result<()> {
        let grouped;
        let frame = match self.group_by() {
            [] => data,
            columns => {
                grouped = transform::group_size(data, columns)?;
                &grouped
            }
        };

        match self {
            PlanEntry::Bar { chart, .. } => render::render_bar(frame, chart),
            PlanEntry::Histogram { chart, .. } => render::render_histogram(frame, chart),
            PlanEntry::MultiLine { chart, .. } => render::render_multi_line(frame, chart),
        }
    }
}

/// Parse a plan: a JSON array of tagged chart entries.
pub fn parse(json: &str) -> Result<Vec<PlanEntry>> {
    Ok(serde_json::from_str(json)?)
}

/// Render every entry against the dataset, writing into `out_dir`.
/// Returns the number of documents written. The first failure stops the
/// run; entries already rendered stay on disk.
pub fn execute(
    data: &Dataset,
    mut entries: Vec<PlanEntry>,
    out_dir: &Path,
    script: ScriptSource,
) -> Result<usize> {
    let total = entries.len();
    for (idx, entry) in entries.iter_mut().enumerate() {
        entry.rebase(out_dir);
        entry.set_script(script);
        info!("rendering chart {} of {}", idx + 1, total);
        entry.render(data)?;
    }
    Ok(total)
}

// === Tests ===
