//! HTML document output.
//!
//! A figure is serialized once and embedded in a fixed page template, so
//! rendering the same figure twice produces byte-identical documents.

use crate::error::Result;
use crate::{DocumentOptions, ScriptSource};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Suffix appended to bar chart output paths.
pub const BAR_SUFFIX: &str = "_BAR.html";
/// Suffix appended to histogram output paths.
pub const HISTOGRAM_SUFFIX: &str = "_HIST.html";
/// Suffix appended to multi-line chart output paths.
pub const LINE_SUFFIX: &str = ".html";

/// Pinned plotly.js build referenced from the CDN template.
pub const PLOTLY_CDN_URL: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Script file name expected next to documents written in local mode.
pub const PLOTLY_LOCAL_FILE: &str = "plotly.min.js";

/// Append a document suffix to a base path.
pub fn output_path(base: &Path, suffix: &str) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Build the full HTML page around a serialized figure.
pub fn render_html(figure_json: &str, options: &DocumentOptions) -> String {
    let script_src = match options.script {
        ScriptSource::Cdn => PLOTLY_CDN_URL,
        ScriptSource::Local => PLOTLY_LOCAL_FILE,
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8" />
<script src="{}"></script>
</head>
<body>
<div id="plotdoc" class="plotly-graph-div" style="height:100%; width:100%;"></div>
<script type="text/javascript">
var figure = {};
Plotly.newPlot("plotdoc", figure.data, figure.layout);
</script>
</body>
</html>
"#,
        script_src, figure_json
    )
}

/// Serialize a figure and write the document at `base` + `suffix`.
///
/// Returns the path written. Nothing is written if serialization fails.
pub fn write_figure(
    base: &Path,
    suffix: &str,
    figure: &Value,
    options: &DocumentOptions,
) -> Result<PathBuf> {
    let path = output_path(base, suffix);
    let json = serde_json::to_string(figure)?;
    let html = render_html(&json, options);
    fs::write(&path, html)?;
    Ok(path)
}

// === Tests ===
