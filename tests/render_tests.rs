use plotdoc::data::Dataset;
use plotdoc::document::PLOTLY_CDN_URL;
use plotdoc::request::SecondaryAxis;
use plotdoc::{
    plan, render_bar, render_histogram, render_multi_line, BarChart, DocumentOptions, Histogram,
    LineSeries, MultiLine, RenderError, ScriptSource,
};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Base output path (no suffix) inside the per-crate test tmpdir.
fn out_base(name: &str) -> PathBuf {
    Path::new(env!("CARGO_TARGET_TMPDIR")).join(name)
}

/// Pull the embedded figure JSON back out of a written document.
fn read_figure(path: &Path) -> Value {
    let html = fs::read_to_string(path).expect("Failed to read document");
    let marker = "var figure = ";
    let start = html.find(marker).expect("figure assignment missing") + marker.len();
    let end = html[start..].find(";\n").expect("figure assignment unterminated") + start;
    serde_json::from_str(&html[start..end]).expect("embedded figure is not valid JSON")
}

fn store_dataset() -> Dataset {
    Dataset::new(
        vec!["type_store".to_string(), "sales".to_string()],
        vec![
            vec!["A".to_string(), "10".to_string()],
            vec!["A".to_string(), "12".to_string()],
            vec!["B".to_string(), "7".to_string()],
        ],
    )
}

fn amount_dataset() -> Dataset {
    Dataset::new(
        vec!["total".to_string(), "amount".to_string()],
        vec![
            vec!["1.5".to_string(), "100".to_string()],
            vec!["2.5".to_string(), "200".to_string()],
            vec!["3.5".to_string(), "150".to_string()],
        ],
    )
}

fn weekly_chart(base: &Path) -> MultiLine {
    MultiLine::new(
        "week",
        LineSeries::new("sales", "Sales"),
        LineSeries::new("returns", "Returns"),
        "Weekly",
        "Week",
        "Value",
        base,
    )
}

fn weekly_dataset() -> Dataset {
    Dataset::new(
        vec!["week".to_string(), "sales".to_string(), "returns".to_string()],
        vec![
            vec!["1".to_string(), "100".to_string(), "5".to_string()],
            vec!["2".to_string(), "120".to_string(), "8".to_string()],
        ],
    )
}

#[test]
fn test_end_to_end_bar_counts_document() {
    let base = out_base("bar_counts");
    let chart = BarChart::new("type_store", "Stores", &base);
    render_bar(&store_dataset(), &chart).expect("render failed");

    let path = out_base("bar_counts_BAR.html");
    assert!(path.is_file(), "expected document at {}", path.display());
    assert!(!base.exists(), "base path must not be written");

    let figure = read_figure(&path);
    assert_eq!(figure["data"][0]["x"], json!(["A", "B"]));
    assert_eq!(figure["data"][0]["y"], json!([2, 1]));
    assert_eq!(figure["layout"]["title"]["text"], "Stores");

    let html = fs::read_to_string(&path).unwrap();
    assert!(html.contains(PLOTLY_CDN_URL), "document must pin the CDN script");
}

#[test]
fn test_end_to_end_bar_layout_updates() {
    let base = out_base("bar_updates");
    let chart = BarChart::new("type_store", "Stores", &base)
        .with_y("sales")
        .with_layout_updates(json!({"xaxis": {"showgrid": false}, "height": 400}));
    render_bar(&store_dataset(), &chart).expect("render failed");

    let figure = read_figure(&out_base("bar_updates_BAR.html"));
    assert_eq!(figure["layout"]["height"], 400);
    assert_eq!(figure["layout"]["xaxis"]["showgrid"], false);
    // untouched keys survive the patch
    assert_eq!(figure["layout"]["xaxis"]["title"]["text"], "type_store");
}

#[test]
fn test_end_to_end_histogram_secondary_axis() {
    let base = out_base("hist_secondary");
    let chart = Histogram::new("total", "Total", "Totals", "Total", "Frequency", &base)
        .with_nbins(850)
        .with_secondary(
            SecondaryAxis::new("amount", "Amount")
                .with_opacity(0.6)
                .with_range([0.0, 400.0]),
        );
    render_histogram(&amount_dataset(), &chart).expect("render failed");

    let path = out_base("hist_secondary_HIST.html");
    assert!(path.is_file(), "expected document at {}", path.display());

    let figure = read_figure(&path);
    assert_eq!(figure["data"][0]["nbinsx"], 850);
    assert_eq!(figure["data"][0]["marker"]["line"]["width"], 0.5);
    assert_eq!(figure["data"][1]["yaxis"], "y2");
    assert_eq!(figure["layout"]["yaxis2"]["range"], json!([0.0, 400.0]));
    assert_eq!(figure["layout"]["yaxis2"]["showgrid"], false);
}

#[test]
fn test_end_to_end_multi_line_document() {
    let base = out_base("weekly");
    render_multi_line(&weekly_dataset(), &weekly_chart(&base)).expect("render failed");

    let path = out_base("weekly.html");
    assert!(path.is_file(), "expected document at {}", path.display());

    let figure = read_figure(&path);
    assert_eq!(figure["data"][0]["line"]["color"], "#01295C");
    assert_eq!(figure["data"][1]["line"]["color"], "#EB2226");
    assert_eq!(figure["layout"]["xaxis"]["rangeslider"]["visible"], true);
}

#[test]
fn test_end_to_end_byte_stable_rerender() {
    let base = out_base("stable");
    let chart = BarChart::new("type_store", "Stores", &base).with_y("sales");
    let path = out_base("stable_BAR.html");

    render_bar(&store_dataset(), &chart).expect("first render failed");
    let first = fs::read(&path).unwrap();
    render_bar(&store_dataset(), &chart).expect("second render failed");
    let second = fs::read(&path).unwrap();
    assert_eq!(first, second, "re-rendering must be byte-stable");
}

#[test]
fn test_end_to_end_unknown_column_writes_no_file() {
    let base = out_base("missing_col");
    let data = store_dataset();

    let err = render_bar(&data, &BarChart::new("nope", "T", &base)).unwrap_err();
    assert!(matches!(err, RenderError::Config(_)), "got {:?}", err);

    let err = render_histogram(
        &data,
        &Histogram::new("nope", "N", "T", "X", "Y", &base),
    )
    .unwrap_err();
    assert!(matches!(err, RenderError::Config(_)), "got {:?}", err);

    let err = render_multi_line(&weekly_dataset(), &weekly_chart(&base).with_third(
        LineSeries::new("nope", "Nope"),
    ))
    .unwrap_err();
    assert!(matches!(err, RenderError::Config(_)), "got {:?}", err);

    for suffix in ["_BAR.html", "_HIST.html", ".html"] {
        let path = out_base(&format!("missing_col{}", suffix));
        assert!(!path.exists(), "no file may be written on a config error");
    }
}

#[test]
fn test_end_to_end_local_script_document() {
    let base = out_base("local_js");
    let chart = BarChart::new("type_store", "Stores", &base).with_document_options(
        DocumentOptions {
            script: ScriptSource::Local,
        },
    );
    render_bar(&store_dataset(), &chart).expect("render failed");

    let html = fs::read_to_string(out_base("local_js_BAR.html")).unwrap();
    assert!(html.contains(r#"src="plotly.min.js""#));
    assert!(!html.contains("cdn.plot.ly"));
}

#[test]
fn test_end_to_end_plan_with_group_by() {
    let out_dir = out_base("plan_out");
    fs::create_dir_all(&out_dir).unwrap();

    let plan_json = r#"[
        {"kind": "bar", "group_by": ["type_store"], "x": "type_store", "y": "Count",
         "title": "Store counts", "output_path": "store_counts"}
    ]"#;
    let entries = plan::parse(plan_json).expect("plan must parse");
    let written = plan::execute(&store_dataset(), entries, &out_dir, ScriptSource::Cdn)
        .expect("plan execution failed");
    assert_eq!(written, 1);

    let figure = read_figure(&out_dir.join("store_counts_BAR.html"));
    assert_eq!(figure["data"][0]["x"], json!(["A", "B"]));
    assert_eq!(figure["data"][0]["y"], json!([2, 1]));
}
