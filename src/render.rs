//! Figure builders and the render entry points.
//!
//! Each operation validates its request against the dataset, builds a
//! [`Figure`], and writes exactly one HTML document. A failed validation
//! surfaces before anything touches the filesystem.

use crate::data::Dataset;
use crate::document;
use crate::error::{RenderError, Result};
use crate::figure::{
    merge_value, Annotation, Axis, AxisKind, BarTrace, BoxTrace, Figure, Grid, HistogramTrace,
    Layout, Legend, Line, Marker, RangeSlider, ScatterTrace, Title, Trace, ViolinTrace,
};
use crate::palette;
use crate::request::{BarChart, Histogram, Marginal, MultiLine};
use crate::transform;
use log::debug;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Vertical share of the plot area taken by the main histogram when a
/// marginal plot sits above it.
const MARGINAL_MAIN_DOMAIN: [f64; 2] = [0.0, 0.74];
const MARGINAL_PANEL_DOMAIN: [f64; 2] = [0.76, 1.0];

// === Entry points ===

/// Render a bar chart document. The output lands at the request's base
/// path with the bar suffix appended.
pub fn render_bar(data: &Dataset, chart: &BarChart) -> Result<()> {
    let figure = build_bar_figure(data, chart)?;
    let mut value = figure.to_value()?;
    if let Some(updates) = &chart.layout_updates {
        if let Some(layout) = value.get_mut("layout") {
            merge_value(layout, updates);
        }
    }
    let path = document::write_figure(
        &chart.output_path,
        document::BAR_SUFFIX,
        &value,
        &chart.document,
    )?;
    debug!("wrote bar chart {}", path.display());
    Ok(())
}

/// Render a histogram document, either with a marginal distribution plot
/// or with an optional secondary-axis overlay.
pub fn render_histogram(data: &Dataset, chart: &Histogram) -> Result<()> {
    let figure = build_histogram_figure(data, chart)?;
    let value = figure.to_value()?;
    let path = document::write_figure(
        &chart.output_path,
        document::HISTOGRAM_SUFFIX,
        &value,
        &chart.document,
    )?;
    debug!("wrote histogram {}", path.display());
    Ok(())
}

/// Render a multi-line chart document with two or three series.
pub fn render_multi_line(data: &Dataset, chart: &MultiLine) -> Result<()> {
    let figure = build_multi_line_figure(data, chart)?;
    let value = figure.to_value()?;
    let path = document::write_figure(
        &chart.output_path,
        document::LINE_SUFFIX,
        &value,
        &chart.document,
    )?;
    debug!("wrote multi-line chart {}", path.display());
    Ok(())
}

// === Bar ===

fn build_bar_figure(data: &Dataset, chart: &BarChart) -> Result<Figure> {
    validate_bar(data, chart)?;
    match &chart.y {
        None => build_count_bar(data, chart),
        Some(y_col) => build_xy_bar(data, chart, y_col),
    }
}

/// Every column a bar request names must exist, whichever path runs.
fn validate_bar(data: &Dataset, chart: &BarChart) -> Result<()> {
    data.column_index(&chart.x)?;
    for column in [
        &chart.y,
        &chart.split_by,
        &chart.facet_row,
        &chart.facet_col,
    ]
    .into_iter()
    .flatten()
    {
        data.column_index(column)?;
    }
    Ok(())
}

/// Single trace of per-category counts of the x column.
fn build_count_bar(data: &Dataset, chart: &BarChart) -> Result<Figure> {
    let counts = transform::value_counts(data, &chart.x)?;
    let (labels, values): (Vec<Value>, Vec<Value>) = counts
        .into_iter()
        .map(|(label, count)| (Value::from(label), Value::from(count)))
        .unzip();

    let trace = Trace::Bar(BarTrace {
        x: labels,
        y: values,
        name: Some(chart.x.clone()),
        marker: Some(Marker {
            color: Some(chart.color.clone()),
            line: None,
        }),
        opacity: Some(palette::COUNT_BAR_OPACITY),
        ..Default::default()
    });

    let x_text = chart
        .x_title
        .clone()
        .unwrap_or_else(|| chart.display_name(&chart.x).to_string());
    let y_text = chart.y_title.clone().unwrap_or_else(|| "count".to_string());

    let layout = Layout {
        title: Some(Title::new(chart.title.clone())),
        xaxis: Some(titled_axis(&x_text)),
        yaxis: Some(titled_axis(&y_text)),
        ..Default::default()
    };

    Ok(Figure {
        data: vec![trace],
        layout,
    })
}

/// One sub-dataset per facet cell, row-major, with its panel labels.
struct Panel {
    row_label: Option<String>,
    col_label: Option<String>,
    data: Dataset,
}

fn facet_panels(data: &Dataset, chart: &BarChart) -> Result<(Vec<Panel>, usize, usize)> {
    let (mut panels, nrows, ncols) = match (&chart.facet_row, &chart.facet_col) {
        (None, None) => (Vec::new(), 1, 1),
        (None, Some(col)) => {
            let parts = transform::partition(data, col)?;
            let ncols = parts.len();
            let panels = parts
                .into_iter()
                .map(|(label, data)| Panel {
                    row_label: None,
                    col_label: Some(label),
                    data,
                })
                .collect();
            (panels, 1, ncols)
        }
        (Some(row), None) => {
            let parts = transform::partition(data, row)?;
            let nrows = parts.len();
            let panels = parts
                .into_iter()
                .map(|(label, data)| Panel {
                    row_label: Some(label),
                    col_label: None,
                    data,
                })
                .collect();
            (panels, nrows, 1)
        }
        (Some(row), Some(col)) => {
            let col_keys: Vec<String> = transform::partition(data, col)?
                .into_iter()
                .map(|(key, _)| key)
                .collect();
            let row_parts = transform::partition(data, row)?;
            let nrows = row_parts.len();
            let ncols = col_keys.len();

            let mut panels = Vec::new();
            for (row_label, row_data) in row_parts {
                let mut by_col: HashMap<String, Dataset> =
                    transform::partition(&row_data, col)?.into_iter().collect();
                for col_key in &col_keys {
                    let cell = by_col
                        .remove(col_key)
                        .unwrap_or_else(|| Dataset::new(row_data.headers.clone(), Vec::new()));
                    panels.push(Panel {
                        row_label: Some(row_label.clone()),
                        col_label: Some(col_key.clone()),
                        data: cell,
                    });
                }
            }
            (panels, nrows, ncols)
        }
    };

    // A facet over zero rows still renders one empty panel.
    if panels.is_empty() {
        panels.push(Panel {
            row_label: None,
            col_label: None,
            data: data.clone(),
        });
        return Ok((panels, 1, 1));
    }
    Ok((panels, nrows, ncols))
}

/// Direct x/y bars, optionally split into colored series and faceted into
/// a grid of panels with shared axis scales.
fn build_xy_bar(data: &Dataset, chart: &BarChart, y_col: &str) -> Result<Figure> {
    let faceted = chart.facet_row.is_some() || chart.facet_col.is_some();
    let (panels, nrows, ncols) = facet_panels(data, chart)?;

    // The x column is typed once over the full dataset so every panel and
    // split group serializes it the same way.
    let x_numeric = transform::column_is_numeric(data, &chart.x)?;

    // Color assignment follows the global order of split values so a value
    // keeps its color in every panel.
    let split_order: HashMap<String, usize> = match &chart.split_by {
        Some(split_col) => transform::partition(data, split_col)?
            .into_iter()
            .enumerate()
            .map(|(idx, (value, _))| (value, idx))
            .collect(),
        None => HashMap::new(),
    };

    let mut traces = Vec::new();
    let mut seen_series: HashSet<String> = HashSet::new();

    for (panel_idx, panel) in panels.iter().enumerate() {
        let axis_id = panel_idx + 1;
        let (trace_xaxis, trace_yaxis) = if faceted {
            (Some(axis_name("x", axis_id)), Some(axis_name("y", axis_id)))
        } else {
            (None, None)
        };

        match &chart.split_by {
            None => {
                traces.push(Trace::Bar(BarTrace {
                    x: transform::typed_column(&panel.data, &chart.x, x_numeric)?,
                    y: transform::numeric_column(&panel.data, y_col)?,
                    marker: Some(Marker {
                        color: Some(palette::split_color(0).to_string()),
                        line: None,
                    }),
                    xaxis: trace_xaxis.clone(),
                    yaxis: trace_yaxis.clone(),
                    ..Default::default()
                }));
            }
            Some(split_col) => {
                for (value, group) in transform::partition(&panel.data, split_col)? {
                    let color_idx = split_order.get(&value).copied().unwrap_or(0);
                    let first_appearance = seen_series.insert(value.clone());
                    traces.push(Trace::Bar(BarTrace {
                        x: transform::typed_column(&group, &chart.x, x_numeric)?,
                        y: transform::numeric_column(&group, y_col)?,
                        name: Some(value.clone()),
                        marker: Some(Marker {
                            color: Some(palette::split_color(color_idx).to_string()),
                            line: None,
                        }),
                        xaxis: trace_xaxis.clone(),
                        yaxis: trace_yaxis.clone(),
                        legendgroup: Some(value),
                        showlegend: if first_appearance { None } else { Some(false) },
                        ..Default::default()
                    }));
                }
            }
        }
    }

    let x_text = chart
        .x_title
        .clone()
        .unwrap_or_else(|| chart.display_name(&chart.x).to_string());
    let y_text = chart
        .y_title
        .clone()
        .unwrap_or_else(|| chart.display_name(y_col).to_string());

    let mut layout = Layout {
        title: Some(Title::new(chart.title.clone())),
        barmode: chart.barmode,
        ..Default::default()
    };

    if let Some(split_col) = &chart.split_by {
        layout.legend = Some(Legend {
            title: Some(Title::new(chart.display_name(split_col))),
        });
    }

    if faceted {
        layout.grid = Some(Grid {
            rows: nrows,
            columns: ncols,
            pattern: "independent".to_string(),
        });
        apply_facet_axes(&mut layout, &panels, nrows, ncols, &x_text, &y_text);
        layout.annotations = facet_annotations(chart, &panels, ncols);
    } else {
        layout.xaxis = Some(titled_axis(&x_text));
        layout.yaxis = Some(titled_axis(&y_text));
    }

    Ok(Figure {
        data: traces,
        layout,
    })
}

/// Give every panel its axis pair: scales matched to the first panel,
/// x titles on the bottom row and y titles on the left column.
fn apply_facet_axes(
    layout: &mut Layout,
    panels: &[Panel],
    nrows: usize,
    ncols: usize,
    x_text: &str,
    y_text: &str,
) {
    for panel_idx in 0..panels.len() {
        let axis_id = panel_idx + 1;
        let row = panel_idx / ncols;
        let col = panel_idx % ncols;

        let mut xaxis = Axis::default();
        let mut yaxis = Axis::default();
        if axis_id > 1 {
            xaxis.matches = Some("x".to_string());
            yaxis.matches = Some("y".to_string());
        }
        if row == nrows - 1 {
            xaxis.title = Some(Title::new(x_text));
        }
        if col == 0 {
            yaxis.title = Some(Title::new(y_text));
        }

        if axis_id == 1 {
            layout.xaxis = Some(xaxis);
            layout.yaxis = Some(yaxis);
        } else {
            layout.panel_axes.insert(axis_name("xaxis", axis_id), xaxis);
            layout.panel_axes.insert(axis_name("yaxis", axis_id), yaxis);
        }
    }
}

/// Column labels above the top row, row labels along the right edge.
fn facet_annotations(chart: &BarChart, panels: &[Panel], ncols: usize) -> Vec<Annotation> {
    let mut annotations = Vec::new();

    for (panel_idx, panel) in panels.iter().enumerate() {
        let axis_id = panel_idx + 1;
        let row = panel_idx / ncols;
        let col = panel_idx % ncols;

        if row == 0 {
            if let (Some(facet_col), Some(label)) = (&chart.facet_col, &panel.col_label) {
                annotations.push(Annotation {
                    text: format!("{}={}", chart.display_name(facet_col), label),
                    showarrow: false,
                    x: 0.5,
                    y: 1.0,
                    xref: domain_ref("x", axis_id),
                    yref: domain_ref("y", axis_id),
                    xanchor: None,
                    yanchor: Some("bottom".to_string()),
                    textangle: None,
                });
            }
        }
        if col == ncols - 1 {
            if let (Some(facet_row), Some(label)) = (&chart.facet_row, &panel.row_label) {
                annotations.push(Annotation {
                    text: format!("{}={}", chart.display_name(facet_row), label),
                    showarrow: false,
                    x: 1.0,
                    y: 0.5,
                    xref: domain_ref("x", axis_id),
                    yref: domain_ref("y", axis_id),
                    xanchor: Some("left".to_string()),
                    yanchor: None,
                    textangle: Some(90.0),
                });
            }
        }
    }
    annotations
}

// === Histogram ===

fn build_histogram_figure(data: &Dataset, chart: &Histogram) -> Result<Figure> {
    validate_histogram(data, chart)?;

    let mut figure = match chart.marginal {
        Some(marginal) => build_marginal_histogram(data, chart, marginal)?,
        None => build_overlay_histogram(data, chart)?,
    };

    if let Some(first) = figure.data.first_mut() {
        first.set_marker_line_width(palette::HISTOGRAM_BAR_OUTLINE);
    }
    Ok(figure)
}

fn validate_histogram(data: &Dataset, chart: &Histogram) -> Result<()> {
    data.column_index(&chart.x)?;
    if let Some(secondary) = &chart.secondary {
        if chart.marginal.is_some() {
            return Err(RenderError::config(
                "a marginal plot and a secondary axis cannot be combined",
            ));
        }
        data.column_index(&secondary.x)?;
    }
    Ok(())
}

fn primary_histogram_trace(data: &Dataset, chart: &Histogram) -> Result<Trace> {
    Ok(Trace::Histogram(HistogramTrace {
        x: transform::json_column(data, &chart.x)?,
        name: Some(chart.name.clone()),
        marker: Some(Marker {
            color: Some(chart.color.clone()),
            line: None,
        }),
        opacity: Some(chart.opacity),
        nbinsx: chart.nbins,
        yaxis: None,
    }))
}

/// Histogram with a distribution plot in a slim panel above it, the two
/// sharing the x axis.
fn build_marginal_histogram(data: &Dataset, chart: &Histogram, marginal: Marginal) -> Result<Figure> {
    let main = primary_histogram_trace(data, chart)?;
    let x = transform::json_column(data, &chart.x)?;
    let marker = Some(Marker {
        color: Some(chart.color.clone()),
        line: None,
    });

    let side = match marginal {
        Marginal::Box => Trace::Box(BoxTrace {
            x,
            marker,
            xaxis: Some("x2".to_string()),
            yaxis: Some("y2".to_string()),
            showlegend: Some(false),
        }),
        Marginal::Violin => Trace::Violin(ViolinTrace {
            x,
            marker,
            xaxis: Some("x2".to_string()),
            yaxis: Some("y2".to_string()),
            showlegend: Some(false),
        }),
    };

    let mut layout = Layout {
        title: Some(Title::new(chart.title.clone())),
        xaxis: Some(Axis {
            title: Some(Title::new(chart.x_title.clone())),
            kind: chart.log_x.then_some(AxisKind::Log),
            ..Default::default()
        }),
        yaxis: Some(Axis {
            title: Some(Title::new(chart.y_title.clone())),
            kind: chart.log_y.then_some(AxisKind::Log),
            domain: Some(MARGINAL_MAIN_DOMAIN),
            ..Default::default()
        }),
        ..Default::default()
    };
    layout.panel_axes.insert(
        "xaxis2".to_string(),
        Axis {
            // matches links the range only, so the strip restates the scale
            kind: chart.log_x.then_some(AxisKind::Log),
            matches: Some("x".to_string()),
            showgrid: Some(false),
            showticklabels: Some(false),
            ..Default::default()
        },
    );
    layout.panel_axes.insert(
        "yaxis2".to_string(),
        Axis {
            domain: Some(MARGINAL_PANEL_DOMAIN),
            showgrid: Some(false),
            showticklabels: Some(false),
            ..Default::default()
        },
    );

    Ok(Figure {
        data: vec![main, side],
        layout,
    })
}

/// Plain histogram, plus a second series on its own right-hand axis when
/// the request carries one.
fn build_overlay_histogram(data: &Dataset, chart: &Histogram) -> Result<Figure> {
    let mut traces = vec![primary_histogram_trace(data, chart)?];

    let mut layout = Layout {
        title: Some(Title::new(chart.title.clone())),
        xaxis: Some(Axis {
            title: Some(Title::new(chart.x_title.clone())),
            kind: chart.log_x.then_some(AxisKind::Log),
            ..Default::default()
        }),
        yaxis: Some(Axis {
            title: Some(Title::new(chart.y_title.clone())),
            kind: chart.log_y.then_some(AxisKind::Log),
            ..Default::default()
        }),
        ..Default::default()
    };

    if let Some(secondary) = &chart.secondary {
        traces.push(Trace::Histogram(HistogramTrace {
            x: transform::json_column(data, &secondary.x)?,
            name: Some(secondary.name.clone()),
            marker: None,
            opacity: secondary.opacity,
            nbinsx: secondary.nbins,
            yaxis: Some("y2".to_string()),
        }));
        layout.yaxis2 = Some(Axis {
            title: secondary.title.as_deref().map(Title::new),
            range: Some(secondary.range),
            showgrid: Some(false),
            overlaying: Some("y".to_string()),
            side: Some("right".to_string()),
            ..Default::default()
        });
    }

    Ok(Figure {
        data: traces,
        layout,
    })
}

// === Multi-line ===

fn build_multi_line_figure(data: &Dataset, chart: &MultiLine) -> Result<Figure> {
    data.column_index(&chart.x)?;
    for series in chart.series() {
        data.column_index(&series.column)?;
    }

    let x = transform::json_column(data, &chart.x)?;
    let mut traces = Vec::new();
    for (idx, series) in chart.series().into_iter().enumerate() {
        traces.push(Trace::Scatter(ScatterTrace {
            x: x.clone(),
            y: transform::numeric_column(data, &series.column)?,
            name: Some(series.name.clone()),
            line: Some(Line {
                color: Some(palette::LINE_COLORS[idx].to_string()),
            }),
            opacity: Some(palette::LINE_OPACITY),
        }));
    }

    let mut xaxis = Axis {
        title: Some(Title::new(chart.x_title.clone())),
        rangeslider: Some(RangeSlider {
            visible: chart.range_slider,
        }),
        ..Default::default()
    };
    if chart.reverse_x {
        xaxis.autorange = Some("reversed".to_string());
    }

    let layout = Layout {
        title: Some(Title::new(chart.title.clone())),
        xaxis: Some(xaxis),
        yaxis: Some(titled_axis(&chart.y_title)),
        ..Default::default()
    };

    Ok(Figure {
        data: traces,
        layout,
    })
}

// === Shared helpers ===

fn titled_axis(text: &str) -> Axis {
    Axis {
        title: Some(Title::new(text)),
        ..Default::default()
    }
}

/// Numbered axis name: the first panel keeps the bare prefix ("x" or
/// "xaxis"), later panels get "x2"/"xaxis2" and so on.
fn axis_name(prefix: &str, id: usize) -> String {
    if id == 1 {
        prefix.to_string()
    } else {
        format!("{}{}", prefix, id)
    }
}

/// Annotation reference pinned to an axis domain: "x2 domain".
fn domain_ref(prefix: &str, id: usize) -> String {
    format!("{} domain", axis_name(prefix, id))
}

// === Tests ===
