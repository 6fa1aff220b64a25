//! Serializable figure model.
//!
//! A `Figure` is the renderer's intermediate representation: traces plus a
//! layout, serialized to the JSON shape the plotly.js runtime consumes.
//! Builders in `render` produce figures; `document` embeds the serialized
//! JSON in an HTML page.

use crate::request::BarMode;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl Figure {
    /// Serialize to a JSON value with deterministic key order.
    pub fn to_value(&self) -> crate::error::Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

// === Traces ===

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Bar(BarTrace),
    Histogram(HistogramTrace),
    Scatter(ScatterTrace),
    Box(BoxTrace),
    Violin(ViolinTrace),
}

impl Trace {
    /// Set the bar outline width, creating the marker if absent.
    /// No effect on scatter traces, which have no bar marker.
    pub fn set_marker_line_width(&mut self, width: f64) {
        let marker = match self {
            Trace::Bar(t) => &mut t.marker,
            Trace::Histogram(t) => &mut t.marker,
            Trace::Box(t) => &mut t.marker,
            Trace::Violin(t) => &mut t.marker,
            Trace::Scatter(_) => return,
        };
        marker.get_or_insert_with(Marker::default).line = Some(MarkerLine { width });
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct BarTrace {
    pub x: Vec<Value>,
    pub y: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legendgroup: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct HistogramTrace {
    pub x: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbinsx: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ScatterTrace {
    pub x: Vec<Value>,
    pub y: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

/// Distribution trace drawn from x values only, rendered horizontally.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct BoxTrace {
    pub x: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ViolinTrace {
    pub x: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Marker {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<MarkerLine>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MarkerLine {
    pub width: f64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Line {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

// === Layout ===

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Layout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barmode: Option<BarMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis2: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<Grid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    /// Additional per-panel axes keyed by plotly id ("xaxis2", "yaxis3", ...).
    /// An empty map flattens to nothing.
    #[serde(flatten)]
    pub panel_axes: BTreeMap<String, Axis>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Title {
    pub text: String,
}

impl Title {
    pub fn new(text: impl Into<String>) -> Self {
        Title { text: text.into() }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AxisKind {
    Linear,
    Log,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<AxisKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autorange: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rangeslider: Option<RangeSlider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showgrid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showticklabels: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlaying: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RangeSlider {
    pub visible: bool,
}

/// Subplot grid. Pattern "independent" gives each panel its own axis pair.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Grid {
    pub rows: usize,
    pub columns: usize,
    pub pattern: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Legend {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
}

/// Static text pinned to an axis domain, used for facet panel labels.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Annotation {
    pub text: String,
    pub showarrow: bool,
    pub x: f64,
    pub y: f64,
    pub xref: String,
    pub yref: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xanchor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yanchor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub textangle: Option<f64>,
}

// === Layout updates ===

/// Recursively merge `patch` into `base`, the way plotly applies layout
/// updates: objects merge key by key, anything else replaces.
pub fn merge_value(base: &mut Value, patch: &Value) {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (key, patch_val) in patch_map {
                let nested = patch_val.is_object()
                    && matches!(base_map.get(key), Some(Value::Object(_)));
                if nested {
                    if let Some(existing) = base_map.get_mut(key) {
                        merge_value(existing, patch_val);
                    }
                } else {
                    base_map.insert(key.clone(), patch_val.clone());
                }
            }
        }
        (other, patch) => *other = patch.clone(),
    }
}

// === Tests ===

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trace_serializes_with_type_tag() {
        let trace = Trace::Bar(BarTrace {
            x: vec![json!("a")],
            y: vec![json!(2)],
            name: Some("counts".to_string()),
            ..Default::default()
        });
        let value = serde_json::to_value(&trace).unwrap();
        assert_eq!(value["type"], "bar");
        assert_eq!(value["x"], json!(["a"]));
        assert_eq!(value["name"], "counts");
        assert!(value.get("marker").is_none());
    }

    #[test]
    fn test_axis_type_field_renamed() {
        let axis = Axis {
            kind: Some(AxisKind::Log),
            ..Default::default()
        };
        let value = serde_json::to_value(&axis).unwrap();
        assert_eq!(value, json!({"type": "log"}));
    }

    #[test]
    fn test_panel_axes_flatten_into_layout() {
        let mut layout = Layout::default();
        layout.panel_axes.insert(
            "xaxis2".to_string(),
            Axis {
                matches: Some("x".to_string()),
                ..Default::default()
            },
        );
        let value = serde_json::to_value(&layout).unwrap();
        assert_eq!(value["xaxis2"], json!({"matches": "x"}));
    }

    #[test]
    fn test_set_marker_line_width_creates_marker() {
        let mut trace = Trace::Histogram(HistogramTrace {
            x: vec![json!(1)],
            ..Default::default()
        });
        trace.set_marker_line_width(0.5);
        let value = serde_json::to_value(&trace).unwrap();
        assert_eq!(value["marker"]["line"]["width"], 0.5);
    }

    #[test]
    fn test_set_marker_line_width_keeps_color() {
        let mut trace = Trace::Bar(BarTrace {
            marker: Some(Marker {
                color: Some("#273bd8".to_string()),
                line: None,
            }),
            ..Default::default()
        });
        trace.set_marker_line_width(0.5);
        let value = serde_json::to_value(&trace).unwrap();
        assert_eq!(value["marker"]["color"], "#273bd8");
        assert_eq!(value["marker"]["line"]["width"], 0.5);
    }

    #[test]
    fn test_merge_value_nested_objects() {
        let mut base = json!({"xaxis": {"title": {"text": "old"}, "showgrid": true}});
        let patch = json!({"xaxis": {"title": {"text": "new"}}, "height": 400});
        merge_value(&mut base, &patch);
        assert_eq!(base["xaxis"]["title"]["text"], "new");
        assert_eq!(base["xaxis"]["showgrid"], true);
        assert_eq!(base["height"], 400);
    }

    #[test]
    fn test_merge_value_scalar_replaces() {
        let mut base = json!({"barmode": "group"});
        merge_value(&mut base, &json!({"barmode": "stack"}));
        assert_eq!(base["barmode"], "stack");
    }
}
