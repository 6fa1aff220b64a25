use crate::error::{RenderError, Result};
use serde_json::Value;

/// Tabular input for the renderer. Cells are kept as strings; an empty
/// string marks a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Create a Dataset from a JSON array of objects.
    ///
    /// Headers come from the first object; later objects may omit fields,
    /// which read as missing values.
    pub fn from_json(value: &Value) -> Result<Self> {
        let array = value
            .as_array()
            .ok_or_else(|| RenderError::config("input data must be a JSON array of objects"))?;

        if array.is_empty() {
            return Err(RenderError::config("input data array is empty"));
        }

        let first_obj = array[0]
            .as_object()
            .ok_or_else(|| RenderError::config("items in array must be objects"))?;

        let headers: Vec<String> = first_obj.keys().cloned().collect();

        let mut rows = Vec::new();
        for item in array {
            let obj = item
                .as_object()
                .ok_or_else(|| RenderError::config("items in array must be objects"))?;

            let mut row = Vec::new();
            for header in &headers {
                let cell = match obj.get(header) {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Number(n)) => n.to_string(),
                    Some(Value::Bool(b)) => b.to_string(),
                    Some(Value::Null) | None => String::new(),
                    _ => {
                        return Err(RenderError::Config(format!(
                            "unsupported value type for field '{}'",
                            header
                        )))
                    }
                };
                row.push(cell);
            }
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    /// Find a column by name, case-insensitive.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| RenderError::Config(format!("column '{}' not found", name)))
    }

    /// All cells of a column in row order.
    pub fn column_cells(&self, name: &str) -> Result<Vec<&str>> {
        let idx = self.column_index(name)?;
        Ok(self
            .rows
            .iter()
            .map(|row| row.get(idx).map(String::as_str).unwrap_or(""))
            .collect())
    }
}

// === Tests ===
