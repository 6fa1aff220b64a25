//! Column extraction and aggregation over a Dataset.

use crate::data::Dataset;
use crate::error::{RenderError, Result};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Bucket label that stands in for missing values in counts and partitions.
pub const MISSING_LABEL: &str = "(missing)";

/// Count occurrences of each category in a column, missing values included
/// under [`MISSING_LABEL`].
///
/// Categories come back ordered by descending count; ties keep first
/// appearance order.
pub fn value_counts(data: &Dataset, column: &str) -> Result<Vec<(String, u64)>> {
    let idx = data.column_index(column)?;

    let mut counts: HashMap<String, u64> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for row in &data.rows {
        let cell = row.get(idx).map(String::as_str).unwrap_or("");
        let label = if cell.is_empty() { MISSING_LABEL } else { cell };
        if !counts.contains_key(label) {
            order.push(label.to_string());
        }
        *counts.entry(label.to_string()).or_insert(0) += 1;
    }

    let mut pairs: Vec<(String, u64)> = order
        .into_iter()
        .map(|label| {
            let count = counts[&label];
            (label, count)
        })
        .collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(pairs)
}

/// Count rows per combination of the given columns.
///
/// Returns a derived dataset with one row per combination, the group
/// columns first and a trailing "Count" column. Combinations are sorted
/// ascending, all-numeric key columns in numeric order; rows missing any
/// group value are skipped.
pub fn group_size(data: &Dataset, columns: &[String]) -> Result<Dataset> {
    if columns.is_empty() {
        return Err(RenderError::config("group_size needs at least one column"));
    }

    let indices: Vec<usize> = columns
        .iter()
        .map(|c| data.column_index(c))
        .collect::<Result<_>>()?;

    let mut counts: HashMap<Vec<String>, u64> = HashMap::new();
    'rows: for row in &data.rows {
        let mut key = Vec::with_capacity(indices.len());
        for &idx in &indices {
            let cell = row.get(idx).map(String::as_str).unwrap_or("");
            if cell.is_empty() {
                continue 'rows;
            }
            key.push(cell.to_string());
        }
        *counts.entry(key).or_insert(0) += 1;
    }

    let mut combos: Vec<(Vec<String>, u64)> = counts.into_iter().collect();
    let numeric: Vec<bool> = (0..indices.len())
        .map(|col| combos.iter().all(|(key, _)| key[col].parse::<f64>().is_ok()))
        .collect();
    combos.sort_by(|(a, _), (b, _)| {
        let mut ordering = Ordering::Equal;
        for col in 0..a.len() {
            ordering = ordering.then_with(|| compare_cells(&a[col], &b[col], numeric[col]));
        }
        ordering
    });

    let mut headers: Vec<String> = indices.iter().map(|&i| data.headers[i].clone()).collect();
    headers.push("Count".to_string());

    let rows = combos
        .into_iter()
        .map(|(mut key, count)| {
            key.push(count.to_string());
            key
        })
        .collect();

    Ok(Dataset::new(headers, rows))
}

/// Split a dataset into sub-datasets by the distinct values of a column,
/// sorted by value, numerically when every value is numeric. Missing cells
/// group under [`MISSING_LABEL`].
pub fn partition(data: &Dataset, column: &str) -> Result<Vec<(String, Dataset)>> {
    let idx = data.column_index(column)?;

    let mut groups: HashMap<String, Vec<Vec<String>>> = HashMap::new();
    for row in &data.rows {
        let cell = row.get(idx).map(String::as_str).unwrap_or("");
        let key = if cell.is_empty() { MISSING_LABEL } else { cell };
        groups.entry(key.to_string()).or_default().push(row.clone());
    }

    let mut keys: Vec<String> = groups.keys().cloned().collect();
    let numeric = keys.iter().all(|k| k.parse::<f64>().is_ok());
    keys.sort_by(|a, b| compare_cells(a, b, numeric));

    let mut partitions = Vec::new();
    for key in keys {
        if let Some(rows) = groups.remove(&key) {
            partitions.push((key, Dataset::new(data.headers.clone(), rows)));
        }
    }
    Ok(partitions)
}

/// Ascending cell order: numeric comparison when the column is numeric,
/// lexicographic otherwise.
fn compare_cells(a: &str, b: &str, numeric: bool) -> Ordering {
    if numeric {
        let a_num = a.parse::<f64>().unwrap_or(0.0);
        let b_num = b.parse::<f64>().unwrap_or(0.0);
        a_num.partial_cmp(&b_num).unwrap_or(Ordering::Equal)
    } else {
        a.cmp(b)
    }
}

/// Whether every present cell of a column parses as a number. The flag
/// types the whole column, so a column keeps one representation even when
/// extracted group by group.
pub fn column_is_numeric(data: &Dataset, column: &str) -> Result<bool> {
    let cells = data.column_cells(column)?;
    Ok(cells
        .iter()
        .filter(|c| !c.is_empty())
        .all(|c| parse_number(c).is_some()))
}

/// A column as JSON values, typed the way a plotting runtime expects:
/// missing cells become null; when every present cell parses as a number
/// the column is numeric, otherwise every cell stays a string.
pub fn json_column(data: &Dataset, column: &str) -> Result<Vec<Value>> {
    let numeric = column_is_numeric(data, column)?;
    typed_column(data, column, numeric)
}

/// A column as JSON values under an already-decided typing flag.
pub fn typed_column(data: &Dataset, column: &str, numeric: bool) -> Result<Vec<Value>> {
    let cells = data.column_cells(column)?;
    Ok(cells
        .iter()
        .map(|cell| {
            if cell.is_empty() {
                Value::Null
            } else if numeric {
                parse_number(cell).unwrap_or(Value::Null)
            } else {
                Value::String((*cell).to_string())
            }
        })
        .collect())
}

/// A column as JSON numbers, erroring on any cell that is present but not
/// numeric. Missing cells become null, which plotting runtimes skip.
pub fn numeric_column(data: &Dataset, column: &str) -> Result<Vec<Value>> {
    let cells = data.column_cells(column)?;

    cells
        .iter()
        .enumerate()
        .map(|(row_idx, cell)| {
            if cell.is_empty() {
                return Ok(Value::Null);
            }
            parse_number(cell).ok_or_else(|| {
                RenderError::Config(format!(
                    "failed to parse '{}' as number in column '{}' at row {}",
                    cell,
                    column,
                    row_idx + 1
                ))
            })
        })
        .collect()
}

/// Parse a cell as a JSON number, integers kept exact and non-finite
/// floats rejected.
fn parse_number(cell: &str) -> Option<Value> {
    if let Ok(int) = cell.parse::<i64>() {
        return Some(Value::from(int));
    }
    let float = cell.parse::<f64>().ok()?;
    serde_json::Number::from_f64(float).map(Value::Number)
}

// === Tests ===

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_dataset(headers: &[&str], rows: &[&[&str]]) -> Dataset {
        Dataset::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_value_counts_descending() {
        let data = make_dataset(&["type_store"], &[&["A"], &["A"], &["B"]]);
        let counts = value_counts(&data, "type_store").unwrap();
        assert_eq!(counts, vec![("A".to_string(), 2), ("B".to_string(), 1)]);
    }

    #[test]
    fn test_value_counts_missing_bucket() {
        let data = make_dataset(&["c"], &[&[""], &["x"], &[""]]);
        let counts = value_counts(&data, "c").unwrap();
        assert_eq!(
            counts,
            vec![(MISSING_LABEL.to_string(), 2), ("x".to_string(), 1)]
        );
    }

    #[test]
    fn test_value_counts_tie_keeps_first_appearance() {
        let data = make_dataset(&["c"], &[&["b"], &["a"], &["b"], &["a"]]);
        let counts = value_counts(&data, "c").unwrap();
        assert_eq!(counts[0].0, "b");
        assert_eq!(counts[1].0, "a");
    }

    #[test]
    fn test_value_counts_unknown_column() {
        let data = make_dataset(&["c"], &[&["x"]]);
        assert!(value_counts(&data, "nope").is_err());
    }

    #[test]
    fn test_group_size_sorted_with_count() {
        let data = make_dataset(
            &["state", "kind"],
            &[
                &["TX", "big"],
                &["CA", "small"],
                &["TX", "big"],
                &["TX", "small"],
            ],
        );
        let grouped = group_size(&data, &["state".to_string(), "kind".to_string()]).unwrap();
        assert_eq!(grouped.headers, vec!["state", "kind", "Count"]);
        assert_eq!(
            grouped.rows,
            vec![
                vec!["CA".to_string(), "small".to_string(), "1".to_string()],
                vec!["TX".to_string(), "big".to_string(), "2".to_string()],
                vec!["TX".to_string(), "small".to_string(), "1".to_string()],
            ]
        );
    }

    #[test]
    fn test_group_size_skips_missing() {
        let data = make_dataset(&["state"], &[&["TX"], &[""], &["TX"]]);
        let grouped = group_size(&data, &["state".to_string()]).unwrap();
        assert_eq!(grouped.rows, vec![vec!["TX".to_string(), "2".to_string()]]);
    }

    #[test]
    fn test_group_size_numeric_keys_in_numeric_order() {
        let rows: Vec<Vec<String>> = [3, 10, 1, 12, 10, 2]
            .iter()
            .map(|m| vec![m.to_string()])
            .collect();
        let data = Dataset::new(vec!["month".to_string()], rows);
        let grouped = group_size(&data, &["month".to_string()]).unwrap();
        let months: Vec<&str> = grouped.rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(months, vec!["1", "2", "3", "10", "12"]);
        assert_eq!(grouped.rows[3], vec!["10".to_string(), "2".to_string()]);
    }

    #[test]
    fn test_group_size_mixed_key_columns() {
        let data = make_dataset(
            &["month", "kind"],
            &[&["10", "b"], &["2", "a"], &["10", "a"]],
        );
        let grouped = group_size(&data, &["month".to_string(), "kind".to_string()]).unwrap();
        assert_eq!(
            grouped.rows,
            vec![
                vec!["2".to_string(), "a".to_string(), "1".to_string()],
                vec!["10".to_string(), "a".to_string(), "1".to_string()],
                vec!["10".to_string(), "b".to_string(), "1".to_string()],
            ]
        );
    }

    #[test]
    fn test_partition_sorted_keys() {
        let data = make_dataset(&["k", "v"], &[&["b", "1"], &["a", "2"], &["b", "3"]]);
        let parts = partition(&data, "k").unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].0, "a");
        assert_eq!(parts[1].0, "b");
        assert_eq!(parts[1].1.rows.len(), 2);
    }

    #[test]
    fn test_partition_numeric_keys_in_numeric_order() {
        let data = make_dataset(&["month"], &[&["10"], &["2"], &["1"], &["10"]]);
        let parts = partition(&data, "month").unwrap();
        let keys: Vec<&str> = parts.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["1", "2", "10"]);
    }

    #[test]
    fn test_json_column_numeric() {
        let data = make_dataset(&["v"], &[&["1"], &["2.5"], &[""]]);
        let values = json_column(&data, "v").unwrap();
        assert_eq!(values, vec![json!(1), json!(2.5), Value::Null]);
    }

    #[test]
    fn test_json_column_mixed_stays_string() {
        let data = make_dataset(&["v"], &[&["1"], &["oak"]]);
        let values = json_column(&data, "v").unwrap();
        assert_eq!(values, vec![json!("1"), json!("oak")]);
    }

    #[test]
    fn test_typed_column_string_flag_overrides_parseable_cells() {
        let data = make_dataset(&["v"], &[&["1"], &["2"]]);
        assert!(column_is_numeric(&data, "v").unwrap());
        let values = typed_column(&data, "v", false).unwrap();
        assert_eq!(values, vec![json!("1"), json!("2")]);
    }

    #[test]
    fn test_numeric_column_rejects_text() {
        let data = make_dataset(&["v"], &[&["1"], &["oak"]]);
        let err = numeric_column(&data, "v").unwrap_err();
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn test_numeric_column_missing_is_null() {
        let data = make_dataset(&["v"], &[&["1"], &[""]]);
        let values = numeric_column(&data, "v").unwrap();
        assert_eq!(values, vec![json!(1), Value::Null]);
    }
}
