use anyhow::{anyhow, Result};
use serde_json::Value as JsonValue;
use std::collections::HashSet;

/// A single cell of a dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Missing,
}

impl Value {
    /// Interpret a raw text cell. Empty cells and the usual NaN spellings are missing.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed {
            "" | "nan" | "NaN" | "NAN" | "NA" | "null" => Value::Missing,
            _ => match trimmed.parse::<f64>() {
                Ok(v) => Value::Number(v),
                Err(_) => Value::Text(trimmed.to_string()),
            },
        }
    }

    /// Numeric view of the cell; anything that is not a number reads as NaN.
    pub fn as_f64(&self) -> f64 {
        match self {
            Value::Number(v) => *v,
            _ => f64::NAN,
        }
    }

    pub fn is_missing(&self) -> bool {
        match self {
            Value::Missing => true,
            Value::Number(v) => v.is_nan(),
            Value::Text(_) => false,
        }
    }
}

/// A named table whose rows all expose the same columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    name: String,
    headers: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let name = name.into();
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != headers.len()) {
            anyhow::bail!(
                "Dataset '{}': row {} has {} values but there are {} columns",
                name,
                idx + 1,
                row.len(),
                headers.len()
            );
        }
        Ok(Self { name, headers, rows })
    }

    /// Build a dataset from rows of raw text cells (as produced by a CSV reader)
    pub fn from_text_rows(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let rows = rows
            .iter()
            .map(|r| r.iter().map(|cell| Value::parse(cell)).collect())
            .collect();
        Self::new(name, headers, rows)
    }

    /// Create a dataset from a JSON array of objects.
    /// Columns are taken from the keys of the first object.
    pub fn from_json(name: impl Into<String>, value: &JsonValue) -> Result<Self> {
        let name = name.into();
        let array = value.as_array().ok_or_else(||
            anyhow!("Dataset '{}': input must be a JSON array of objects", name)
        )?;

        if array.is_empty() {
            return Err(anyhow!("Dataset '{}': input array is empty", name));
        }

        let first_obj = array[0].as_object().ok_or_else(||
            anyhow!("Dataset '{}': items in array must be objects", name)
        )?;

        let headers: Vec<String> = first_obj.keys().cloned().collect();

        let mut rows = Vec::with_capacity(array.len());
        for item in array {
            let obj = item.as_object().ok_or_else(||
                anyhow!("Dataset '{}': items in array must be objects", name)
            )?;

            let mut row = Vec::with_capacity(headers.len());
            for header in &headers {
                let cell = match obj.get(header) {
                    Some(JsonValue::Number(n)) => n.as_f64().map(Value::Number).unwrap_or(Value::Missing),
                    Some(JsonValue::String(s)) => Value::parse(s),
                    Some(JsonValue::Bool(b)) => Value::Text(b.to_string()),
                    Some(JsonValue::Null) | None => Value::Missing,
                    _ => return Err(anyhow!("Dataset '{}': unsupported value type for field '{}'", name, header)),
                };
                row.push(cell);
            }
            rows.push(row);
        }

        Self::new(name, headers, rows)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    /// Values of `column` as numbers (missing and textual cells become NaN),
    /// or `None` when the column does not exist.
    pub fn numeric_column(&self, column: &str) -> Option<Vec<f64>> {
        let idx = self.column_index(column)?;
        Some(self.rows.iter().map(|row| row[idx].as_f64()).collect())
    }

    /// Merge several columns into `merged`.
    ///
    /// For every listed column that exists, the rows where it is not missing are
    /// taken with its value moved into `merged`; the resulting row groups are
    /// stacked in the order the columns are listed. The original columns are
    /// dropped unless `keep_originals` is set. When none of the listed columns
    /// exist the dataset is left untouched.
    pub fn merge_columns(&mut self, merged: &str, columns: &[String], keep_originals: bool) {
        let present: Vec<usize> = columns.iter().filter_map(|c| self.column_index(c)).collect();
        if present.is_empty() {
            return;
        }

        let kept: Vec<usize> = (0..self.headers.len())
            .filter(|idx| keep_originals || !present.contains(idx))
            .filter(|idx| self.headers[*idx] != merged)
            .collect();

        let mut headers: Vec<String> = kept.iter().map(|&idx| self.headers[idx].clone()).collect();
        headers.push(merged.to_string());

        let mut rows = Vec::new();
        for &src in &present {
            for row in self.rows.iter().filter(|row| !row[src].is_missing()) {
                let mut new_row: Vec<Value> = kept.iter().map(|&idx| row[idx].clone()).collect();
                new_row.push(row[src].clone());
                rows.push(new_row);
            }
        }

        self.headers = headers;
        self.rows = rows;
    }

    /// Remove rows whose values over `columns` repeat an earlier row, keeping the first.
    /// Does nothing when any of the columns is absent.
    pub fn drop_duplicate_rows(&mut self, columns: &[&str]) {
        let Some(indices) = columns
            .iter()
            .map(|c| self.column_index(c))
            .collect::<Option<Vec<usize>>>()
        else {
            return;
        };

        let mut seen: HashSet<Vec<RowKey>> = HashSet::with_capacity(self.rows.len());
        let mut keep = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let key: Vec<RowKey> = indices.iter().map(|&idx| RowKey::of(&row[idx])).collect();
            keep.push(seen.insert(key));
        }

        let mut flags = keep.into_iter();
        self.rows.retain(|_| flags.next().unwrap_or(true));
    }
}

/// Hashable identity of a cell for duplicate detection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum RowKey {
    Number(u64),
    Text(String),
    Missing,
}

impl RowKey {
    fn of(value: &Value) -> Self {
        match value {
            Value::Number(v) if v.is_nan() => RowKey::Missing,
            // -0.0 and 0.0 compare equal
            Value::Number(v) if *v == 0.0 => RowKey::Number(0.0f64.to_bits()),
            Value::Number(v) => RowKey::Number(v.to_bits()),
            Value::Text(s) => RowKey::Text(s.clone()),
            Value::Missing => RowKey::Missing,
        }
    }
}
