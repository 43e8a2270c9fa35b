// Delimited-text loader for datasets

use crate::data::Dataset;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read a delimited table with a header row from any reader
pub fn read_delimited<R: Read>(name: &str, reader: R, delimiter: u8) -> Result<Dataset> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .with_context(|| format!("Failed to read header row of '{}'", name))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (idx, record) in csv_reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read row {} of '{}'", idx + 1, name))?;
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }

    Dataset::from_text_rows(name, headers, rows)
}

/// Read a comma-separated table
pub fn read_csv<R: Read>(name: &str, reader: R) -> Result<Dataset> {
    read_delimited(name, reader, b',')
}

/// Load a dataset from disk. `.tsv`/`.tab` files are tab-separated, `.json` files
/// hold an array of objects, everything else is read as CSV.
pub fn read_dataset_file(name: &str, path: &Path) -> Result<Dataset> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let file = File::open(path)
        .with_context(|| format!("Failed to open '{}' for dataset '{}'", path.display(), name))?;

    match extension.as_deref() {
        Some("json") => {
            let value: serde_json::Value = serde_json::from_reader(file)
                .with_context(|| format!("Failed to parse JSON in '{}'", path.display()))?;
            Dataset::from_json(name, &value)
        }
        Some("tsv") | Some("tab") => read_delimited(name, file, b'\t'),
        _ => read_csv(name, file),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_csv_basic() {
        let input = "X,Y,Z,inv_dist\n0,0,1,10\n1,0,0.84,1\n";
        let ds = read_csv("sinc", input.as_bytes()).unwrap();
        assert_eq!(ds.name(), "sinc");
        assert_eq!(ds.headers().len(), 4);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.numeric_column("Z").unwrap(), vec![1.0, 0.84]);
    }

    #[test]
    fn test_read_csv_trims_and_keeps_missing() {
        let input = "X , Y\n 1 , \n";
        let ds = read_csv("t", input.as_bytes()).unwrap();
        assert!(ds.has_column("X"));
        assert!(ds.numeric_column("Y").unwrap()[0].is_nan());
    }

    #[test]
    fn test_read_csv_ragged_row() {
        let input = "X,Y\n1,2\n3\n";
        let result = read_csv("t", input.as_bytes());
        assert!(result.is_err());
    }

    #[test]
    fn test_read_tsv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.tsv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "X\tY\tZ").unwrap();
        writeln!(file, "1\t2\t3").unwrap();
        drop(file);

        let ds = read_dataset_file("points", &path).unwrap();
        assert_eq!(ds.numeric_column("Y").unwrap(), vec![2.0]);
    }

    #[test]
    fn test_read_missing_file() {
        let result = read_dataset_file("nope", Path::new("/definitely/not/here.csv"));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Failed to open"));
    }
}
