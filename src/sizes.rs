// Marker-size derivation: normalization of a data column around its median

use crate::config::SizeSpec;
use crate::data::Dataset;
use crate::error::DerivationError;

/// Marker sizes for every row of `dataset`.
///
/// With the size column present each value `v` maps to
/// `(v - median) / (max - median) * spec.range + spec.base`, statistics taken
/// over the non-missing values; missing values stay NaN. When `column` is `None`
/// or not in the dataset every row gets `spec.base`.
pub fn derive_sizes(
    dataset: &Dataset,
    column: Option<&str>,
    spec: SizeSpec,
) -> Result<Vec<f64>, DerivationError> {
    match column.and_then(|c| dataset.numeric_column(c).map(|values| (c, values))) {
        Some((name, values)) => values_to_sizes(name, &values, spec),
        None => Ok(vec![spec.base; dataset.len()]),
    }
}

/// Apply the median normalization to raw column values. An empty column
/// yields no sizes.
pub fn values_to_sizes(column: &str, values: &[f64], spec: SizeSpec) -> Result<Vec<f64>, DerivationError> {
    if values.is_empty() {
        return Ok(Vec::new());
    }
    let present: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    let med = median(&present).ok_or_else(|| DerivationError::NoValues {
        column: column.to_string(),
    })?;
    let max = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if max == med {
        return Err(DerivationError::DegenerateRange {
            column: column.to_string(),
            median: med,
        });
    }

    let spread = max - med;
    Ok(values
        .iter()
        .map(|v| (v - med) / spread * spec.range + spec.base)
        .collect())
}

/// Median of the non-NaN values, `None` if there are none
pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Value;

    fn make_dataset(headers: Vec<&str>, rows: Vec<Vec<f64>>) -> Dataset {
        Dataset::new(
            "test",
            headers.iter().map(|s| s.to_string()).collect(),
            rows.into_iter()
                .map(|r| r.into_iter().map(Value::Number).collect())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[10.0, 1.0]), Some(5.5));
        assert_eq!(median(&[f64::NAN, 4.0, 2.0]), Some(3.0));
        assert_eq!(median(&[f64::NAN]), None);
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_sinc_example() {
        let ds = make_dataset(
            vec!["X", "Y", "Z", "inv_dist"],
            vec![vec![0.0, 0.0, 1.0, 10.0], vec![1.0, 0.0, 0.84, 1.0]],
        );
        let sizes = derive_sizes(&ds, Some("inv_dist"), SizeSpec::new(10.0, 9.0)).unwrap();
        assert_eq!(sizes.len(), 2);
        assert!((sizes[0] - 19.0).abs() < 1e-12);
        assert!((sizes[1] - ((1.0 - 5.5) / (10.0 - 5.5) * 9.0 + 10.0)).abs() < 1e-12);
    }

    #[test]
    fn test_missing_size_column_is_constant() {
        let rows: Vec<Vec<f64>> = (0..1000).map(|i| vec![i as f64, 0.0, 1.0]).collect();
        let ds = make_dataset(vec!["X", "Y", "Z"], rows);
        let sizes = derive_sizes(&ds, Some("inv_dist"), SizeSpec::new(30.0, 15.0)).unwrap();
        assert_eq!(sizes.len(), 1000);
        assert!(sizes.iter().all(|&s| s == 30.0));
    }

    #[test]
    fn test_no_size_column_selected() {
        let ds = make_dataset(vec!["X", "s"], vec![vec![0.0, 1.0], vec![1.0, 2.0]]);
        let sizes = derive_sizes(&ds, None, SizeSpec::new(7.0, 3.0)).unwrap();
        assert_eq!(sizes, vec![7.0, 7.0]);
    }

    #[test]
    fn test_affine_and_reproducible() {
        let values = [1.0, 2.0, 3.0, 4.0, 10.0];
        let spec = SizeSpec::new(10.0, 9.0);
        let a = values_to_sizes("s", &values, spec).unwrap();
        let b = values_to_sizes("s", &values, spec).unwrap();
        assert_eq!(a, b);

        // constant slope between consecutive points
        let slope = (a[1] - a[0]) / (values[1] - values[0]);
        for i in 1..values.len() {
            let expected = a[0] + slope * (values[i] - values[0]);
            assert!((a[i] - expected).abs() < 1e-9);
        }
        // median maps to base, max to base + range
        assert!((a[2] - 10.0).abs() < 1e-12);
        assert!((a[4] - 19.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_values_propagate_nan() {
        let values = [1.0, f64::NAN, 3.0, 5.0];
        let sizes = values_to_sizes("s", &values, SizeSpec::new(10.0, 9.0)).unwrap();
        assert!(sizes[1].is_nan());
        // median of {1, 3, 5} is 3
        assert!((sizes[2] - 10.0).abs() < 1e-12);
        assert!((sizes[3] - 19.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_range() {
        let result = values_to_sizes("s", &[1.0, 5.0, 5.0], SizeSpec::new(10.0, 9.0));
        assert_eq!(
            result,
            Err(DerivationError::DegenerateRange {
                column: "s".to_string(),
                median: 5.0
            })
        );
    }

    #[test]
    fn test_empty_size_column() {
        let ds = make_dataset(vec!["X", "Y", "Z", "s"], vec![]);
        let sizes = derive_sizes(&ds, Some("s"), SizeSpec::new(10.0, 9.0)).unwrap();
        assert!(sizes.is_empty());
    }

    #[test]
    fn test_all_missing_values() {
        let result = values_to_sizes("s", &[f64::NAN, f64::NAN], SizeSpec::new(10.0, 9.0));
        assert!(matches!(result, Err(DerivationError::NoValues { .. })));
        assert_eq!(
            result.unwrap_err().to_string(),
            "size column 's' has no non-missing values"
        );
    }
}
