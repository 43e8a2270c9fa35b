// Per-dataset extraction and per-back-end record assembly

use crate::color::parse_color;
use crate::config::{AssemblyConfig, Backend, ColumnSelection, MarkerSymbol};
use crate::data::Dataset;
use crate::error::ConfigurationError;
use crate::ir::{Assembly, AssemblyWarning, PlotRequest, RenderRecord};
use crate::palette::default_color;
use crate::sizes::derive_sizes;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// Owns the loaded datasets and the validated configuration, and turns them
/// into one `PlotRequest` per enabled back end.
#[derive(Debug, Clone)]
pub struct ScatterAssembler {
    datasets: Vec<Dataset>,
    config: AssemblyConfig,
}

impl ScatterAssembler {
    /// Validate and store the configuration. Datasets keep the given order,
    /// which is the order records appear in every plot request.
    pub fn configure(datasets: Vec<Dataset>, config: AssemblyConfig) -> Result<Self, ConfigurationError> {
        validate_backends(&config.backends)?;
        for &backend in &config.backends {
            config.size_spec(backend).validate(backend)?;
        }

        let mut names = HashSet::new();
        for dataset in &datasets {
            if !names.insert(dataset.name()) {
                return Err(ConfigurationError::DuplicateDataset(dataset.name().to_string()));
            }
        }

        for (name, style) in &config.styles {
            if let Some(color) = &style.color {
                if parse_color(color).is_none() {
                    return Err(ConfigurationError::InvalidColor {
                        dataset: name.clone(),
                        color: color.clone(),
                    });
                }
            }
        }

        Ok(Self { datasets, config })
    }

    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    pub fn config(&self) -> &AssemblyConfig {
        &self.config
    }

    pub fn is_enabled(&self, backend: Backend) -> bool {
        self.config.backends.contains(&backend)
    }

    /// Build fresh plot requests from the current datasets.
    ///
    /// A dataset missing a coordinate column is skipped for all back ends and
    /// reported once in `Assembly::warnings`. Degenerate size statistics fall
    /// back to constant base sizes and are reported per back end.
    pub fn assemble(&self) -> Assembly {
        let mut requests: BTreeMap<Backend, PlotRequest> = self
            .config
            .backends
            .iter()
            .map(|&b| (b, PlotRequest::new(b, self.config.layout.clone())))
            .collect();
        let mut warnings = Vec::new();

        for (position, dataset) in self.datasets.iter().enumerate() {
            let coords = match extract_coordinates(dataset, &self.config.columns) {
                Ok(coords) => coords,
                Err(column) => {
                    warn!(dataset = dataset.name(), column = %column, "coordinate column not found, skipping dataset");
                    warnings.push(AssemblyWarning::MissingColumn {
                        dataset: dataset.name().to_string(),
                        column,
                    });
                    continue;
                }
            };

            for &backend in &self.config.backends {
                let spec = self.config.size_spec(backend);
                let sizes = match derive_sizes(dataset, self.config.columns.size.as_deref(), spec) {
                    Ok(sizes) => sizes,
                    Err(error) => {
                        warn!(dataset = dataset.name(), backend = %backend, "{}", error);
                        warnings.push(AssemblyWarning::DegenerateSizes {
                            dataset: dataset.name().to_string(),
                            backend,
                            error,
                        });
                        vec![spec.base; dataset.len()]
                    }
                };

                let record = self.build_record(position, dataset, backend, &coords, sizes);
                debug!(dataset = dataset.name(), backend = %backend, points = record.len(), "assembled record");
                if let Some(request) = requests.get_mut(&backend) {
                    request.records.push(record);
                }
            }
        }

        Assembly { requests, warnings }
    }

    fn build_record(
        &self,
        position: usize,
        dataset: &Dataset,
        backend: Backend,
        coords: &Coordinates,
        sizes: Vec<f64>,
    ) -> RenderRecord {
        let style = self.config.styles.get(dataset.name());

        let label = style
            .and_then(|s| s.label.clone())
            .unwrap_or_else(|| dataset.name().to_string());
        let color = style
            .and_then(|s| s.color.as_deref())
            .and_then(parse_color)
            .map(|rgb| rgb.to_hex())
            .unwrap_or_else(|| default_color(position).to_string());
        let symbol = style
            .and_then(|s| s.symbols.get(&backend).copied())
            .unwrap_or(MarkerSymbol::Circle);

        RenderRecord {
            dataset: dataset.name().to_string(),
            label,
            x: coords.x.clone(),
            y: coords.y.clone(),
            z: coords.z.clone(),
            sizes,
            color,
            symbol,
        }
    }
}

fn validate_backends(backends: &[Backend]) -> Result<(), ConfigurationError> {
    if backends.is_empty() {
        return Err(ConfigurationError::NoBackends);
    }
    let mut seen = HashSet::new();
    for backend in backends {
        if !seen.insert(backend) {
            return Err(ConfigurationError::DuplicateBackend(backend.to_string()));
        }
    }
    Ok(())
}

struct Coordinates {
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
}

/// Pull the x/y/z columns; on failure returns the first missing column name
fn extract_coordinates(dataset: &Dataset, columns: &ColumnSelection) -> Result<Coordinates, String> {
    let column = |name: &String| dataset.numeric_column(name).ok_or_else(|| name.clone());
    Ok(Coordinates {
        x: column(&columns.x)?,
        y: column(&columns.y)?,
        z: column(&columns.z)?,
    })
}
