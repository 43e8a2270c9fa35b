use crate::config::{Backend, MarkerSymbol, PlotLayout};
use crate::error::DerivationError;
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// Assembly output
// =============================================================================

/// Everything one back end needs to draw one dataset.
/// Coordinate and size vectors all have the dataset's row count.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRecord {
    pub dataset: String,
    pub label: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub sizes: Vec<f64>,
    /// Normalized `#rrggbb`
    pub color: String,
    pub symbol: MarkerSymbol,
}

impl RenderRecord {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Points as (x, y, z, size) tuples
    pub fn points(&self) -> impl Iterator<Item = (f64, f64, f64, f64)> + '_ {
        self.x
            .iter()
            .zip(&self.y)
            .zip(&self.z)
            .zip(&self.sizes)
            .map(|(((&x, &y), &z), &s)| (x, y, z, s))
    }
}

/// All records for one back end, in dataset order
#[derive(Debug, Clone, PartialEq)]
pub struct PlotRequest {
    pub backend: Backend,
    pub layout: PlotLayout,
    pub records: Vec<RenderRecord>,
}

impl PlotRequest {
    pub fn new(backend: Backend, layout: PlotLayout) -> Self {
        Self {
            backend,
            layout,
            records: Vec::new(),
        }
    }
}

/// A recoverable problem met while assembling
#[derive(Debug, Clone, PartialEq)]
pub enum AssemblyWarning {
    /// A coordinate column is absent; the dataset was skipped for every back end
    MissingColumn { dataset: String, column: String },
    /// The size column could not be normalized; constant base sizes were used
    DegenerateSizes {
        dataset: String,
        backend: Backend,
        error: DerivationError,
    },
}

impl AssemblyWarning {
    pub fn dataset(&self) -> &str {
        match self {
            AssemblyWarning::MissingColumn { dataset, .. } => dataset,
            AssemblyWarning::DegenerateSizes { dataset, .. } => dataset,
        }
    }
}

impl fmt::Display for AssemblyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssemblyWarning::MissingColumn { dataset, column } => write!(
                f,
                "column '{}' not found - plotting '{}' will not be possible",
                column, dataset
            ),
            AssemblyWarning::DegenerateSizes { dataset, backend, error } => write!(
                f,
                "{} - '{}' drawn with constant {} marker size",
                error, dataset, backend
            ),
        }
    }
}

/// Result of one `assemble()` pass
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    pub requests: BTreeMap<Backend, PlotRequest>,
    pub warnings: Vec<AssemblyWarning>,
}

impl Assembly {
    pub fn request(&self, backend: Backend) -> Option<&PlotRequest> {
        self.requests.get(&backend)
    }

    /// Names of the datasets skipped for missing columns
    pub fn skipped_datasets(&self) -> Vec<&str> {
        self.warnings
            .iter()
            .filter(|w| matches!(w, AssemblyWarning::MissingColumn { .. }))
            .map(|w| w.dataset())
            .collect()
    }
}
