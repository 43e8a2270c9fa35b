//! Plot configuration.
//!
//! `AssemblyConfig` is what the assembler needs: column selectors, per-dataset
//! display metadata, per-back-end size specs and the enabled back ends.
//! `ScatterConfig` is the JSON file read by the binary; it adds the dataset
//! sources, loader preprocessing and output options on top.
//!
//! Lookups that may miss fall back to documented values instead of failing:
//! a dataset without a label uses its name, one without a color takes the
//! palette entry for its position, one without a symbol is drawn as a circle,
//! and a back end without a size spec uses `SizeSpec::default_for`.

use crate::error::ConfigurationError;
use crate::RenderOptions;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A rendering target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub enum Backend {
    /// Interactive web page driven by plotly.js
    Plotly,
    /// Static PNG/SVG image
    Matplotlib,
}

impl Backend {
    pub const ALL: [Backend; 2] = [Backend::Plotly, Backend::Matplotlib];

    pub fn name(self) -> &'static str {
        match self {
            Backend::Plotly => "plotly",
            Backend::Matplotlib => "matplotlib",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plotly" => Ok(Backend::Plotly),
            "matplotlib" => Ok(Backend::Matplotlib),
            _ => Err(ConfigurationError::UnknownBackend(s.to_string())),
        }
    }
}

impl TryFrom<String> for Backend {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Marker symbols shared by both back ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum MarkerSymbol {
    #[default]
    Circle,
    CircleOpen,
    Square,
    SquareOpen,
    Diamond,
    DiamondOpen,
    Cross,
    X,
}

impl MarkerSymbol {
    /// Name used by plotly's scatter3d `marker.symbol`
    pub fn plotly_name(self) -> &'static str {
        match self {
            MarkerSymbol::Circle => "circle",
            MarkerSymbol::CircleOpen => "circle-open",
            MarkerSymbol::Square => "square",
            MarkerSymbol::SquareOpen => "square-open",
            MarkerSymbol::Diamond => "diamond",
            MarkerSymbol::DiamondOpen => "diamond-open",
            MarkerSymbol::Cross => "cross",
            MarkerSymbol::X => "x",
        }
    }

    /// matplotlib marker code; open variants share the code of the filled one
    pub fn matplotlib_marker(self) -> &'static str {
        match self {
            MarkerSymbol::Circle | MarkerSymbol::CircleOpen => "o",
            MarkerSymbol::Square | MarkerSymbol::SquareOpen => "s",
            MarkerSymbol::Diamond | MarkerSymbol::DiamondOpen => "d",
            MarkerSymbol::Cross => "+",
            MarkerSymbol::X => "x",
        }
    }

    pub fn native_name(self, backend: Backend) -> &'static str {
        match backend {
            Backend::Plotly => self.plotly_name(),
            Backend::Matplotlib => self.matplotlib_marker(),
        }
    }

    /// Outline-only markers
    pub fn is_open(self) -> bool {
        matches!(
            self,
            MarkerSymbol::CircleOpen | MarkerSymbol::SquareOpen | MarkerSymbol::DiamondOpen
        )
    }
}

impl FromStr for MarkerSymbol {
    type Err = ConfigurationError;

    /// Accepts plotly names and the matplotlib marker codes for the same shapes
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "o" => return Ok(MarkerSymbol::Circle),
            "s" => return Ok(MarkerSymbol::Square),
            "d" | "D" => return Ok(MarkerSymbol::Diamond),
            "+" | "P" => return Ok(MarkerSymbol::Cross),
            "x" | "X" => return Ok(MarkerSymbol::X),
            _ => {}
        }
        match s.to_lowercase().as_str() {
            "circle" => Ok(MarkerSymbol::Circle),
            "circle-open" => Ok(MarkerSymbol::CircleOpen),
            "square" => Ok(MarkerSymbol::Square),
            "square-open" => Ok(MarkerSymbol::SquareOpen),
            "diamond" => Ok(MarkerSymbol::Diamond),
            "diamond-open" => Ok(MarkerSymbol::DiamondOpen),
            "cross" => Ok(MarkerSymbol::Cross),
            _ => Err(ConfigurationError::UnknownSymbol(s.to_string())),
        }
    }
}

impl TryFrom<String> for MarkerSymbol {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Linear mapping from normalized size values to rendered marker sizes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeSpec {
    /// Size of a point whose value equals the column median, and of every
    /// point when the size column is absent
    pub base: f64,
    /// Size added at the column maximum
    pub range: f64,
}

impl SizeSpec {
    pub fn new(base: f64, range: f64) -> Self {
        Self { base, range }
    }

    /// Defaults are resolution dependent: plotly sizes are pixel diameters,
    /// matplotlib sizes are areas in points squared.
    pub fn default_for(backend: Backend) -> Self {
        let base = match backend {
            Backend::Plotly => 10.0,
            Backend::Matplotlib => 100.0,
        };
        Self::new(base, Self::default_range(backend, base))
    }

    /// Range used when only a base is configured: fixed for plotly, half the
    /// base (truncated) for matplotlib
    pub fn default_range(backend: Backend, base: f64) -> f64 {
        match backend {
            Backend::Plotly => 9.0,
            Backend::Matplotlib => (base * 0.5).trunc(),
        }
    }

    pub fn validate(&self, backend: Backend) -> Result<(), ConfigurationError> {
        let invalid = |reason: &str| ConfigurationError::InvalidSizeSpec {
            backend: backend.to_string(),
            reason: reason.to_string(),
        };
        if !self.base.is_finite() || !self.range.is_finite() {
            return Err(invalid("base and range must be finite"));
        }
        if self.base < 0.0 || self.range < 0.0 {
            return Err(invalid("base and range must be non-negative"));
        }
        Ok(())
    }
}

/// A `sizes` entry of the configuration file
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SizeEntry {
    pub base: f64,
    #[serde(default)]
    pub range: Option<f64>,
}

impl SizeEntry {
    pub fn resolve(&self, backend: Backend) -> SizeSpec {
        let range = self
            .range
            .unwrap_or_else(|| SizeSpec::default_range(backend, self.base));
        SizeSpec::new(self.base, range)
    }
}

/// Which columns hold the coordinates and the marker size
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ColumnSelection {
    pub x: String,
    pub y: String,
    pub z: String,
    #[serde(default)]
    pub size: Option<String>,
}

impl Default for ColumnSelection {
    fn default() -> Self {
        Self {
            x: "X".to_string(),
            y: "Y".to_string(),
            z: "Z".to_string(),
            size: None,
        }
    }
}

/// Display metadata for one dataset
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct DatasetStyle {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub symbols: HashMap<Backend, MarkerSymbol>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct AxisOptions {
    #[serde(default)]
    pub label: Option<String>,
    /// `[min, max]`; a missing bound is derived from the data
    #[serde(default)]
    pub range: [Option<f64>; 2],
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PlotLayout {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub x: AxisOptions,
    #[serde(default)]
    pub y: AxisOptions,
    #[serde(default)]
    pub z: AxisOptions,
}

impl PlotLayout {
    /// Axis titles, defaulting to X, Y and Z
    pub fn axis_titles(&self) -> [&str; 3] {
        [
            self.x.label.as_deref().unwrap_or("X"),
            self.y.label.as_deref().unwrap_or("Y"),
            self.z.label.as_deref().unwrap_or("Z"),
        ]
    }
}

/// Everything the assembler needs besides the datasets themselves
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyConfig {
    pub columns: ColumnSelection,
    /// Keyed by dataset name
    pub styles: HashMap<String, DatasetStyle>,
    pub sizes: HashMap<Backend, SizeSpec>,
    pub backends: Vec<Backend>,
    pub layout: PlotLayout,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            columns: ColumnSelection::default(),
            styles: HashMap::new(),
            sizes: HashMap::new(),
            backends: Backend::ALL.to_vec(),
            layout: PlotLayout::default(),
        }
    }
}

impl AssemblyConfig {
    /// Configured size spec, or the back end's default
    pub fn size_spec(&self, backend: Backend) -> SizeSpec {
        self.sizes
            .get(&backend)
            .copied()
            .unwrap_or_else(|| SizeSpec::default_for(backend))
    }
}

/// Where one dataset comes from and how it is drawn
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetSource {
    pub name: String,
    pub path: PathBuf,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub symbols: HashMap<Backend, MarkerSymbol>,
}

impl DatasetSource {
    pub fn style(&self) -> DatasetStyle {
        DatasetStyle {
            label: self.label.clone(),
            color: self.color.clone(),
            symbols: self.symbols.clone(),
        }
    }
}

/// Merge several columns of every dataset into one (see `Dataset::merge_columns`)
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnMerge {
    pub merged: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub keep_originals: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputOptions {
    /// File name without extension; each back end appends its own
    #[serde(default = "default_output_name")]
    pub name: String,
    /// Strip plotly's "send data to cloud" button from the page
    #[serde(default)]
    pub remove_cloud_button: bool,
    #[serde(default)]
    pub image: RenderOptions,
}

fn default_output_name() -> String {
    "output".to_string()
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            name: default_output_name(),
            remove_cloud_button: false,
            image: RenderOptions::default(),
        }
    }
}

fn default_backends() -> Vec<Backend> {
    Backend::ALL.to_vec()
}

fn default_true() -> bool {
    true
}

/// The JSON configuration file read by the `scatter3d` binary
#[derive(Debug, Clone, Deserialize)]
pub struct ScatterConfig {
    /// Plotted in this order
    pub datasets: Vec<DatasetSource>,
    #[serde(default)]
    pub columns: ColumnSelection,
    #[serde(default = "default_backends")]
    pub backends: Vec<Backend>,
    /// `range` may be omitted, see `SizeSpec::default_range`
    #[serde(default)]
    pub sizes: HashMap<Backend, SizeEntry>,
    #[serde(default)]
    pub layout: PlotLayout,
    #[serde(default)]
    pub combine_columns: Vec<ColumnMerge>,
    /// Drop rows repeating earlier coordinates
    #[serde(default = "default_true")]
    pub drop_duplicates: bool,
    #[serde(default)]
    pub output: OutputOptions,
}

impl ScatterConfig {
    pub fn from_json_str(input: &str) -> Result<Self> {
        serde_json::from_str(input).context("Failed to parse scatter3d configuration")
    }

    /// Read a configuration file; relative dataset paths are resolved
    /// against the file's directory.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration '{}'", path.display()))?;
        let mut config = Self::from_json_str(&text)
            .with_context(|| format!("Invalid configuration in '{}'", path.display()))?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    pub fn resolve_paths(&mut self, base: &Path) {
        for source in &mut self.datasets {
            if source.path.is_relative() {
                source.path = base.join(&source.path);
            }
        }
    }

    pub fn assembly_config(&self) -> AssemblyConfig {
        AssemblyConfig {
            columns: self.columns.clone(),
            styles: self
                .datasets
                .iter()
                .map(|d| (d.name.clone(), d.style()))
                .collect(),
            sizes: self
                .sizes
                .iter()
                .map(|(&backend, entry)| (backend, entry.resolve(backend)))
                .collect(),
            backends: self.backends.clone(),
            layout: self.layout.clone(),
        }
    }
}
