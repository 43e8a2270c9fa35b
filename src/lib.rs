// Library exports for scatter3d

pub mod csv_reader;
pub mod data;
pub mod error;
pub mod palette;
pub mod color;

// Core: size derivation and record assembly
pub mod config;
pub mod sizes;
pub mod ir;
pub mod assemble;

// Back ends and the pipeline driver
pub mod graph;
pub mod render;
pub mod runtime;

pub use assemble::ScatterAssembler;
pub use config::{AssemblyConfig, Backend, MarkerSymbol, ScatterConfig, SizeSpec};
pub use data::Dataset;
pub use error::{ConfigurationError, DerivationError};
pub use ir::{Assembly, AssemblyWarning, PlotRequest, RenderRecord};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub enum OutputFormat {
    #[serde(rename = "png")]
    #[default]
    Png,
    #[serde(rename = "svg")]
    Svg,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
        }
    }
}

/// Static image options
#[derive(Debug, Clone, Deserialize)]
pub struct RenderOptions {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default, rename = "type")]
    pub format: OutputFormat,
}

fn default_width() -> u32 { 800 }
fn default_height() -> u32 { 600 }

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            format: OutputFormat::Png,
        }
    }
}
