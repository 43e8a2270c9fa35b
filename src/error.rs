use thiserror::Error;

/// Fatal problems with the plot configuration, raised by `ScatterAssembler::configure`
/// (or while parsing back-end and symbol names).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("at least one back end must be enabled")]
    NoBackends,

    #[error("unknown back end '{0}' (expected one of: plotly, matplotlib)")]
    UnknownBackend(String),

    #[error("back end '{0}' is enabled more than once")]
    DuplicateBackend(String),

    #[error("dataset '{0}' is defined more than once")]
    DuplicateDataset(String),

    #[error("invalid size spec for back end '{backend}': {reason}")]
    InvalidSizeSpec { backend: String, reason: String },

    #[error("invalid color '{color}' for dataset '{dataset}'")]
    InvalidColor { dataset: String, color: String },

    #[error("unknown marker symbol '{0}'")]
    UnknownSymbol(String),
}

/// Size-column statistics that cannot be turned into marker sizes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DerivationError {
    /// `max == median`, so the normalization divides by zero.
    #[error("size column '{column}' has max equal to its median ({median}); sizes would be non-finite")]
    DegenerateRange { column: String, median: f64 },

    #[error("size column '{column}' has no non-missing values")]
    NoValues { column: String },
}
