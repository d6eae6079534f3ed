use thiserror::Error;

/// Errors raised while building or loading a simulation configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A parameter is outside its allowed range.
    #[error("invalid {field}: {reason}")]
    InvalidParameter {
        field: String,
        reason: &'static str,
    },
    /// The arena leaves no room inside the border margin.
    #[error("arena {width}x{height} is too small for a border margin of {margin}")]
    ArenaTooSmall { width: f32, height: f32, margin: f32 },
    /// The configuration document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
