use std::path::PathBuf;
use thiserror::Error;

/// Rejected simulation settings, reported at construction time
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("field dimensions must be finite and in [1, {max}], got {width}x{height}")]
    InvalidField { width: f32, height: f32, max: f32 },
    #[error("agent radius {radius} does not fit a {width}x{height} field")]
    AgentDoesNotFit { radius: f32, width: f32, height: f32 },
    #[error("{name} must be in [0, 1], got {value}")]
    ProbabilityOutOfRange { name: &'static str, value: f32 },
    #[error("{name} must be non-negative and finite, got {value}")]
    NegativeValue { name: &'static str, value: f32 },
    #[error("{name} must be at least 1")]
    ZeroCount { name: &'static str },
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Caller contract violations in the genetic algorithm
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum EvolutionError {
    #[error("cannot evolve an empty population")]
    EmptyPopulation,
    #[error("requested next generation of size zero")]
    ZeroTargetSize,
}
