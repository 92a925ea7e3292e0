use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    /// Malformed input to a calculator (unsorted brackets, empty sample set).
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Out-of-range simulation parameters; raised before any sample executes.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    #[error("simulation cancelled")]
    Cancelled,
}

pub type SimulationResult<T> = Result<T, SimulationError>;
