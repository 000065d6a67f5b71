use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TruthLensError {
    /// Request that cannot be analyzed as given.
    #[error("{0}")]
    InvalidInput(String),

    #[error("unknown news category: {0}")]
    UnknownCategory(String),
}

pub type Result<T> = std::result::Result<T, TruthLensError>;
