use thiserror::Error;

/// Failures produced by the pure computation layer (statistics, classifier,
/// analyzer, scorer). Cloneable so cached computations can fan an error out
/// to every waiter of a single-flight recompute.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("not enough data: {0}")]
    InsufficientData(String),
    #[error("no eligible recommendation candidates")]
    EmptyPool,
    #[error("validation failed: {0}")]
    Validation(String),
}

/// Failures surfaced by the persistence collaborator behind the store traits.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("store backend failure: {0}")]
    Backend(String),
    #[error("store decode failure: {0}")]
    Decode(String),
}

/// Failures surfaced by the service facade to the serving layer.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("menu item not found: {0}")]
    ItemNotFound(String),
}

impl ServiceError {
    /// A short stable label for logs and machine-readable command output.
    pub fn class(&self) -> &'static str {
        match self {
            Self::Engine(EngineError::InsufficientData(_)) => "insufficient_data",
            Self::Engine(EngineError::EmptyPool) => "empty_pool",
            Self::Engine(EngineError::Validation(_)) => "validation",
            Self::Store(_) => "store",
            Self::ItemNotFound(_) => "not_found",
        }
    }
}
