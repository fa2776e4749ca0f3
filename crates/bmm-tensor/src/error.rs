use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TensorError {
    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch { expected: Vec<usize>, got: Vec<usize> },
    #[error("input {input} must have at least 2 dimensions, got {ndim}")]
    RankTooLow { input: &'static str, ndim: usize },
    #[error("dimension mismatch: batch shapes {a:?} and {b:?} differ")]
    BatchShapeMismatch { a: Vec<usize>, b: Vec<usize> },
    #[error("dtype mismatch: expected {expected}, got {got}")]
    DTypeMismatch { expected: String, got: String },
    #[error("cannot broadcast shapes {a:?} and {b:?}")]
    BroadcastError { a: Vec<usize>, b: Vec<usize> },
    #[error("dimension mismatch in matrix multiplication: [{m}x{k}] @ [{k2}x{n}]")]
    MatmulMismatch {
        m: usize,
        k: usize,
        k2: usize,
        n: usize,
    },
    #[error("unsupported dtype: {0}")]
    UnsupportedDType(String),
    #[error("{0}")]
    Other(String),
}

impl TensorError {
    /// True for the errors raised by shape validation: rank, batch
    /// compatibility and contraction checks.
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self,
            TensorError::ShapeMismatch { .. }
                | TensorError::RankTooLow { .. }
                | TensorError::BatchShapeMismatch { .. }
                | TensorError::BroadcastError { .. }
                | TensorError::MatmulMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, TensorError>;
