use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpError {
    #[error("tensor error: {0}")]
    Tensor(#[from] bmm_tensor::TensorError),
    #[error("invalid value for argument '{name}': expected {expected}, got {got}")]
    InvalidArgument {
        name: String,
        expected: String,
        got: String,
    },
    #[error("failed to parse operator configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl OpError {
    /// True when the failure came from shape validation (rank, batch
    /// compatibility or contraction dimension).
    pub fn is_shape_error(&self) -> bool {
        matches!(self, OpError::Tensor(e) if e.is_shape_error())
    }
}

pub type Result<T> = std::result::Result<T, OpError>;
