use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("record not found: {kind} `{id}`")]
    RecordNotFound { kind: String, id: String },

    #[error("asset not found: {0}")]
    AssetNotFound(String),

    #[error("asset copy failed: {0}")]
    AssetCopyFailed(String),

    #[error("evidence index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("persist failed: {0}")]
    PersistFailed(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;
