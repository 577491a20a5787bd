/// Result type for perfscope operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the analytics core when its inputs break a precondition
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("interval {index} is earlier than the interval before it")]
    NonMonotonicTimestamps { index: usize },

    #[error("unparseable interval timestamp: {value:?}")]
    InvalidTimestamp { value: String },

    #[error("merge would write index {index} past the end of a {full_count}-entry result set")]
    MergeOutOfBounds { index: usize, full_count: usize },

    #[error("page length must be greater than zero")]
    ZeroPageLength,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
