use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipperError {
    /// Format-selection string no variant answers to. Raised before any
    /// load attempt.
    #[error("unknown native library format: {0}")]
    UnknownFormat(String),

    /// No applicable kernel format could be initialized.
    #[error("could not load the native library: {message}")]
    LoadFailure { message: String },

    /// The caller broke a documented precondition; never retried.
    #[error("{0}")]
    UsagePrecondition(&'static str),

    /// The kernel reported a non-success status for one call.
    #[error("native {op} call failed with status {status}")]
    Kernel { op: &'static str, status: i32 },

    /// A kernel reply we could not make sense of.
    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, ClipperError>;
