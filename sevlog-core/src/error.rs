use std::collections::TryReserveError;
use std::fmt;

/// Everything a log call can fail with.
///
/// `Filtered` is not a failure of the caller's control flow; it only
/// reports that the record was dropped by the active mask.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("logger has not been initialized")]
    Uninitialized,
    #[error("severity level is filtered by the active mask")]
    Filtered,
    #[error("log buffer allocation failed: {0}")]
    Allocation(#[from] TryReserveError),
    #[error("payload formatting failed: {0}")]
    Format(#[from] fmt::Error),
}

impl Error {
    /// Stable numeric code for callers that surface errors as integers.
    pub const fn code(&self) -> i32 {
        match self {
            Self::Uninitialized => -1,
            Self::Filtered => -2,
            Self::Allocation(_) => -3,
            Self::Format(_) => -4,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
