use std::ffi::NulError;

use thiserror::Error;

/// Severity classes shared by driver errors and the [`IssueLog`](crate::issues::IssueLog).
///
/// Numbering follows GDAL's `CPLErr`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CplErrType {
    None = 0,
    Debug = 1,
    Warning = 2,
    Failure = 3,
    Fatal = 4,
}

impl From<u32> for CplErrType {
    fn from(error_type: u32) -> Self {
        match error_type {
            0 => Self::None,
            1 => Self::Debug,
            2 => Self::Warning,
            3 => Self::Failure,
            _ => Self::Fatal,
        }
    }
}

/// Broad classes of failure a transfer can run into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Invalid or unreadable metadata handed to the engine.
    Configuration,
    /// A handle, driver or dataset that could not be obtained.
    Resource,
    /// Grid sizing and buffer sizes disagree.
    Data,
    /// Pixel encodings that cannot be represented.
    Encoding,
    /// A raw read, write or transform call failed in the driver.
    Io,
}

#[derive(Debug, Error)]
pub enum CoverageError {
    #[error("CPL error class: '{class:?}', error number: '{number}', error msg: '{msg}'")]
    CplError {
        class: CplErrType,
        number: i32,
        msg: String,
    },
    #[error("Method '{method_name}' returned a NULL pointer. Error msg: '{msg}'")]
    NullPointer {
        method_name: &'static str,
        msg: String,
    },
    #[error("Invalid property '{property}' for '{object}'")]
    InvalidProperty { property: String, object: String },
    #[error("Operation not supported: '{what}' in {provider}")]
    UnsupportedOperation { what: String, provider: String },
    #[error("Could not load '{object}': {what}")]
    CouldNotLoad { object: String, what: String },
    #[error("Couldn't create object for '{kind}': {name}")]
    CouldNotCreate { kind: String, name: String },
    #[error("Unsupported pixel encoding: {0}")]
    UnsupportedEncoding(String),
    #[error("Corrupt or invalid data size when reading data: {0}")]
    CorruptData(String),
    #[error("Block size of block {index} is undefined")]
    UndefinedBlockSize { index: usize },
    #[error("Block {index} has already been populated")]
    BlockAlreadyPopulated { index: usize },
    #[error("Block {index} holds {expected} values, got {actual}")]
    BlockLengthMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },
    #[error("Bad argument: {0}")]
    BadArgument(String),
    #[error(transparent)]
    FfiNulError(#[from] NulError),
    #[cfg(feature = "ndarray")]
    #[error(transparent)]
    NdarrayShapeError(#[from] ndarray::ShapeError),
}

impl CoverageError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CoverageError::InvalidProperty { .. }
            | CoverageError::UnsupportedOperation { .. }
            | CoverageError::BadArgument(_)
            | CoverageError::FfiNulError(_) => ErrorCategory::Configuration,
            CoverageError::NullPointer { .. }
            | CoverageError::CouldNotLoad { .. }
            | CoverageError::CouldNotCreate { .. } => ErrorCategory::Resource,
            CoverageError::CorruptData(_)
            | CoverageError::UndefinedBlockSize { .. }
            | CoverageError::BlockAlreadyPopulated { .. }
            | CoverageError::BlockLengthMismatch { .. } => ErrorCategory::Data,
            #[cfg(feature = "ndarray")]
            CoverageError::NdarrayShapeError(_) => ErrorCategory::Data,
            CoverageError::UnsupportedEncoding(_) => ErrorCategory::Encoding,
            CoverageError::CplError { .. } => ErrorCategory::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoverageError>;
