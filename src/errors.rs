// SPDX-License-Identifier: MPL-2.0

//! Error types for the photo store

use std::fmt;
use std::io;

/// Error domain reported alongside every [`StoreError`]
pub const ERROR_DOMAIN: &str = "PhotoStore";

/// Result type alias using StoreError
pub type StoreResult<T> = Result<T, StoreError>;

/// Error codes for problems accessing the photo store
///
/// The numeric values are stable and are shown to the user next to the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    /// An API failed without saying why
    UnknownError = 1,
    /// The store root directory could not be created
    CouldntCreateSharedStore = 100,
    /// A stereogram's property file could not be loaded
    CouldntLoadImageProperties = 101,
    /// A stereogram file is not in a format we understand
    InvalidFileFormat = 102,
    /// Index of a stereogram in the store is out of range
    IndexOutOfBounds = 103,
    /// One of a stereogram's required files is missing
    FileNotFound = 104,
    /// The operation has not been implemented
    NotImplemented = 105,
    /// The operation needs something this machine doesn't have
    FeatureUnavailable = 106,
}

impl ErrorCode {
    /// Numeric code as shown to users
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Short human-readable description of the code
    pub fn description(self) -> &'static str {
        match self {
            ErrorCode::UnknownError => "Unknown error",
            ErrorCode::CouldntCreateSharedStore => "Could not create the photo store",
            ErrorCode::CouldntLoadImageProperties => "Could not load image properties",
            ErrorCode::InvalidFileFormat => "Invalid file format",
            ErrorCode::IndexOutOfBounds => "Index out of bounds",
            ErrorCode::FileNotFound => "File not found",
            ErrorCode::NotImplemented => "Not implemented",
            ErrorCode::FeatureUnavailable => "Feature unavailable",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Error returned by every fallible store, stereogram and imaging operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    pub code: ErrorCode,
    pub message: String,
}

impl StoreError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Generic error for when something failed without giving a reason
    ///
    /// `location` names the function that failed.
    pub fn unknown_error_with_location(location: &str) -> Self {
        Self::new(
            ErrorCode::UnknownError,
            format!("Unknown error in {}", location),
        )
    }

    pub fn index_out_of_bounds(index: usize, count: usize) -> Self {
        Self::new(
            ErrorCode::IndexOutOfBounds,
            format!("Index {} is out of range (store has {} items)", index, count),
        )
    }

    pub fn not_implemented(what: &str) -> Self {
        Self::new(ErrorCode::NotImplemented, format!("{} is not implemented", what))
    }

    /// Error domain; always [`ERROR_DOMAIN`]
    pub fn domain(&self) -> &'static str {
        ERROR_DOMAIN
    }

    pub fn is(&self, code: ErrorCode) -> bool {
        self.code == code
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for StoreError {}

impl From<io::Error> for StoreError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => StoreError::new(ErrorCode::FileNotFound, err.to_string()),
            _ => StoreError::new(ErrorCode::UnknownError, err.to_string()),
        }
    }
}

impl From<image::ImageError> for StoreError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(io_err) => io_err.into(),
            image::ImageError::Unsupported(_) => {
                StoreError::new(ErrorCode::FeatureUnavailable, err.to_string())
            }
            _ => StoreError::new(ErrorCode::InvalidFileFormat, err.to_string()),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::new(ErrorCode::InvalidFileFormat, err.to_string())
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        StoreError::new(
            ErrorCode::UnknownError,
            format!("Background task failed: {}", err),
        )
    }
}

// Conversion from String for ad-hoc messages
impl From<String> for StoreError {
    fn from(msg: String) -> Self {
        StoreError::new(ErrorCode::UnknownError, msg)
    }
}

impl From<&str> for StoreError {
    fn from(msg: &str) -> Self {
        StoreError::new(ErrorCode::UnknownError, msg.to_string())
    }
}
