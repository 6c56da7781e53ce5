//! Error types for image operations.

use thiserror::Error;

/// Error type for image operations.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Sample data does not match the stated dimensions.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for image operations.
pub type OpsResult<T> = Result<T, OpsError>;

impl From<OpsError> for dynimg_core::Error {
    fn from(err: OpsError) -> Self {
        match err {
            OpsError::InvalidDimensions(msg) => dynimg_core::Error::dimension_mismatch(msg),
            OpsError::InvalidParameter(msg) => dynimg_core::Error::malformed(msg),
        }
    }
}
