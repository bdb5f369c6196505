//! Errors shared by every RPC-facing crate: failures that originate at the
//! wire boundary rather than inside the protocol engine itself.

use protocol::errors::CoreError;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum AppError {
    /// The request body did not parse into a known [`crate::Action`].
    InvalidRequest,
    /// A base64 field failed to decode, or decoded to the wrong length.
    Encoding(&'static str),
    /// Propagated from the protocol engine.
    Core(CoreError),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::InvalidRequest => write!(f, "invalid request"),
            AppError::Encoding(field) => write!(f, "field '{}' failed to decode", field),
            AppError::Core(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for AppError {}

impl From<CoreError> for AppError {
    fn from(value: CoreError) -> Self {
        AppError::Core(value)
    }
}
