use thiserror::Error;

/// Result alias for labstats operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the store.
///
/// All failures are synchronous argument-validation failures raised before
/// any state mutation; there are no I/O or resource failure modes.
#[derive(Debug, Error)]
pub enum Error {
    /// An operation received an argument outside its domain
    /// (non-finite observation value, zero aggregation count).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}
