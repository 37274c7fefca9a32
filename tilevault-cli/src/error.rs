//! CLI error type.

use std::fmt;

use tilevault::config::ConfigError;
use tilevault::engine::store::StoreError;
use tilevault::ClientError;

/// Errors surfaced to the terminal.
///
/// Every variant renders as a one-line user-visible message and a
/// non-zero exit code; none is retried and none panics.
#[derive(Debug)]
pub enum CliError {
    /// Configuration file problem.
    Config(ConfigError),

    /// Engine snapshot could not be opened.
    Store(StoreError),

    /// A region operation failed.
    Client(ClientError),

    /// A download attempt ended in a terminal error event.
    DownloadFailed(String),

    /// The given region id is not in storage.
    NoSuchRegion(u64),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{}", err),
            Self::Store(err) => write!(f, "{}", err),
            Self::Client(err) => write!(f, "{}", err),
            Self::DownloadFailed(reason) => write!(f, "download failed: {}", reason),
            Self::NoSuchRegion(id) => write!(f, "no region with id {}", id),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Client(err) => Some(err),
            Self::DownloadFailed(_) | Self::NoSuchRegion(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<ClientError> for CliError {
    fn from(err: ClientError) -> Self {
        Self::Client(err)
    }
}
