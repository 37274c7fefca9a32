//! Error types for the region manager client.

use crate::engine::EngineError;
use crate::region::RegionId;
use crate::request::RequestError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors surfaced by the region manager.
///
/// Every variant is terminal for the request that produced it. The client
/// never retries: failures are meant to be shown to the user as a
/// transient notice and then forgotten.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientError {
    /// The request was rejected before reaching the engine.
    InvalidRequest(RequestError),

    /// The engine rejected region creation.
    CreateFailed(String),

    /// The engine failed to list stored regions.
    ListFailed(String),

    /// The engine failed to delete a region; it remains in storage.
    DeleteFailed(String),

    /// The operation referenced a region the engine no longer stores.
    UnknownRegion(RegionId),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequest(err) => write!(f, "invalid region request: {}", err),
            Self::CreateFailed(reason) => write!(f, "failed to create region: {}", reason),
            Self::ListFailed(reason) => write!(f, "failed to list regions: {}", reason),
            Self::DeleteFailed(reason) => write!(f, "failed to delete region: {}", reason),
            Self::UnknownRegion(id) => write!(f, "region {} does not exist", id),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidRequest(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RequestError> for ClientError {
    fn from(err: RequestError) -> Self {
        Self::InvalidRequest(err)
    }
}

impl From<EngineError> for ClientError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::CreateFailed(reason) => Self::CreateFailed(reason),
            EngineError::ListFailed(reason) => Self::ListFailed(reason),
            EngineError::DeleteFailed(reason) => Self::DeleteFailed(reason),
            EngineError::UnknownRegion(id) => Self::UnknownRegion(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_display() {
        let err = ClientError::CreateFailed("storage full".to_string());
        assert_eq!(err.to_string(), "failed to create region: storage full");
    }

    #[test]
    fn test_engine_error_maps_by_operation() {
        let err: ClientError = EngineError::DeleteFailed("locked".to_string()).into();
        assert_eq!(err, ClientError::DeleteFailed("locked".to_string()));

        let err: ClientError = EngineError::UnknownRegion(RegionId(3)).into();
        assert_eq!(err, ClientError::UnknownRegion(RegionId(3)));
    }

    #[test]
    fn test_request_error_maps_to_invalid_request() {
        let err: ClientError = RequestError::EmptyStyleUrl.into();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }
}
