use thiserror::Error;

use crate::visit::stages::StageId;

/// Errors returned by session operations.
///
/// A re-entrant call is not an error; it resolves to `Advance::Ignored`.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("no party on this visit; set a party reference or party name first")]
    PreconditionUnmet,
    #[error("stage {requested} is not actionable (next stage: {})", describe_next(.actionable))]
    StageNotActionable {
        requested: StageId,
        actionable: Option<StageId>,
    },
    #[error("every stage of this visit is already recorded")]
    AlreadyComplete,
    #[error("stage {0} is not part of this workflow")]
    UnknownStage(StageId),
    #[error("visit must be saved before {0}")]
    Unsaved(&'static str),
    #[error("no remote procedure endpoint is configured")]
    RemoteUnavailable,
    #[error("document store error: {0}")]
    Persistence(#[from] StoreError),
    #[error("remote call failed: {0}")]
    Remote(#[from] RpcError),
    #[error(transparent)]
    StageTable(#[from] StageTableError),
}

fn describe_next(actionable: &Option<StageId>) -> String {
    actionable.map_or_else(|| "none".to_string(), |id| id.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("document {0} not found")]
    NotFound(String),
    #[error("save rejected: {0}")]
    Rejected(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("malformed document: {0}")]
    Malformed(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Malformed(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    #[error("{method} failed: {message}")]
    Failed { method: String, message: String },
    #[error("transport error: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("geolocation is not supported on this device")]
    Unsupported,
    #[error("location permission denied")]
    PermissionDenied,
    #[error("position unavailable: {0}")]
    PositionUnavailable(String),
    #[error("timed out after {0} ms")]
    Timeout(u64),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageTableError {
    #[error("a workflow needs at least one stage")]
    Empty,
    #[error("stage {0} appears more than once")]
    Duplicate(StageId),
    #[error("unknown stage '{0}'")]
    UnknownStage(String),
    #[error("stage {stamped} is recorded but earlier stage {missing} is not")]
    ProgressionGap { stamped: StageId, missing: StageId },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_actionable_message() {
        let err = WorkflowError::StageNotActionable {
            requested: StageId::CheckOut,
            actionable: Some(StageId::CheckIn),
        };
        assert_eq!(
            err.to_string(),
            "stage check_out is not actionable (next stage: check_in)"
        );

        let done = WorkflowError::StageNotActionable {
            requested: StageId::CheckOut,
            actionable: None,
        };
        assert!(done.to_string().ends_with("(next stage: none)"));
    }

    #[test]
    fn test_store_error_converts_into_persistence() {
        let err: WorkflowError = StoreError::Rejected("timestamp mismatch".into()).into();
        assert!(matches!(err, WorkflowError::Persistence(_)));
        assert_eq!(
            err.to_string(),
            "document store error: save rejected: timestamp mismatch"
        );
    }
}
