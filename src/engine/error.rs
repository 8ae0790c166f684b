use ulid::Ulid;

use crate::model::{OccupancyId, RequestStatus};

#[derive(Debug)]
pub enum EngineError {
    /// Malformed or missing input; detected before any state access.
    InvalidArgument(&'static str),
    /// Operation attempted against a request not in the required state.
    InvalidState {
        expected: RequestStatus,
        actual: RequestStatus,
    },
    /// Committing would overlap the named occupancy for the same room/date.
    Conflict(OccupancyId),
    NotFound(Ulid),
    /// Caller role does not permit the named operation.
    Forbidden(&'static str),
    LimitExceeded(&'static str),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            EngineError::InvalidState { expected, actual } => {
                write!(f, "request is {actual}, operation requires {expected}")
            }
            EngineError::Conflict(id) => write!(f, "conflicts with occupancy: {id}"),
            EngineError::NotFound(id) => write!(f, "not found: {id}"),
            EngineError::Forbidden(action) => write!(f, "{action} requires the ADMIN role"),
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}
