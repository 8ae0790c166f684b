use serde::{Deserialize, Serialize};

use crate::engine::EngineError;
use crate::model::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    User,
}

/// Resolved identity of the requester, supplied by the surrounding
/// identity/session layer and passed explicitly into every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: UserId,
    pub role: Role,
}

impl Caller {
    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Admin,
        }
    }

    pub fn user(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::User,
        }
    }

    /// Gate for administrative operations. `action` names the operation
    /// for the error message.
    pub fn require_admin(&self, action: &'static str) -> Result<(), EngineError> {
        match self.role {
            Role::Admin => Ok(()),
            Role::User => Err(EngineError::Forbidden(action)),
        }
    }
}
