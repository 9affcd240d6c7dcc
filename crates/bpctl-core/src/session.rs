//! Session and identity collaborators.

use serde::{Deserialize, Serialize};

use crate::Result;

/// The operator the current session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
}

/// Validates that the operator has a usable session against a target.
pub trait SessionChecker: Send + Sync {
    /// Check login state, optionally also requiring a targeted org/space.
    fn check_target(&self, require_org: bool, require_space: bool) -> Result<()>;
}

/// Supplies the identity of the logged-in operator.
pub trait IdentityProvider: Send + Sync {
    fn current_user(&self) -> Result<User>;
}
