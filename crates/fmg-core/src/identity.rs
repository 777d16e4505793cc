use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Role;

/// Lightweight authenticated caller identity for cross-crate passing.
///
/// Produced by `fmg-server` from a verified bearer token plus the caller's
/// profile row. Contains only data fields.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AuthIdentity {
    /// Auth user id (JWT `sub` claim).
    pub user_id: String,
    pub email: Option<String>,
    /// Role from the profile row. `Client` when the profile is missing.
    pub role: Role,
}

impl AuthIdentity {
    #[must_use]
    pub const fn is_staff_side(&self) -> bool {
        self.role.is_staff_side()
    }
}
