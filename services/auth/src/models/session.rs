//! Session model and related functionality

use serde::{Deserialize, Serialize};

use super::user::User;

/// Authenticated identity paired with its credential
///
/// This is both the body returned by the login/register endpoints and the
/// record persisted under the session storage key. User and token live in one
/// value so they are always set and cleared together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

impl AuthSession {
    /// A record is usable only with a non-empty token
    pub fn is_well_formed(&self) -> bool {
        !self.token.trim().is_empty() && !self.user.id.is_empty()
    }
}
