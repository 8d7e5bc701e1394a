//! Session store for the MovieDB client
//!
//! Owns the signed-in user and their bearer token, persists them across
//! restarts, and decides whether a protected page may render.

pub mod error;
pub mod guard;
pub mod models;
pub mod session;
pub mod validation;

pub use error::{AuthError, AuthResult};
pub use guard::GuardDecision;
pub use models::{AuthSession, Role, User};
pub use session::{AuthEndpoints, SESSION_STORAGE_KEY, SessionState, SessionStore};
