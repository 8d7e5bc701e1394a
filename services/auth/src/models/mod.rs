//! Session store models

pub mod session;
pub mod user;

// Re-export for convenience
pub use session::AuthSession;
pub use user::{LoginCredentials, NewUser, Role, User};
