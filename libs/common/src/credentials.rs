//! Seam between the session owner and stores that make authenticated calls

/// Source of the bearer token for authenticated requests
///
/// Implemented by the session store. Other stores hold it as a handle so they
/// can attach the current token and report a rejected credential without
/// depending on the session store itself.
pub trait CredentialSource: Send + Sync {
    /// Current bearer token, if a user is signed in
    fn bearer_token(&self) -> Option<String>;

    /// Called when the server answered 401 to a request that carried the token
    fn invalidate(&self);
}

/// Credential source for callers that never authenticate
#[derive(Debug, Default, Clone, Copy)]
pub struct Anonymous;

impl CredentialSource for Anonymous {
    fn bearer_token(&self) -> Option<String> {
        None
    }

    fn invalidate(&self) {}
}
