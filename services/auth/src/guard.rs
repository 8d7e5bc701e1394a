//! Route guard for protected pages
//!
//! A pure classifier, re-evaluated on every render. It owns no state.

use crate::models::User;

/// Path a signed-out visitor is sent to
pub const LOGIN_PATH: &str = "/login";

/// Path a signed-in non-admin is sent to from admin pages
pub const HOME_PATH: &str = "/";

/// Outcome of guarding a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session not restored yet; show a placeholder
    Pending,
    /// Render the protected content
    Render,
    /// No user; go to the login page
    RedirectToLogin,
    /// User lacks the admin role; go home
    RedirectToHome,
}

impl GuardDecision {
    /// Where to navigate, for the redirecting outcomes
    pub fn redirect_target(&self) -> Option<&'static str> {
        match self {
            GuardDecision::RedirectToLogin => Some(LOGIN_PATH),
            GuardDecision::RedirectToHome => Some(HOME_PATH),
            GuardDecision::Pending | GuardDecision::Render => None,
        }
    }
}

/// Decide what a protected page shows
pub fn evaluate(session_loaded: bool, user: Option<&User>, requires_admin: bool) -> GuardDecision {
    if !session_loaded {
        return GuardDecision::Pending;
    }

    match user {
        None => GuardDecision::RedirectToLogin,
        Some(user) if requires_admin && !user.is_admin() => GuardDecision::RedirectToHome,
        Some(_) => GuardDecision::Render,
    }
}
