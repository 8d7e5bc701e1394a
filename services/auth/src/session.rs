//! Session store: the current identity, its credential, and their persistence
//!
//! The store is constructed once at startup, restores any persisted session
//! without contacting the server, and publishes every change through a
//! `watch` channel. A revoked token is discovered lazily: whichever store
//! sees a 401 for it calls [`CredentialSource::invalidate`].

use std::sync::Arc;

use common::{
    ApiClient, ApiError, ApiRequest, ClientConfig, CredentialSource, Storage,
    config::{DEFAULT_LOGIN_PATH, DEFAULT_REGISTER_PATH},
};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    error::{AuthError, AuthResult},
    guard::{self, GuardDecision},
    models::{AuthSession, LoginCredentials, NewUser, User},
    validation::{validate_email, validate_name, validate_password, validate_present},
};

/// Well-known key the session record is persisted under
pub const SESSION_STORAGE_KEY: &str = "user";

/// Paths of the authentication endpoints, relative to the API base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthEndpoints {
    pub login: String,
    pub register: String,
}

impl AuthEndpoints {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            login: config.login_path.clone(),
            register: config.register_path.clone(),
        }
    }
}

impl Default for AuthEndpoints {
    fn default() -> Self {
        Self {
            login: DEFAULT_LOGIN_PATH.to_string(),
            register: DEFAULT_REGISTER_PATH.to_string(),
        }
    }
}

/// Snapshot of the session published to subscribers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Startup rehydration has finished
    pub loaded: bool,
    pub session: Option<AuthSession>,
}

impl SessionState {
    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }

    pub fn is_admin(&self) -> bool {
        self.user().is_some_and(User::is_admin)
    }
}

/// Owner of the authenticated session
pub struct SessionStore {
    client: ApiClient,
    storage: Arc<dyn Storage>,
    endpoints: AuthEndpoints,
    state: watch::Sender<SessionState>,
}

impl SessionStore {
    /// Create the store and restore any persisted session
    pub fn new(client: ApiClient, storage: Arc<dyn Storage>, endpoints: AuthEndpoints) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        let store = Self {
            client,
            storage,
            endpoints,
            state,
        };
        store.rehydrate();
        store
    }

    /// Restore the persisted record, trusting it without a server round-trip
    fn rehydrate(&self) {
        let session = match self.storage.get(SESSION_STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<AuthSession>(&raw) {
                Ok(session) if session.is_well_formed() => {
                    info!("Restored session for {}", session.user.email);
                    Some(session)
                }
                Ok(_) => {
                    warn!("Discarding persisted session without a token");
                    self.forget_persisted();
                    None
                }
                Err(e) => {
                    warn!("Discarding unreadable persisted session: {}", e);
                    self.forget_persisted();
                    None
                }
            },
            Ok(None) => {
                debug!("No persisted session");
                None
            }
            Err(e) => {
                warn!("Failed to read persisted session: {}", e);
                None
            }
        };

        self.state.send_replace(SessionState {
            loaded: true,
            session,
        });
    }

    /// Subscribe to session changes
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Current state
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.state.borrow().loaded
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().token().map(str::to_string)
    }

    /// True iff the signed-in user has the admin role
    pub fn is_admin(&self) -> bool {
        self.state.borrow().is_admin()
    }

    /// Evaluate the route guard against the current session
    pub fn guard(&self, requires_admin: bool) -> GuardDecision {
        let state = self.state.borrow();
        guard::evaluate(state.loaded, state.user(), requires_admin)
    }

    /// Sign in with email and password
    ///
    /// On failure the previous session, if any, is left untouched.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<()> {
        validate_present("Email", email).map_err(AuthError::Invalid)?;
        validate_present("Password", password).map_err(AuthError::Invalid)?;

        let credentials = LoginCredentials {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        info!("Login attempt for {}", credentials.email);

        let session = self
            .authenticate(&self.endpoints.login, &credentials, "Login failed")
            .await?;
        self.establish(session);
        Ok(())
    }

    /// Create an account and sign in with it
    pub async fn register(&self, name: &str, email: &str, password: &str) -> AuthResult<()> {
        validate_name(name).map_err(AuthError::Invalid)?;
        validate_email(email).map_err(AuthError::Invalid)?;
        validate_password(password).map_err(AuthError::Invalid)?;

        let new_user = NewUser {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        info!("Registration attempt for {}", new_user.email);

        let session = self
            .authenticate(&self.endpoints.register, &new_user, "Registration failed")
            .await?;
        self.establish(session);
        Ok(())
    }

    /// Sign out. Idempotent; never fails.
    pub fn logout(&self) {
        let was_signed_in = self
            .state
            .send_if_modified(|state| state.session.take().is_some());
        self.forget_persisted();

        if was_signed_in {
            info!("Signed out");
        }
    }

    async fn authenticate<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> AuthResult<AuthSession> {
        let request = ApiRequest::post(path)
            .json(body)
            .map_err(|e| AuthError::rejected(e, fallback))?;

        let session: AuthSession = self.client.fetch(request).await.map_err(|e| {
            warn!("Authentication request to {} failed: {}", path, e);
            AuthError::rejected(e, fallback)
        })?;

        if !session.is_well_formed() {
            warn!("Authentication response from {} carried no token", path);
            return Err(AuthError::rejected(
                ApiError::Decode("response carried no token".to_string()),
                fallback,
            ));
        }

        Ok(session)
    }

    fn establish(&self, session: AuthSession) {
        match serde_json::to_string(&session) {
            Ok(raw) => {
                if let Err(e) = self.storage.set(SESSION_STORAGE_KEY, &raw) {
                    warn!("Failed to persist session: {}", e);
                }
            }
            Err(e) => warn!("Failed to serialize session: {}", e),
        }

        info!(
            "Signed in as {} (role: {})",
            session.user.email, session.user.role
        );
        self.state.send_modify(|state| {
            state.loaded = true;
            state.session = Some(session);
        });
    }

    fn forget_persisted(&self) {
        if let Err(e) = self.storage.delete(SESSION_STORAGE_KEY) {
            warn!("Failed to clear persisted session: {}", e);
        }
    }
}

impl CredentialSource for SessionStore {
    fn bearer_token(&self) -> Option<String> {
        self.token()
    }

    fn invalidate(&self) {
        warn!("Server rejected the session token; signing out");
        self.logout();
    }
}
