//! Auth session controller.
//!
//! Owns the signed-in identity: hydrates it from the persisted store once at
//! startup and moves it between `Anonymous` and `Authenticated` on login and
//! logout. Persistence is always written before memory, so readers never see
//! a user that is not also stored.

use std::sync::Arc;

use afiliado_core::messages;
use afiliado_core::models::auth::{
    LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, User,
};
use afiliado_core::notify::Notifier;
use afiliado_core::session::SessionError;
use afiliado_core::validation::{self, ValidationError};
use thiserror::Error;
use tracing::{info, warn};

use crate::endpoints;
use crate::http::ApiClient;
use crate::inflight::InFlightGuard;
use crate::session::{AuthState, SessionHandle};

const LOGIN_KEY: &str = "auth:login";
const REGISTER_KEY: &str = "auth:register";

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Login or registration was not accepted")]
    Rejected,

    #[error("Another authentication request is already running")]
    Busy,

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Session storage error: {0}")]
    Storage(#[from] SessionError),
}

/// Controller for the current user session.
pub struct AuthSession {
    client: ApiClient,
    session: Arc<SessionHandle>,
    notifier: Arc<dyn Notifier>,
    in_flight: InFlightGuard,
}

impl AuthSession {
    pub fn new(client: ApiClient, session: Arc<SessionHandle>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            client,
            session,
            notifier,
            in_flight: InFlightGuard::new(),
        }
    }

    /// Resolves the startup state from storage. Only the first call has an
    /// effect; later calls return the current state.
    pub fn hydrate(&self) -> AuthState {
        self.session.resolve_with(|persisted| match persisted.user() {
            Ok(Some(user)) => {
                info!(user = %user.email, "restored session from storage");
                AuthState::Authenticated(user)
            }
            Ok(None) => AuthState::Anonymous,
            Err(e) => {
                warn!(error = %e, "ignoring unreadable stored session");
                if let Err(e) = persisted.clear() {
                    warn!(error = %e, "failed to clear unreadable session");
                }
                AuthState::Anonymous
            }
        })
    }

    pub fn state(&self) -> AuthState {
        self.session.state()
    }

    pub fn user(&self) -> Option<User> {
        self.session.state().user().cloned()
    }

    /// True until [`hydrate`](Self::hydrate) has run.
    pub fn is_loading(&self) -> bool {
        self.session.state() == AuthState::Unresolved
    }

    pub fn is_admin(&self) -> bool {
        self.user().is_some_and(|u| u.is_admin())
    }

    /// Signs in. Any outcome other than a token plus a user leaves the state
    /// untouched and returns [`AuthError::Rejected`] without a notification.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let _ticket = self.in_flight.try_acquire(LOGIN_KEY).ok_or(AuthError::Busy)?;

        let response: LoginResponse = self
            .client
            .post(endpoints::LOGIN, &LoginRequest { email, password })
            .await
            .ok_or(AuthError::Rejected)?;

        let Some((token, user)) = response.into_session() else {
            info!(%email, "login response carried no session");
            return Err(AuthError::Rejected);
        };

        self.session.establish(user.clone(), &token)?;
        info!(user = %user.email, role = %user.role, "signed in");
        self.notifier.success(&messages::welcome(&user.name));
        Ok(user)
    }

    /// Creates an account. Does not sign in.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<(), AuthError> {
        if let Err(e) = validation::validate_registration(name, email, password) {
            self.notifier.error(&e.to_string());
            return Err(e.into());
        }
        let _ticket = self
            .in_flight
            .try_acquire(REGISTER_KEY)
            .ok_or(AuthError::Busy)?;

        let name = validation::sanitize_input(name);
        let email = email.trim();
        let response: Option<RegisterResponse> = self
            .client
            .post(
                endpoints::REGISTER,
                &RegisterRequest {
                    name: &name,
                    email,
                    password,
                },
            )
            .await;

        match response {
            Some(RegisterResponse { success: true, .. }) => {
                info!(%email, "account registered");
                self.notifier.success(messages::REGISTER_SUCCESS);
                Ok(())
            }
            _ => {
                self.notifier.error(messages::REGISTER_FAILED);
                Err(AuthError::Rejected)
            }
        }
    }

    /// Signs out. Always ends `Anonymous`, even if storage cannot be cleared.
    pub fn logout(&self) {
        self.session.teardown();
        info!("signed out");
        self.notifier.info(messages::LOGOUT);
    }
}
