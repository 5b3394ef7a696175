//! Session state, invalidation events and the coordinator that reacts to them.
//!
//! The HTTP layer never touches storage or navigation itself: on an
//! authorization failure it emits [`SessionEvent::Unauthorized`] to its
//! listener, and the [`SessionCoordinator`] tears the session down.

use std::sync::{Arc, PoisonError, RwLock};

use afiliado_core::messages;
use afiliado_core::models::auth::User;
use afiliado_core::notify::Notifier;
use afiliado_core::session::{PersistedSession, SessionError, SessionStore};
use reqwest::Method;
use tracing::{info, warn};

/// Navigation entry points.
pub mod routes {
    pub const LOGIN: &str = "/login";
    pub const DASHBOARD: &str = "/dashboard";
    pub const CLIENT: &str = "/client";
}

/// Events the HTTP layer raises about the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The backend answered 401 to `method path`.
    Unauthorized { method: Method, path: String },
}

/// Receives session events. Called synchronously, before the request that
/// raised the event returns to its caller.
pub trait SessionListener: Send + Sync {
    fn on_session_event(&self, event: &SessionEvent);
}

/// Moves the user to another entry point.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Auth lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    /// Persisted storage has not been checked yet.
    #[default]
    Unresolved,
    Anonymous,
    Authenticated(User),
}

impl AuthState {
    pub fn user(&self) -> Option<&User> {
        match self {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// Where a user in `state` should land, or `None` while unresolved.
pub fn landing_route(state: &AuthState) -> Option<&'static str> {
    match state {
        AuthState::Unresolved => None,
        AuthState::Anonymous => Some(routes::LOGIN),
        AuthState::Authenticated(user) if user.is_admin() => Some(routes::DASHBOARD),
        AuthState::Authenticated(_) => Some(routes::CLIENT),
    }
}

/// In-memory auth state and its persisted mirror, shared between the auth
/// controller and the coordinator.
pub struct SessionHandle {
    state: RwLock<AuthState>,
    persisted: PersistedSession,
}

impl SessionHandle {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            state: RwLock::new(AuthState::Unresolved),
            persisted: PersistedSession::new(store),
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn persisted(&self) -> &PersistedSession {
        &self.persisted
    }

    /// Runs `load` and publishes its result if the state is still
    /// `Unresolved`. The check and the update happen under one write lock, so
    /// a session established meanwhile is never overwritten.
    pub(crate) fn resolve_with(
        &self,
        load: impl FnOnce(&PersistedSession) -> AuthState,
    ) -> AuthState {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if *state == AuthState::Unresolved {
            *state = load(&self.persisted);
        }
        state.clone()
    }

    /// Persists `user`/`token`, then publishes the authenticated state.
    pub(crate) fn establish(&self, user: User, token: &str) -> Result<(), SessionError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        self.persisted.save(&user, token)?;
        *state = AuthState::Authenticated(user);
        Ok(())
    }

    /// Drops the session from memory and storage. Storage errors are logged;
    /// the in-memory state always ends up `Anonymous`.
    pub(crate) fn teardown(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = self.persisted.clear() {
            warn!(error = %e, "failed to clear persisted session");
        }
        *state = AuthState::Anonymous;
    }
}

/// Single top-level consumer of [`SessionEvent`]s.
pub struct SessionCoordinator {
    session: Arc<SessionHandle>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

impl SessionCoordinator {
    pub fn new(
        session: Arc<SessionHandle>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            session,
            notifier,
            navigator,
        }
    }
}

impl SessionListener for SessionCoordinator {
    fn on_session_event(&self, event: &SessionEvent) {
        match event {
            SessionEvent::Unauthorized { method, path } => {
                info!(%method, %path, "session rejected by backend, signing out");
                self.session.teardown();
                self.notifier.error(messages::SESSION_EXPIRED);
                self.navigator.navigate(routes::LOGIN);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use afiliado_core::models::auth::{Role, UserId};
    use afiliado_core::notify::{Notification, NotificationLevel};
    use afiliado_core::session::{MemorySessionStore, TOKEN_KEY, USER_KEY};

    use super::*;

    #[derive(Default)]
    struct Recorder {
        routes: Mutex<Vec<String>>,
        notes: Mutex<Vec<Notification>>,
    }

    impl Navigator for Recorder {
        fn navigate(&self, route: &str) {
            self.routes.lock().unwrap().push(route.to_string());
        }
    }

    impl Notifier for Recorder {
        fn notify(&self, notification: Notification) {
            self.notes.lock().unwrap().push(notification);
        }
    }

    fn user(role: Role) -> User {
        User {
            id: UserId::Int(7),
            name: "Bia".into(),
            email: "bia@afiliado.top".into(),
            role,
        }
    }

    #[test]
    fn landing_route_follows_role() {
        assert_eq!(landing_route(&AuthState::Unresolved), None);
        assert_eq!(landing_route(&AuthState::Anonymous), Some(routes::LOGIN));
        assert_eq!(
            landing_route(&AuthState::Authenticated(user(Role::Admin))),
            Some(routes::DASHBOARD)
        );
        assert_eq!(
            landing_route(&AuthState::Authenticated(user(Role::Client))),
            Some(routes::CLIENT)
        );
    }

    #[test]
    fn resolve_keeps_an_established_session() {
        let store = Arc::new(MemorySessionStore::new());
        let session = SessionHandle::new(store);
        session.establish(user(Role::Client), "t2").unwrap();

        let mut loaded = false;
        let state = session.resolve_with(|_| {
            loaded = true;
            AuthState::Anonymous
        });

        assert!(!loaded);
        assert_eq!(state, AuthState::Authenticated(user(Role::Client)));
        assert_eq!(session.state(), state);
    }

    #[test]
    fn resolve_runs_once() {
        let session = SessionHandle::new(Arc::new(MemorySessionStore::new()));
        assert_eq!(session.resolve_with(|_| AuthState::Anonymous), AuthState::Anonymous);
        let state = session.resolve_with(|_| AuthState::Authenticated(user(Role::Admin)));
        assert_eq!(state, AuthState::Anonymous);
    }

    #[test]
    fn unauthorized_event_tears_down_and_redirects() {
        let store = Arc::new(MemorySessionStore::new());
        let session = Arc::new(SessionHandle::new(store.clone()));
        session.establish(user(Role::Admin), "t1").unwrap();

        let recorder = Arc::new(Recorder::default());
        let coordinator =
            SessionCoordinator::new(session.clone(), recorder.clone(), recorder.clone());

        coordinator.on_session_event(&SessionEvent::Unauthorized {
            method: Method::GET,
            path: "/products".into(),
        });

        assert_eq!(session.state(), AuthState::Anonymous);
        assert!(store.get(USER_KEY).unwrap().is_none());
        assert!(store.get(TOKEN_KEY).unwrap().is_none());
        assert_eq!(*recorder.routes.lock().unwrap(), vec![routes::LOGIN.to_string()]);
        assert_eq!(
            *recorder.notes.lock().unwrap(),
            vec![Notification::new(
                NotificationLevel::Error,
                messages::SESSION_EXPIRED
            )]
        );
    }
}
