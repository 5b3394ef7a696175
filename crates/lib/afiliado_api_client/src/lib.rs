//! # afiliado_api_client
//!
//! Client side of the AfiliadoBot dashboard: a JSON HTTP wrapper that never
//! surfaces errors to callers, the auth session controller and the product
//! list controller built on top of it.
//!
//! [`Dashboard::new`] wires the pieces together: one persisted session, one
//! HTTP client whose 401s are routed to a [`SessionCoordinator`], and the two
//! controllers sharing that client.

pub mod auth;
pub mod config;
pub mod endpoints;
pub mod http;
pub mod inflight;
pub mod products;
pub mod session;

use std::sync::Arc;

use afiliado_core::notify::Notifier;
use afiliado_core::session::SessionStore;
use thiserror::Error;

use crate::auth::AuthSession;
use crate::config::ClientConfig;
use crate::http::ApiClient;
use crate::products::ProductsController;
use crate::session::{Navigator, SessionCoordinator, SessionHandle};

/// Client construction errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// The controllers a presentation layer talks to.
pub struct Dashboard {
    pub auth: AuthSession,
    pub products: ProductsController,
}

impl Dashboard {
    pub fn new(
        config: &ClientConfig,
        store: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ClientError> {
        let session = Arc::new(SessionHandle::new(Arc::clone(&store)));
        let coordinator = Arc::new(SessionCoordinator::new(
            Arc::clone(&session),
            Arc::clone(&notifier),
            navigator,
        ));
        let client = ApiClient::new(config, store, Arc::clone(&notifier))?
            .with_session_listener(coordinator);

        Ok(Self {
            auth: AuthSession::new(client.clone(), session, Arc::clone(&notifier)),
            products: ProductsController::new(client, notifier),
        })
    }
}

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
