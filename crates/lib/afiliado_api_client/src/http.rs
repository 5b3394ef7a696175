//! HTTP client wrapper.
//!
//! Every call resolves to either a decoded payload or `None`. Failures never
//! reach the caller as errors: they are logged, turned into a notification,
//! and, for 401s, raised as a [`SessionEvent`] before the call returns.

use std::sync::Arc;

use afiliado_core::messages;
use afiliado_core::notify::Notifier;
use afiliado_core::session::{PersistedSession, SessionStore};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::ClientError;
use crate::config::ClientConfig;
use crate::session::{SessionEvent, SessionListener};

/// Why a request produced no payload.
#[derive(Debug, Error)]
pub(crate) enum RequestError {
    #[error("transport failure: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("HTTP 401 Unauthorized")]
    Unauthorized,

    #[error("HTTP {status}")]
    Status {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("unexpected response body: {0}")]
    Decode(String),
}

/// Thin JSON client bound to the API base URL.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Arc<str>,
    log_failures: bool,
    session: PersistedSession,
    notifier: Arc<dyn Notifier>,
    listener: Option<Arc<dyn SessionListener>>,
}

impl ApiClient {
    /// Builds a client. The bearer token is read from `store` on every
    /// request; the client itself never writes to it.
    pub fn new(
        config: &ClientConfig,
        store: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ClientError> {
        let base_url = config.normalized_base_url()?;
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            log_failures: config.log_failures,
            session: PersistedSession::new(store),
            notifier,
            listener: None,
        })
    }

    /// Registers the consumer of [`SessionEvent`]s.
    pub fn with_session_listener(mut self, listener: Arc<dyn SessionListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        self.request::<T, ()>(Method::GET, path, None).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Option<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Option<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        self.request::<T, ()>(Method::DELETE, path, None).await
    }

    async fn request<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Option<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let result = self.execute(method.clone(), path, body).await;
        self.absorb(&method, path, result)
    }

    async fn execute<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, RequestError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self
            .http
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, "application/json");

        match self.session.token() {
            Ok(Some(token)) => req = req.bearer_auth(token),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "could not read session token, sending anonymously"),
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        debug!(%method, %url, "sending request");
        let resp = req.send().await.map_err(RequestError::Transport)?;
        let status = resp.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(RequestError::Unauthorized);
        }
        if !status.is_success() {
            let message = match resp.bytes().await {
                Ok(bytes) => extract_message(&bytes),
                Err(_) => None,
            };
            return Err(RequestError::Status { status, message });
        }

        let bytes = resp.bytes().await.map_err(RequestError::Transport)?;
        // An empty 2xx body (e.g. 204) decodes as JSON `null`.
        let body: &[u8] = if bytes.trim_ascii().is_empty() { b"null" } else { &bytes };
        serde_json::from_slice(body).map_err(|e| RequestError::Decode(e.to_string()))
    }

    /// Turns a failed request into its side effects and the `None` sentinel.
    fn absorb<T>(&self, method: &Method, path: &str, result: Result<T, RequestError>) -> Option<T> {
        let err = match result {
            Ok(value) => return Some(value),
            Err(err) => err,
        };

        if self.log_failures {
            error!(%method, %path, error = %err, "request failed");
        }

        match err {
            RequestError::Unauthorized => match &self.listener {
                Some(listener) => listener.on_session_event(&SessionEvent::Unauthorized {
                    method: method.clone(),
                    path: path.to_string(),
                }),
                None => warn!(%method, %path, "401 with no session listener registered"),
            },
            RequestError::Status { message, .. } => {
                let text = message.as_deref().unwrap_or_else(|| fallback_message(method));
                self.notifier.error(text);
            }
            RequestError::Transport(_) => self.notifier.error(transport_message(method)),
            // Shape mismatches are "no data", not a user-facing error.
            RequestError::Decode(_) => {}
        }
        None
    }
}

/// Generic per-method failure text.
pub(crate) fn fallback_message(method: &Method) -> &'static str {
    match *method {
        Method::POST => messages::SEND_FAILED,
        Method::PUT | Method::PATCH => messages::UPDATE_FAILED,
        Method::DELETE => messages::DELETE_FAILED,
        _ => messages::LOAD_FAILED,
    }
}

/// Failure text when no response arrived. Reads report the connection
/// problem; writes use the same fallback as an unreadable error body.
pub(crate) fn transport_message(method: &Method) -> &'static str {
    if *method == Method::GET {
        messages::NETWORK_ERROR
    } else {
        fallback_message(method)
    }
}

/// Best-effort error text from a JSON body: `message`, then FastAPI's `detail`.
pub(crate) fn extract_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    ["message", "detail"].iter().find_map(|key| {
        value
            .get(key)
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_prefers_message_then_detail() {
        assert_eq!(
            extract_message(r#"{"message":"Loja inválida","detail":"x"}"#.as_bytes()).as_deref(),
            Some("Loja inválida")
        );
        assert_eq!(
            extract_message(br#"{"detail":"Product not found"}"#).as_deref(),
            Some("Product not found")
        );
    }

    #[test]
    fn message_ignores_unreadable_bodies() {
        assert_eq!(extract_message(b"<html>502</html>"), None);
        assert_eq!(extract_message(br#"{"message":"  "}"#), None);
        assert_eq!(extract_message(br#"{"detail":[{"loc":["body"]}]}"#), None);
        assert_eq!(extract_message(b""), None);
    }

    #[test]
    fn fallback_depends_on_method() {
        assert_eq!(fallback_message(&Method::GET), messages::LOAD_FAILED);
        assert_eq!(fallback_message(&Method::POST), messages::SEND_FAILED);
        assert_eq!(fallback_message(&Method::PUT), messages::UPDATE_FAILED);
        assert_eq!(fallback_message(&Method::DELETE), messages::DELETE_FAILED);
    }

    #[test]
    fn transport_failure_text_depends_on_method() {
        assert_eq!(transport_message(&Method::GET), messages::NETWORK_ERROR);
        assert_eq!(transport_message(&Method::POST), messages::SEND_FAILED);
        assert_eq!(transport_message(&Method::PUT), messages::UPDATE_FAILED);
        assert_eq!(transport_message(&Method::DELETE), messages::DELETE_FAILED);
    }
}
