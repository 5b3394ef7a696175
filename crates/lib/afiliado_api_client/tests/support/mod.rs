//! In-process stub backend and recording UI for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use afiliado_api_client::Dashboard;
use afiliado_api_client::config::ClientConfig;
use afiliado_api_client::session::Navigator;
use afiliado_core::notify::{Notification, NotificationLevel, Notifier};
use afiliado_core::session::MemorySessionStore;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use tokio::sync::Notify;

/// Prefix the stub mounts the API under.
pub const API_PREFIX: &str = "/api";

/// Canned reply for one route.
#[derive(Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: String,
    pub gate: Option<Arc<Notify>>,
}

impl Reply {
    pub fn json(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body: body.to_string(),
            gate: None,
        }
    }

    pub fn raw(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            gate: None,
        }
    }

    /// Holds the response until `gate` is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }
}

/// A request as the stub saw it.
#[derive(Clone, Debug)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Option<Value>,
}

/// Route table plus request log.
#[derive(Default)]
pub struct Stub {
    routes: Mutex<HashMap<(Method, String), Reply>>,
    requests: Mutex<Vec<Recorded>>,
}

impl Stub {
    /// Sets the reply for `method target`. `target` may carry a query
    /// string; an exact match wins over the bare path.
    pub fn on(&self, method: Method, target: &str, reply: Reply) {
        self.routes
            .lock()
            .unwrap()
            .insert((method, target.to_string()), reply);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: &Method, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| &r.method == method && r.path == path)
            .count()
    }

    /// Waits until at least `n` requests have arrived.
    pub async fn wait_for_requests(&self, n: usize) {
        for _ in 0..200 {
            if self.requests.lock().unwrap().len() >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("stub never received {n} requests");
    }

    fn lookup(&self, method: &Method, path: &str, query: Option<&str>) -> Option<Reply> {
        let routes = self.routes.lock().unwrap();
        query
            .and_then(|q| routes.get(&(method.clone(), format!("{path}?{q}"))))
            .or_else(|| routes.get(&(method.clone(), path.to_string())))
            .cloned()
    }
}

async fn handle(
    State(stub): State<Arc<Stub>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri
        .path()
        .strip_prefix(API_PREFIX)
        .unwrap_or(uri.path())
        .to_string();
    let header_text = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    stub.requests.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        authorization: header_text(header::AUTHORIZATION),
        content_type: header_text(header::CONTENT_TYPE),
        body: serde_json::from_slice(&body).ok(),
    });

    let Some(reply) = stub.lookup(&method, &path, uri.query()) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if let Some(gate) = &reply.gate {
        gate.notified().await;
    }
    (
        reply.status,
        [(header::CONTENT_TYPE, "application/json")],
        reply.body,
    )
        .into_response()
}

/// Serves `stub` on an ephemeral port and returns the API base URL.
pub async fn serve(stub: Arc<Stub>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub backend");
    let addr = listener.local_addr().expect("stub address");
    let app = Router::new().fallback(handle).with_state(stub);
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub backend");
    });
    format!("http://{addr}{API_PREFIX}")
}

/// Records notifications and navigation.
#[derive(Default)]
pub struct RecordingUi {
    notes: Mutex<Vec<Notification>>,
    routes: Mutex<Vec<String>>,
}

impl RecordingUi {
    pub fn notes(&self) -> Vec<Notification> {
        self.notes.lock().unwrap().clone()
    }

    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().unwrap().clone()
    }

    pub fn has(&self, level: NotificationLevel, message: &str) -> bool {
        self.notes
            .lock()
            .unwrap()
            .iter()
            .any(|n| n.level == level && n.message == message)
    }
}

impl Notifier for RecordingUi {
    fn notify(&self, notification: Notification) {
        self.notes.lock().unwrap().push(notification);
    }
}

impl Navigator for RecordingUi {
    fn navigate(&self, route: &str) {
        self.routes.lock().unwrap().push(route.to_string());
    }
}

/// A dashboard wired to a fresh stub backend and in-memory session store.
pub struct Harness {
    pub stub: Arc<Stub>,
    pub ui: Arc<RecordingUi>,
    pub store: Arc<MemorySessionStore>,
    pub base_url: String,
    pub dashboard: Arc<Dashboard>,
}

pub async fn harness() -> Harness {
    harness_with_store(Arc::new(MemorySessionStore::new())).await
}

pub async fn harness_with_store(store: Arc<MemorySessionStore>) -> Harness {
    let stub = Arc::new(Stub::default());
    let base_url = serve(Arc::clone(&stub)).await;
    let ui = Arc::new(RecordingUi::default());
    let config = ClientConfig::new(base_url.clone());
    let dashboard = Dashboard::new(&config, store.clone(), ui.clone(), ui.clone())
        .expect("build dashboard");
    Harness {
        stub,
        ui,
        store,
        base_url,
        dashboard: Arc::new(dashboard),
    }
}
