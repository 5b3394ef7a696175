//! Terminal rendering of notifications and navigation requests.

use afiliado_api_client::session::{Navigator, routes};
use afiliado_core::notify::{Notification, NotificationLevel};
use tokio::sync::mpsc::UnboundedReceiver;

/// Prints every queued notification to stderr.
pub fn drain(rx: &mut UnboundedReceiver<Notification>) {
    while let Ok(notification) = rx.try_recv() {
        eprintln!("{}", render(&notification));
    }
}

fn render(notification: &Notification) -> String {
    let tag = match notification.level {
        NotificationLevel::Success => "ok",
        NotificationLevel::Info => "info",
        NotificationLevel::Error => "error",
    };
    format!("[{tag}] {}", notification.message)
}

/// The terminal has no pages; a redirect to the login screen becomes a hint.
pub struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&self, route: &str) {
        if route == routes::LOGIN {
            eprintln!("Run `afiliado login` to sign in again.");
        } else {
            tracing::debug!(%route, "ignoring navigation request");
        }
    }
}
