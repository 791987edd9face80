use std::process::Command;
use std::sync::{Arc, Mutex};

use crate::logging;

/// Desktop notification boundary. Used for the first-run hotkey
/// announcement and for user-visible failures; delivery problems are
/// logged, never propagated.
pub trait Notifier: Send {
    fn notify(&mut self, summary: &str, body: &str);
}

#[derive(Debug, Default)]
pub struct ShellNotifier;

impl Notifier for ShellNotifier {
    fn notify(&mut self, summary: &str, body: &str) {
        let spawned = Command::new("notify-send")
            .arg("--app-name")
            .arg(crate::config::APP_NAME)
            .arg(summary)
            .arg(body)
            .spawn();

        match spawned {
            Ok(_) => logging::info(&format!("notification sent: {summary}")),
            Err(error) => logging::warn(&format!(
                "notification '{summary}' not delivered: {error}"
            )),
        }
    }
}

#[derive(Debug, Default)]
struct MockNotifierInner {
    notifications: Vec<(String, String)>,
}

pub struct MockNotifier {
    inner: Arc<Mutex<MockNotifierInner>>,
}

#[derive(Clone)]
pub struct MockNotifierHandle {
    inner: Arc<Mutex<MockNotifierInner>>,
}

impl MockNotifier {
    pub fn new() -> (Self, MockNotifierHandle) {
        let inner = Arc::new(Mutex::new(MockNotifierInner::default()));
        (
            Self {
                inner: Arc::clone(&inner),
            },
            MockNotifierHandle { inner },
        )
    }
}

impl MockNotifierHandle {
    pub fn notifications(&self) -> Vec<(String, String)> {
        self.inner.lock().unwrap().notifications.clone()
    }
}

impl Notifier for MockNotifier {
    fn notify(&mut self, summary: &str, body: &str) {
        self.inner
            .lock()
            .unwrap()
            .notifications
            .push((summary.to_string(), body.to_string()));
    }
}
