use std::sync::{Arc, Mutex};

use crate::logging;

/// Tray indicator boundary. Icon rendering belongs to the shell; this layer
/// only owns creation-on-demand and the enabled flag.
pub trait Indicator: Send {
    fn switch(&mut self, enabled: bool);
}

#[derive(Debug, Default)]
pub struct ShellIndicator {
    enabled: bool,
}

impl ShellIndicator {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Indicator for ShellIndicator {
    fn switch(&mut self, enabled: bool) {
        if self.enabled != enabled {
            logging::info(&format!("indicator {}", if enabled { "enabled" } else { "disabled" }));
        }
        self.enabled = enabled;
    }
}

#[derive(Debug, Default)]
struct MockIndicatorInner {
    switches: Vec<bool>,
    created: usize,
}

pub struct MockIndicator {
    inner: Arc<Mutex<MockIndicatorInner>>,
}

#[derive(Clone, Default)]
pub struct MockIndicatorHandle {
    inner: Arc<Mutex<MockIndicatorInner>>,
}

impl MockIndicatorHandle {
    /// Factory for the controller's lazy-creation path; counts creations.
    pub fn build(&self) -> MockIndicator {
        self.inner.lock().unwrap().created += 1;
        MockIndicator {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn switches(&self) -> Vec<bool> {
        self.inner.lock().unwrap().switches.clone()
    }

    pub fn created(&self) -> usize {
        self.inner.lock().unwrap().created
    }
}

impl Indicator for MockIndicator {
    fn switch(&mut self, enabled: bool) {
        self.inner.lock().unwrap().switches.push(enabled);
    }
}
