use std::sync::{Arc, Mutex};

use crate::logging;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultEntry {
    pub title: String,
    pub subtitle: String,
}

/// The narrow surface the controller drives. Rendering lives elsewhere;
/// this layer only pushes state across the boundary.
pub trait LauncherWindow: Send {
    fn show(&mut self);
    fn hide(&mut self);
    fn is_visible(&self) -> bool;
    fn set_input_text(&mut self, text: &str);
    fn move_caret_to_end(&mut self);
    fn set_keep_above(&mut self, keep: bool);
    fn position_on_screen(&mut self);
    fn apply_theme(&mut self, theme: &str);
    fn show_results(&mut self, results: &[ResultEntry]);
}

pub trait PreferencesSurface: Send {
    fn show(&mut self, page: Option<&str>);
    fn present(&mut self, page: Option<&str>);
}

/// State-tracking window used by the binary until a renderer attaches.
#[derive(Debug, Default)]
pub struct ShellWindow {
    visible: bool,
    input_text: String,
    caret: usize,
}

impl ShellWindow {
    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn input_text(&self) -> &str {
        &self.input_text
    }
}

impl LauncherWindow for ShellWindow {
    fn show(&mut self) {
        if !self.visible {
            logging::info("window shown");
        }
        self.visible = true;
    }

    fn hide(&mut self) {
        if self.visible {
            logging::info("window hidden");
        }
        self.visible = false;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_input_text(&mut self, text: &str) {
        self.input_text = text.to_string();
        self.caret = self.caret.min(self.input_text.chars().count());
    }

    fn move_caret_to_end(&mut self) {
        self.caret = self.input_text.chars().count();
    }

    fn set_keep_above(&mut self, _keep: bool) {}

    fn position_on_screen(&mut self) {}

    fn apply_theme(&mut self, theme: &str) {
        logging::info(&format!("window theme applied: {theme}"));
    }

    fn show_results(&mut self, results: &[ResultEntry]) {
        logging::info(&format!("window results updated: {}", results.len()));
    }
}

#[derive(Debug, Default)]
pub struct ShellPreferences {
    visible_page: Option<String>,
}

impl PreferencesSurface for ShellPreferences {
    fn show(&mut self, page: Option<&str>) {
        self.visible_page = Some(page.unwrap_or("general").to_string());
        logging::info(&format!(
            "preferences shown at {}",
            self.visible_page.as_deref().unwrap_or_default()
        ));
    }

    fn present(&mut self, page: Option<&str>) {
        if let Some(page) = page {
            self.visible_page = Some(page.to_string());
        }
        logging::info("preferences presented");
    }
}

#[derive(Debug, Default)]
struct MockWindowInner {
    calls: Vec<String>,
    visible: bool,
    input_text: String,
    caret_at_end: bool,
}

pub struct MockWindow {
    inner: Arc<Mutex<MockWindowInner>>,
}

#[derive(Clone)]
pub struct MockWindowHandle {
    inner: Arc<Mutex<MockWindowInner>>,
}

impl MockWindow {
    pub fn new() -> (Self, MockWindowHandle) {
        let inner = Arc::new(Mutex::new(MockWindowInner::default()));
        (
            Self {
                inner: Arc::clone(&inner),
            },
            MockWindowHandle { inner },
        )
    }
}

impl MockWindowHandle {
    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn visible(&self) -> bool {
        self.inner.lock().unwrap().visible
    }

    pub fn input_text(&self) -> String {
        self.inner.lock().unwrap().input_text.clone()
    }

    pub fn caret_at_end(&self) -> bool {
        self.inner.lock().unwrap().caret_at_end
    }

    pub fn show_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|call| call.as_str() == "show")
            .count()
    }
}

impl LauncherWindow for MockWindow {
    fn show(&mut self) {
        let mut inner = self.inner.lock().unwrap();
        inner.visible = true;
        inner.calls.push("show".to_string());
    }

    fn hide(&mut self) {
        let mut inner = self.inner.lock().unwrap();
        inner.visible = false;
        inner.calls.push("hide".to_string());
    }

    fn is_visible(&self) -> bool {
        self.inner.lock().unwrap().visible
    }

    fn set_input_text(&mut self, text: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.input_text = text.to_string();
        inner.caret_at_end = false;
        inner.calls.push(format!("set_input_text:{text}"));
    }

    fn move_caret_to_end(&mut self) {
        let mut inner = self.inner.lock().unwrap();
        inner.caret_at_end = true;
        inner.calls.push("move_caret_to_end".to_string());
    }

    fn set_keep_above(&mut self, keep: bool) {
        self.inner
            .lock()
            .unwrap()
            .calls
            .push(format!("set_keep_above:{keep}"));
    }

    fn position_on_screen(&mut self) {
        self.inner
            .lock()
            .unwrap()
            .calls
            .push("position_on_screen".to_string());
    }

    fn apply_theme(&mut self, theme: &str) {
        self.inner
            .lock()
            .unwrap()
            .calls
            .push(format!("apply_theme:{theme}"));
    }

    fn show_results(&mut self, results: &[ResultEntry]) {
        self.inner
            .lock()
            .unwrap()
            .calls
            .push(format!("show_results:{}", results.len()));
    }
}
