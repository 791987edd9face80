use serde_json::Value;

use crate::activation::{parse_activation_args, query_from_payload};
use crate::extension_host::ExtensionHost;
use crate::hotkey_binder::{BindOutcome, HotkeyBinder, HotkeyError};
use crate::indicator::Indicator;
use crate::logging;
use crate::main_loop::LoopHandle;
use crate::notification::Notifier;
use crate::query::Query;
use crate::settings::Settings;
use crate::window::{LauncherWindow, PreferencesSurface};

pub type PreferencesFactory = Box<dyn FnMut() -> Box<dyn PreferencesSurface>>;
pub type IndicatorFactory = Box<dyn FnMut() -> Box<dyn Indicator>>;

/// The collaborators the controller drives, bundled for construction.
/// Window and preferences handles stay lazy: the window attaches during
/// startup, the preferences surface on first use.
pub struct Shell {
    pub window: Box<dyn LauncherWindow>,
    pub preferences_factory: PreferencesFactory,
    pub indicator_factory: IndicatorFactory,
    pub notifier: Box<dyn Notifier>,
    pub extension_host: Option<ExtensionHost>,
}

/// Top-level singleton. The main loop routes every activation through this
/// one instance; all state lives in explicit fields, mutated only on the
/// loop thread.
pub struct AppController {
    settings: Settings,
    handle: LoopHandle,
    query: String,
    pending_window: Option<Box<dyn LauncherWindow>>,
    window: Option<Box<dyn LauncherWindow>>,
    preferences: Option<Box<dyn PreferencesSurface>>,
    preferences_factory: PreferencesFactory,
    indicator: Option<Box<dyn Indicator>>,
    indicator_factory: IndicatorFactory,
    notifier: Box<dyn Notifier>,
    hotkey: HotkeyBinder,
    extension_host: Option<ExtensionHost>,
    started: bool,
}

impl AppController {
    pub fn new(settings: Settings, hotkey: HotkeyBinder, shell: Shell, handle: LoopHandle) -> Self {
        Self {
            settings,
            handle,
            query: String::new(),
            pending_window: Some(shell.window),
            window: None,
            preferences: None,
            preferences_factory: shell.preferences_factory,
            indicator: None,
            indicator_factory: shell.indicator_factory,
            notifier: shell.notifier,
            hotkey,
            extension_host: shell.extension_host,
            started: false,
        }
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// One-time setup, first activation only. Later activations skip
    /// straight to before-emit/command-line handling.
    pub fn on_startup(&mut self) {
        if self.started {
            return;
        }
        self.started = true;

        // Keep the process alive even while no window is visible.
        self.handle.acquire_hold();

        if let Some(mut window) = self.pending_window.take() {
            window.set_keep_above(true);
            window.position_on_screen();
            window.apply_theme(&self.settings.theme);
            window.show_results(&[]);
            self.window = Some(window);
        }

        if self.settings.show_indicator_icon {
            self.toggle_indicator(true);
        }

        if self.hotkey.is_supported() {
            // Binding happens on the next idle turn of the loop, never
            // synchronously inside startup.
            let accel = self.settings.hotkey_show_app.clone();
            self.handle.schedule_idle(move |app| {
                if let Err(error) = app.bind_show_hotkey(&accel) {
                    app.report_failure(&format!("Hotkey {accel} could not be bound: {error}"));
                }
            });
        }

        if let Some(host) = self.extension_host.as_mut() {
            // A dead extension subsystem degrades extension results only;
            // window, hotkey, and indicator stay functional.
            if let Err(error) = host.start() {
                logging::error(&format!("extension subsystem unavailable: {error}"));
            }
        }
    }

    pub fn on_activate(&mut self) {
        if let Some(window) = &mut self.window {
            window.show();
        }
    }

    pub fn on_command_line(&mut self, argv: &[String]) -> i32 {
        let args = parse_activation_args(argv);
        if !args.no_window {
            self.on_activate();
        }
        0
    }

    pub fn on_before_emit(&mut self, payload: &Value) {
        if let Some(query) = query_from_payload(payload) {
            self.set_query(query);
        }
    }

    /// The only mutation path the UI observes.
    pub fn set_query(&mut self, value: &str) {
        self.query = value.trim_start().to_string();
        if let Some(window) = &mut self.window {
            window.set_input_text(&self.query);
            window.move_caret_to_end();
        }
    }

    pub fn query(&self) -> Query {
        Query::new(&self.query)
    }

    pub fn bind_show_hotkey(&mut self, accel: &str) -> Result<BindOutcome, HotkeyError> {
        self.hotkey.bind(accel, self.notifier.as_mut())
    }

    pub fn show_preferences(&mut self, page: Option<&str>) {
        if let Some(window) = &mut self.window {
            window.hide();
        }

        match &mut self.preferences {
            Some(preferences) => preferences.present(page),
            None => {
                let mut preferences = (self.preferences_factory)();
                preferences.show(page);
                self.preferences = Some(preferences);
            }
        }
    }

    pub fn toggle_indicator(&mut self, enable: bool) {
        if self.indicator.is_none() {
            self.indicator = Some((self.indicator_factory)());
        }
        if let Some(indicator) = &mut self.indicator {
            indicator.switch(enable);
        }
    }

    fn report_failure(&mut self, message: &str) {
        logging::error(message);
        self.notifier.notify(crate::config::APP_NAME, message);
    }
}
