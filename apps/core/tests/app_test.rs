use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use lightdash_core::activation::ActivationRequest;
use lightdash_core::app::{AppController, Shell};
use lightdash_core::extension_host::ExtensionHost;
use lightdash_core::extension_runner::MockRunnerManager;
use lightdash_core::extension_server::{MockExtensionServer, MockServerMode};
use lightdash_core::hotkey_binder::{BindOutcome, HotkeyBinder, MockHotkeyBackend, MockHotkeyHandle};
use lightdash_core::indicator::{Indicator, MockIndicatorHandle};
use lightdash_core::main_loop::{AppEvent, MainLoop};
use lightdash_core::notification::{MockNotifier, MockNotifierHandle};
use lightdash_core::settings::Settings;
use lightdash_core::window::{MockWindow, MockWindowHandle, PreferencesSurface};

struct RecordingPreferences {
    log: Arc<Mutex<Vec<String>>>,
}

impl PreferencesSurface for RecordingPreferences {
    fn show(&mut self, page: Option<&str>) {
        self.log
            .lock()
            .unwrap()
            .push(format!("show:{}", page.unwrap_or("-")));
    }

    fn present(&mut self, page: Option<&str>) {
        self.log
            .lock()
            .unwrap()
            .push(format!("present:{}", page.unwrap_or("-")));
    }
}

struct Harness {
    main_loop: MainLoop,
    controller: AppController,
    window: MockWindowHandle,
    backend: MockHotkeyHandle,
    notifications: MockNotifierHandle,
    indicator: MockIndicatorHandle,
    extension_log: Arc<Mutex<Vec<String>>>,
    preferences_log: Arc<Mutex<Vec<String>>>,
    preferences_created: Arc<AtomicUsize>,
}

impl Harness {
    fn new(settings: Settings, first_run: bool) -> Self {
        Self::with_server_mode(settings, first_run, MockServerMode::Ready)
    }

    fn with_server_mode(settings: Settings, first_run: bool, mode: MockServerMode) -> Self {
        let main_loop = MainLoop::new();
        let handle = main_loop.handle();

        let (window, window_handle) = MockWindow::new();
        let (backend, backend_handle) = MockHotkeyBackend::new(true);
        let (notifier, notifier_handle) = MockNotifier::new();
        let indicator_handle = MockIndicatorHandle::default();

        let extension_log = Arc::new(Mutex::new(Vec::new()));
        let host = ExtensionHost::new(
            Box::new(MockExtensionServer::new(Arc::clone(&extension_log), mode)),
            Box::new(MockRunnerManager::new(Arc::clone(&extension_log))),
        );

        let preferences_log = Arc::new(Mutex::new(Vec::new()));
        let preferences_created = Arc::new(AtomicUsize::new(0));
        let factory_log = Arc::clone(&preferences_log);
        let factory_created = Arc::clone(&preferences_created);

        let indicator_factory_handle = indicator_handle.clone();
        let shell = Shell {
            window: Box::new(window),
            preferences_factory: Box::new(move || {
                factory_created.fetch_add(1, Ordering::SeqCst);
                Box::new(RecordingPreferences {
                    log: Arc::clone(&factory_log),
                }) as Box<dyn PreferencesSurface>
            }),
            indicator_factory: Box::new(move || {
                Box::new(indicator_factory_handle.build()) as Box<dyn Indicator>
            }),
            notifier: Box::new(notifier),
            extension_host: Some(host),
        };

        let binder = HotkeyBinder::new(Box::new(backend), first_run);
        let controller = AppController::new(settings, binder, shell, handle);

        Self {
            main_loop,
            controller,
            window: window_handle,
            backend: backend_handle,
            notifications: notifier_handle,
            indicator: indicator_handle,
            extension_log,
            preferences_log,
            preferences_created,
        }
    }

    fn activate(&mut self, argv: &[&str]) {
        let argv: Vec<String> = argv.iter().map(|s| s.to_string()).collect();
        self.main_loop
            .handle()
            .post(AppEvent::Activation(ActivationRequest::from_argv(&argv)));
        self.main_loop.drain(&mut self.controller);
    }
}

#[test]
fn startup_configures_the_window_exactly_once() {
    let mut harness = Harness::new(Settings::default(), false);

    harness.activate(&[]);
    harness.activate(&[]);

    let calls = harness.window.calls();
    let configured = calls
        .iter()
        .filter(|call| call.as_str() == "set_keep_above:true")
        .count();
    assert_eq!(configured, 1);
    assert_eq!(
        calls.iter().filter(|c| c.as_str() == "position_on_screen").count(),
        1
    );
    assert_eq!(
        calls.iter().filter(|c| c.as_str() == "apply_theme:dark").count(),
        1
    );
    assert_eq!(
        calls.iter().filter(|c| c.as_str() == "show_results:0").count(),
        1
    );
    assert!(harness.controller.started());
}

#[test]
fn plain_launch_shows_the_window_with_an_empty_query() {
    let mut harness = Harness::new(Settings::default(), false);

    harness.activate(&[]);

    assert!(harness.window.visible());
    assert!(harness.controller.query().is_empty());
    assert_eq!(harness.window.input_text(), "");
}

#[test]
fn remote_query_payload_updates_input_and_caret() {
    let mut harness = Harness::new(Settings::default(), false);

    harness.activate(&[]);
    harness.activate(&["--query", "  firefox"]);

    assert_eq!(harness.window.input_text(), "firefox");
    assert!(harness.window.caret_at_end());
    assert_eq!(harness.controller.query().as_str(), "firefox");
}

#[test]
fn no_window_flag_suppresses_the_show() {
    let mut harness = Harness::new(Settings::default(), false);

    harness.activate(&["--no-window"]);
    assert_eq!(harness.window.show_count(), 0);

    harness.activate(&[]);
    assert_eq!(harness.window.show_count(), 1);
}

#[test]
fn command_line_handler_always_reports_success() {
    let mut harness = Harness::new(Settings::default(), false);
    harness.activate(&[]);

    let argv = |parts: &[&str]| parts.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    assert_eq!(harness.controller.on_command_line(&argv(&["--no-window"])), 0);
    assert_eq!(harness.controller.on_command_line(&argv(&[])), 0);
    assert_eq!(
        harness
            .controller
            .on_command_line(&argv(&["--mystery-flag", "-z"])),
        0
    );
}

#[test]
fn set_query_strips_leading_whitespace_only() {
    let mut harness = Harness::new(Settings::default(), false);
    harness.activate(&[]);

    harness.controller.set_query("  firefox ");

    assert_eq!(harness.controller.query().as_str(), "firefox ");
    assert_eq!(harness.window.input_text(), "firefox ");
    assert!(harness.window.caret_at_end());
}

#[test]
fn hotkey_binds_on_the_idle_turn_and_announces_first_run_once() {
    let mut harness = Harness::new(Settings::default(), true);

    harness.activate(&[]);

    assert_eq!(harness.backend.events(), vec!["bind:Ctrl+Space".to_string()]);
    assert_eq!(harness.notifications.notifications().len(), 1);

    let outcome = harness.controller.bind_show_hotkey("Ctrl+Space").unwrap();
    assert_eq!(outcome, BindOutcome::AlreadyBound);
    assert_eq!(harness.backend.events().len(), 1);
    assert_eq!(harness.notifications.notifications().len(), 1);
}

#[test]
fn indicator_is_created_once_and_toggled_afterwards() {
    let mut harness = Harness::new(Settings::default(), false);

    harness.activate(&[]);
    assert_eq!(harness.indicator.created(), 1);
    assert_eq!(harness.indicator.switches(), vec![true]);

    harness.controller.toggle_indicator(false);
    assert_eq!(harness.indicator.created(), 1);
    assert_eq!(harness.indicator.switches(), vec![true, false]);
}

#[test]
fn disabled_indicator_setting_skips_creation() {
    let settings = Settings {
        show_indicator_icon: false,
        ..Settings::default()
    };
    let mut harness = Harness::new(settings, false);

    harness.activate(&[]);

    assert_eq!(harness.indicator.created(), 0);
}

#[test]
fn preferences_surface_is_created_once_and_reused() {
    let mut harness = Harness::new(Settings::default(), false);
    harness.activate(&[]);
    assert!(harness.window.visible());

    harness.controller.show_preferences(Some("about"));
    assert!(!harness.window.visible());
    assert_eq!(harness.preferences_created.load(Ordering::SeqCst), 1);

    harness.controller.show_preferences(None);
    assert_eq!(harness.preferences_created.load(Ordering::SeqCst), 1);
    assert_eq!(
        harness.preferences_log.lock().unwrap().clone(),
        vec!["show:about".to_string(), "present:-".to_string()]
    );
}

#[test]
fn extension_subsystem_starts_server_before_runners() {
    let mut harness = Harness::new(Settings::default(), false);

    harness.activate(&[]);

    assert_eq!(
        harness.extension_log.lock().unwrap().clone(),
        vec!["server:start".to_string(), "runners:run_all".to_string()]
    );
}

#[test]
fn extension_server_failure_is_confined_to_the_subsystem() {
    let mut harness =
        Harness::with_server_mode(Settings::default(), false, MockServerMode::FailToStart);

    harness.activate(&[]);

    // No runner started, but the rest of startup completed.
    assert_eq!(
        harness.extension_log.lock().unwrap().clone(),
        vec!["server:start".to_string()]
    );
    assert!(harness.window.visible());
    assert_eq!(harness.backend.events().len(), 1);
}
