use std::fmt::{Display, Formatter};
use std::fs;

use crate::activation::ActivationRequest;
use crate::app::{AppController, Shell};
use crate::config;
use crate::extension_host::ExtensionHost;
use crate::hotkey_binder::{default_hotkey_backend, HotkeyBinder};
use crate::indicator::{Indicator, ShellIndicator};
use crate::logging;
use crate::main_loop::{AppEvent, MainLoop};
use crate::notification::ShellNotifier;
use crate::settings::{self, LoadedSettings};
use crate::window::{PreferencesSurface, ShellPreferences, ShellWindow};

#[derive(Debug)]
pub enum RuntimeError {
    Io(std::io::Error),
    #[cfg(unix)]
    Instance(crate::instance::InstanceError),
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(error) => write!(f, "io error: {error}"),
            #[cfg(unix)]
            Self::Instance(error) => write!(f, "instance arbitration error: {error}"),
        }
    }
}

impl std::error::Error for RuntimeError {}

impl From<std::io::Error> for RuntimeError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

#[cfg(unix)]
impl From<crate::instance::InstanceError> for RuntimeError {
    fn from(value: crate::instance::InstanceError) -> Self {
        Self::Instance(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CliOptions {
    pub verbose: bool,
    pub no_extensions: bool,
    pub version: bool,
}

// Tolerant by contract: flags this layer does not own (--no-window,
// --query, anything newer) pass through to the activation handling.
pub fn parse_cli_args(args: &[String]) -> CliOptions {
    let mut options = CliOptions::default();
    for arg in args {
        match arg.as_str() {
            "-v" | "--verbose" => options.verbose = true,
            "--no-extensions" => options.no_extensions = true,
            "--version" => options.version = true,
            _ => {}
        }
    }
    options
}

pub fn run_with_options(options: CliOptions, argv: &[String]) -> Result<(), RuntimeError> {
    logging::set_verbose(options.verbose);
    fs::create_dir_all(config::stable_app_dir())?;
    if let Err(error) = logging::init() {
        eprintln!("[lightdash-core] logging unavailable: {error}");
    }

    let loaded = settings::load_or_default(&config::settings_path());
    let request = ActivationRequest::from_argv(argv);

    #[cfg(unix)]
    {
        use crate::instance::{acquire_or_forward, InstanceRole};

        match acquire_or_forward(&config::control_socket_path(), &request)? {
            InstanceRole::Forwarded => {
                logging::info("activation forwarded to the running instance");
                Ok(())
            }
            InstanceRole::Primary(mut guard) => {
                let main_loop = MainLoop::new();
                guard.spawn_listener(main_loop.handle());
                run_primary(options, loaded, request, &main_loop);
                Ok(())
            }
        }
    }

    #[cfg(not(unix))]
    {
        logging::warn("single-instance arbitration unavailable on this platform");
        let main_loop = MainLoop::new();
        run_primary(options, loaded, request, &main_loop);
        Ok(())
    }
}

fn run_primary(
    options: CliOptions,
    loaded: LoadedSettings,
    request: ActivationRequest,
    main_loop: &MainLoop,
) {
    let handle = main_loop.handle();

    logging::info(&format!(
        "startup id={} hotkey={} indicator={} first_run={}",
        config::APP_ID,
        loaded.settings.hotkey_show_app,
        loaded.settings.show_indicator_icon,
        loaded.first_run,
    ));

    if let Err(error) = settings::validate(&loaded.settings) {
        logging::warn(&format!("settings check failed: {error}"));
    }

    if loaded.first_run {
        // Persisting defaults ends the first-run state for later launches;
        // this process keeps announcing as first-run.
        if let Err(error) = settings::save(&loaded.settings, &config::settings_path()) {
            logging::warn(&format!("default settings not written: {error}"));
        }
    }

    let backend = default_hotkey_backend(&handle);
    let binder = HotkeyBinder::new(backend, loaded.first_run);

    let shell = Shell {
        window: Box::new(ShellWindow::default()),
        preferences_factory: Box::new(|| {
            Box::new(ShellPreferences::default()) as Box<dyn PreferencesSurface>
        }),
        indicator_factory: Box::new(|| Box::new(ShellIndicator::default()) as Box<dyn Indicator>),
        notifier: Box::new(ShellNotifier),
        extension_host: build_extension_host(options.no_extensions),
    };

    let mut controller = AppController::new(loaded.settings, binder, shell, handle.clone());
    handle.post(AppEvent::Activation(request));
    main_loop.run(&mut controller);
}

#[cfg(unix)]
fn build_extension_host(disabled: bool) -> Option<ExtensionHost> {
    use crate::extension_runner::ProcessRunnerManager;
    use crate::extension_server::UnixSocketExtensionServer;

    if disabled {
        logging::info("extension subsystem disabled by --no-extensions");
        return None;
    }

    let socket_path = config::extension_socket_path();
    Some(ExtensionHost::new(
        Box::new(UnixSocketExtensionServer::new(socket_path.clone())),
        Box::new(ProcessRunnerManager::new(
            config::extensions_dir(),
            socket_path,
        )),
    ))
}

#[cfg(not(unix))]
fn build_extension_host(_disabled: bool) -> Option<ExtensionHost> {
    None
}
