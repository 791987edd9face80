use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex};

use crate::hotkey::{parse_accelerator, Accelerator};
use crate::logging;
use crate::main_loop::LoopHandle;
use crate::notification::Notifier;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HotkeyError {
    InvalidAccelerator(String),
    Backend(String),
}

impl Display for HotkeyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAccelerator(error) => write!(f, "invalid accelerator: {error}"),
            Self::Backend(error) => write!(f, "hotkey backend error: {error}"),
        }
    }
}

impl std::error::Error for HotkeyError {}

/// Platform key-grab primitive. A backend posts a hotkey event onto the
/// main loop when the grabbed combination fires; it never touches
/// controller state from its own thread.
pub trait HotkeyBackend: Send {
    fn is_supported(&self) -> bool;
    fn bind(&mut self, accel: &Accelerator) -> Result<(), HotkeyError>;
    fn unbind(&mut self, accel: &Accelerator) -> Result<(), HotkeyError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    Bound,
    AlreadyBound,
    Unsupported,
}

/// Owns at most one active binding. Rebinds only on change; announces the
/// binding once per process on a first-run installation.
pub struct HotkeyBinder {
    backend: Box<dyn HotkeyBackend>,
    current: Option<Accelerator>,
    first_run: bool,
    announced: bool,
}

impl HotkeyBinder {
    pub fn new(backend: Box<dyn HotkeyBackend>, first_run: bool) -> Self {
        Self {
            backend,
            current: None,
            first_run,
            announced: false,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.backend.is_supported()
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_ref().map(Accelerator::name)
    }

    pub fn bind(
        &mut self,
        accel_name: &str,
        notifier: &mut dyn Notifier,
    ) -> Result<BindOutcome, HotkeyError> {
        if !self.backend.is_supported() {
            return Ok(BindOutcome::Unsupported);
        }

        let accel = parse_accelerator(accel_name).map_err(HotkeyError::InvalidAccelerator)?;
        if self
            .current
            .as_ref()
            .map(|current| current.name() == accel.name())
            .unwrap_or(false)
        {
            return Ok(BindOutcome::AlreadyBound);
        }

        if let Some(previous) = self.current.take() {
            self.backend.unbind(&previous)?;
        }

        logging::info(&format!("binding show-app hotkey: {}", accel.name()));
        self.backend.bind(&accel)?;

        if self.first_run && !self.announced {
            self.announced = true;
            notifier.notify(
                crate::config::APP_NAME,
                &format!("Hotkey is set to {}", accel.display_label()),
            );
        }

        self.current = Some(accel);
        Ok(BindOutcome::Bound)
    }
}

#[derive(Debug, Default)]
pub struct NoopHotkeyBackend;

impl HotkeyBackend for NoopHotkeyBackend {
    fn is_supported(&self) -> bool {
        false
    }

    fn bind(&mut self, _accel: &Accelerator) -> Result<(), HotkeyError> {
        Ok(())
    }

    fn unbind(&mut self, _accel: &Accelerator) -> Result<(), HotkeyError> {
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MockHotkeyInner {
    events: Vec<String>,
}

pub struct MockHotkeyBackend {
    inner: Arc<Mutex<MockHotkeyInner>>,
    supported: bool,
}

#[derive(Clone)]
pub struct MockHotkeyHandle {
    inner: Arc<Mutex<MockHotkeyInner>>,
}

impl MockHotkeyBackend {
    pub fn new(supported: bool) -> (Self, MockHotkeyHandle) {
        let inner = Arc::new(Mutex::new(MockHotkeyInner::default()));
        (
            Self {
                inner: Arc::clone(&inner),
                supported,
            },
            MockHotkeyHandle { inner },
        )
    }
}

impl MockHotkeyHandle {
    pub fn events(&self) -> Vec<String> {
        self.inner.lock().unwrap().events.clone()
    }
}

impl HotkeyBackend for MockHotkeyBackend {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn bind(&mut self, accel: &Accelerator) -> Result<(), HotkeyError> {
        self.inner
            .lock()
            .unwrap()
            .events
            .push(format!("bind:{}", accel.name()));
        Ok(())
    }

    fn unbind(&mut self, accel: &Accelerator) -> Result<(), HotkeyError> {
        self.inner
            .lock()
            .unwrap()
            .events
            .push(format!("unbind:{}", accel.name()));
        Ok(())
    }
}

pub fn default_hotkey_backend(handle: &LoopHandle) -> Box<dyn HotkeyBackend> {
    #[cfg(target_os = "linux")]
    {
        if crate::platform::supports_global_hotkeys() {
            match x11::X11HotkeyBackend::connect(handle.clone()) {
                Ok(backend) => return Box::new(backend),
                Err(error) => {
                    logging::warn(&format!("x11 hotkey backend unavailable: {error}"));
                }
            }
        }
        Box::new(NoopHotkeyBackend)
    }

    #[cfg(not(target_os = "linux"))]
    {
        let _ = handle;
        Box::new(NoopHotkeyBackend)
    }
}

#[cfg(target_os = "linux")]
mod x11 {
    use std::sync::Arc;
    use std::thread;

    use x11rb::connection::Connection;
    use x11rb::protocol::xproto::{ConnectionExt as _, GrabMode, Keycode, ModMask};
    use x11rb::protocol::Event;
    use x11rb::rust_connection::RustConnection;

    use super::{HotkeyBackend, HotkeyError};
    use crate::hotkey::{Accelerator, Key, Modifier};
    use crate::main_loop::{AppEvent, LoopHandle};

    const XK_SPACE: u32 = 0x0020;
    const XK_F1: u32 = 0xffbe;

    pub struct X11HotkeyBackend {
        conn: Arc<RustConnection>,
        root: u32,
        grabbed: Vec<(Keycode, ModMask)>,
    }

    impl X11HotkeyBackend {
        pub fn connect(handle: LoopHandle) -> Result<Self, HotkeyError> {
            let (conn, screen_num) =
                x11rb::connect(None).map_err(|error| HotkeyError::Backend(error.to_string()))?;
            let root = conn.setup().roots[screen_num].root;
            let conn = Arc::new(conn);

            let listener = Arc::clone(&conn);
            thread::spawn(move || loop {
                match listener.wait_for_event() {
                    Ok(Event::KeyPress(_)) => handle.post(AppEvent::HotkeyPressed),
                    Ok(_) => {}
                    Err(_) => break,
                }
            });

            Ok(Self {
                conn,
                root,
                grabbed: Vec::new(),
            })
        }

        fn keycode_for(&self, keysym: u32) -> Result<Keycode, HotkeyError> {
            let setup = self.conn.setup();
            let min = setup.min_keycode;
            let count = setup.max_keycode - min + 1;
            let mapping = self
                .conn
                .get_keyboard_mapping(min, count)
                .map_err(|error| HotkeyError::Backend(error.to_string()))?
                .reply()
                .map_err(|error| HotkeyError::Backend(error.to_string()))?;

            let per = mapping.keysyms_per_keycode as usize;
            if per == 0 {
                return Err(HotkeyError::Backend("empty keyboard mapping".to_string()));
            }
            for (index, chunk) in mapping.keysyms.chunks(per).enumerate() {
                if chunk.contains(&keysym) {
                    return Ok(min + index as Keycode);
                }
            }
            Err(HotkeyError::Backend(format!(
                "no keycode maps to keysym 0x{keysym:04x}"
            )))
        }
    }

    impl HotkeyBackend for X11HotkeyBackend {
        fn is_supported(&self) -> bool {
            true
        }

        fn bind(&mut self, accel: &Accelerator) -> Result<(), HotkeyError> {
            let keycode = self.keycode_for(keysym_for(accel.key()))?;
            let base = modifier_mask(accel.modifiers());

            // Grab the Lock/NumLock variants too, or the hotkey dies the
            // moment Caps Lock is on.
            for extra in [None, Some(ModMask::LOCK), Some(ModMask::M2), Some(ModMask::LOCK | ModMask::M2)] {
                let mask = match extra {
                    Some(extra) => base | extra,
                    None => base,
                };
                self.conn
                    .grab_key(false, self.root, mask, keycode, GrabMode::ASYNC, GrabMode::ASYNC)
                    .map_err(|error| HotkeyError::Backend(error.to_string()))?
                    .check()
                    .map_err(|error| HotkeyError::Backend(error.to_string()))?;
                self.grabbed.push((keycode, mask));
            }
            self.conn
                .flush()
                .map_err(|error| HotkeyError::Backend(error.to_string()))?;
            Ok(())
        }

        fn unbind(&mut self, _accel: &Accelerator) -> Result<(), HotkeyError> {
            for (keycode, mask) in self.grabbed.drain(..) {
                self.conn
                    .ungrab_key(keycode, self.root, mask)
                    .map_err(|error| HotkeyError::Backend(error.to_string()))?;
            }
            self.conn
                .flush()
                .map_err(|error| HotkeyError::Backend(error.to_string()))?;
            Ok(())
        }
    }

    fn modifier_mask(modifiers: &[Modifier]) -> ModMask {
        let mut mask = single_mask(modifiers[0]);
        for modifier in &modifiers[1..] {
            mask = mask | single_mask(*modifier);
        }
        mask
    }

    fn single_mask(modifier: Modifier) -> ModMask {
        match modifier {
            Modifier::Ctrl => ModMask::CONTROL,
            Modifier::Shift => ModMask::SHIFT,
            Modifier::Alt => ModMask::M1,
            Modifier::Super => ModMask::M4,
        }
    }

    fn keysym_for(key: Key) -> u32 {
        match key {
            Key::Space => XK_SPACE,
            Key::Function(n) => XK_F1 + u32::from(n - 1),
            Key::Char(c) => c.to_ascii_lowercase() as u32,
        }
    }
}
