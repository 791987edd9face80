use std::fmt::{Display, Formatter};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug)]
pub enum ServerError {
    Bind(std::io::Error),
    Io(std::io::Error),
}

impl Display for ServerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bind(error) => write!(f, "extension socket bind failed: {error}"),
            Self::Io(error) => write!(f, "extension server io error: {error}"),
        }
    }
}

impl std::error::Error for ServerError {}

/// One-shot signal that the listening socket is bound and accepting.
/// Runners wait on this instead of sleeping.
pub struct Readiness {
    rx: Receiver<()>,
}

pub struct ReadinessSignal {
    tx: Sender<()>,
}

pub fn readiness_pair() -> (ReadinessSignal, Readiness) {
    let (tx, rx) = channel();
    (ReadinessSignal { tx }, Readiness { rx })
}

impl ReadinessSignal {
    pub fn ready(self) {
        let _ = self.tx.send(());
    }
}

impl Readiness {
    pub fn wait(&self, timeout: Duration) -> bool {
        self.rx.recv_timeout(timeout).is_ok()
    }
}

pub trait ExtensionServer: Send {
    fn start(&mut self) -> Result<Readiness, ServerError>;
}

#[cfg(unix)]
pub use unix_socket::UnixSocketExtensionServer;

#[cfg(unix)]
mod unix_socket {
    use std::fs;
    use std::io::{BufRead, BufReader};
    use std::os::unix::net::{UnixListener, UnixStream};
    use std::path::PathBuf;
    use std::thread;

    use serde::Deserialize;

    use super::{readiness_pair, ExtensionServer, Readiness, ServerError};
    use crate::logging;

    // Extensions introduce themselves with one JSON line; everything after
    // the hello belongs to the extension protocol layer, not to this one.
    #[derive(Debug, Deserialize)]
    struct ExtensionHello {
        extension_id: String,
    }

    pub struct UnixSocketExtensionServer {
        socket_path: PathBuf,
    }

    impl UnixSocketExtensionServer {
        pub fn new(socket_path: PathBuf) -> Self {
            Self { socket_path }
        }
    }

    impl ExtensionServer for UnixSocketExtensionServer {
        fn start(&mut self) -> Result<Readiness, ServerError> {
            if let Some(parent) = self.socket_path.parent() {
                fs::create_dir_all(parent).map_err(ServerError::Io)?;
            }
            // Instance arbitration already guarantees we are the only
            // lightdash process; a leftover socket file is always stale.
            if self.socket_path.exists() {
                fs::remove_file(&self.socket_path).map_err(ServerError::Io)?;
            }

            let listener = UnixListener::bind(&self.socket_path).map_err(ServerError::Bind)?;
            let (signal, readiness) = readiness_pair();
            signal.ready();

            logging::info(&format!(
                "extension server listening on {}",
                self.socket_path.display()
            ));
            thread::spawn(move || {
                for stream in listener.incoming() {
                    match stream {
                        Ok(stream) => {
                            thread::spawn(move || serve_connection(stream));
                        }
                        Err(error) => {
                            logging::warn(&format!("extension accept failed: {error}"));
                        }
                    }
                }
            });

            Ok(readiness)
        }
    }

    fn serve_connection(stream: UnixStream) {
        let mut reader = BufReader::new(stream);
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }

        match serde_json::from_str::<ExtensionHello>(line.trim_end()) {
            Ok(hello) => logging::info(&format!("extension connected: {}", hello.extension_id)),
            Err(error) => {
                logging::warn(&format!("extension hello rejected: {error}"));
                return;
            }
        }

        // Drain until the extension disconnects; frames beyond the hello
        // are owned by the protocol layer.
        loop {
            line.clear();
            match reader.read_line(&mut line) {
                Ok(0) | Err(_) => return,
                Ok(_) => {}
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockServerMode {
    Ready,
    NeverReady,
    FailToStart,
}

pub struct MockExtensionServer {
    log: Arc<Mutex<Vec<String>>>,
    mode: MockServerMode,
}

impl MockExtensionServer {
    pub fn new(log: Arc<Mutex<Vec<String>>>, mode: MockServerMode) -> Self {
        Self { log, mode }
    }
}

impl ExtensionServer for MockExtensionServer {
    fn start(&mut self) -> Result<Readiness, ServerError> {
        self.log.lock().unwrap().push("server:start".to_string());
        match self.mode {
            MockServerMode::FailToStart => Err(ServerError::Bind(std::io::Error::new(
                std::io::ErrorKind::AddrInUse,
                "mock bind failure",
            ))),
            MockServerMode::Ready => {
                let (signal, readiness) = readiness_pair();
                signal.ready();
                Ok(readiness)
            }
            MockServerMode::NeverReady => {
                // Dropping the signal leaves the waiter with a dead channel.
                let (_, readiness) = readiness_pair();
                Ok(readiness)
            }
        }
    }
}
