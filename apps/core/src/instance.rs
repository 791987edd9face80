use std::fmt::{Display, Formatter};
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::thread;

use crate::activation::ActivationRequest;
use crate::logging;
use crate::main_loop::{AppEvent, LoopHandle};

#[derive(Debug)]
pub enum InstanceError {
    Io(std::io::Error),
    Encode(String),
}

impl Display for InstanceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(error) => write!(f, "io error: {error}"),
            Self::Encode(error) => write!(f, "encode error: {error}"),
        }
    }
}

impl std::error::Error for InstanceError {}

impl From<std::io::Error> for InstanceError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Outcome of single-instance arbitration. A forwarded invocation has
/// already delivered its request to the primary and must exit 0.
pub enum InstanceRole {
    Primary(InstanceGuard),
    Forwarded,
}

pub struct InstanceGuard {
    listener: Option<UnixListener>,
    socket_path: PathBuf,
}

pub fn acquire_or_forward(
    socket_path: &Path,
    request: &ActivationRequest,
) -> Result<InstanceRole, InstanceError> {
    if let Some(parent) = socket_path.parent() {
        fs::create_dir_all(parent)?;
    }

    match UnixListener::bind(socket_path) {
        Ok(listener) => Ok(InstanceRole::Primary(InstanceGuard {
            listener: Some(listener),
            socket_path: socket_path.to_path_buf(),
        })),
        Err(error) if error.kind() == std::io::ErrorKind::AddrInUse => {
            if forward(socket_path, request).is_ok() {
                return Ok(InstanceRole::Forwarded);
            }
            // Socket file with nobody behind it: the previous primary died
            // without cleanup. Reclaim the address.
            logging::warn("stale control socket found; reclaiming");
            fs::remove_file(socket_path)?;
            let listener = UnixListener::bind(socket_path)?;
            Ok(InstanceRole::Primary(InstanceGuard {
                listener: Some(listener),
                socket_path: socket_path.to_path_buf(),
            }))
        }
        Err(error) => Err(InstanceError::Io(error)),
    }
}

fn forward(socket_path: &Path, request: &ActivationRequest) -> Result<(), InstanceError> {
    let mut stream = UnixStream::connect(socket_path)?;
    let encoded =
        serde_json::to_string(request).map_err(|error| InstanceError::Encode(error.to_string()))?;
    stream.write_all(encoded.as_bytes())?;
    stream.write_all(b"\n")?;
    Ok(())
}

impl InstanceGuard {
    /// Accepts forwarded activations and posts them onto the main loop.
    /// The accept thread never touches controller state itself.
    pub fn spawn_listener(&mut self, handle: LoopHandle) {
        let Some(listener) = self.listener.take() else {
            return;
        };

        thread::spawn(move || {
            for stream in listener.incoming() {
                match stream {
                    Ok(stream) => receive_activation(stream, &handle),
                    Err(error) => logging::warn(&format!("control accept failed: {error}")),
                }
            }
        });
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.socket_path);
    }
}

fn receive_activation(stream: UnixStream, handle: &LoopHandle) {
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    if matches!(reader.read_line(&mut line), Ok(0) | Err(_)) {
        return;
    }

    match serde_json::from_str::<ActivationRequest>(line.trim_end()) {
        Ok(request) => handle.post(AppEvent::Activation(request)),
        Err(error) => logging::warn(&format!("malformed activation request: {error}")),
    }
}
