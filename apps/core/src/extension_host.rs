use std::fmt::{Display, Formatter};
use std::time::Duration;

use crate::extension_runner::{RunReport, RunnerManager};
use crate::extension_server::{ExtensionServer, ServerError};
use crate::logging;

pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug)]
pub enum ExtensionHostError {
    Server(ServerError),
    NotReady,
}

impl Display for ExtensionHostError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Server(error) => write!(f, "extension server failed: {error}"),
            Self::NotReady => write!(f, "extension server never signalled readiness"),
        }
    }
}

impl std::error::Error for ExtensionHostError {}

impl From<ServerError> for ExtensionHostError {
    fn from(value: ServerError) -> Self {
        Self::Server(value)
    }
}

/// Orders extension startup: the server must be listening before any
/// runner process is spawned. The guarantee comes from the server's
/// readiness signal, not from a timed delay.
pub struct ExtensionHost {
    server: Box<dyn ExtensionServer>,
    runners: Box<dyn RunnerManager>,
    ready_timeout: Duration,
}

impl ExtensionHost {
    pub fn new(server: Box<dyn ExtensionServer>, runners: Box<dyn RunnerManager>) -> Self {
        Self {
            server,
            runners,
            ready_timeout: DEFAULT_READY_TIMEOUT,
        }
    }

    pub fn with_ready_timeout(mut self, ready_timeout: Duration) -> Self {
        self.ready_timeout = ready_timeout;
        self
    }

    pub fn start(&mut self) -> Result<RunReport, ExtensionHostError> {
        let readiness = self.server.start()?;
        if !readiness.wait(self.ready_timeout) {
            return Err(ExtensionHostError::NotReady);
        }

        let report = self.runners.run_all();
        for warning in &report.warnings {
            logging::warn(&format!("extension runner warning: {warning}"));
        }
        logging::info(&format!("extension runners started: {}", report.started));
        Ok(report)
    }
}
