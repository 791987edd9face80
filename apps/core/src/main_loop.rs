use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

use crate::activation::ActivationRequest;
use crate::app::AppController;
use crate::logging;

pub type IdleTask = Box<dyn FnOnce(&mut AppController) + Send>;

pub enum AppEvent {
    Activation(ActivationRequest),
    HotkeyPressed,
    Idle(IdleTask),
    Quit,
}

/// Single-threaded cooperative loop. Foreign threads (control socket,
/// hotkey listener) only post events; all controller mutation happens here.
pub struct MainLoop {
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
    holds: Arc<AtomicUsize>,
}

#[derive(Clone)]
pub struct LoopHandle {
    tx: Sender<AppEvent>,
    holds: Arc<AtomicUsize>,
}

impl Default for MainLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl MainLoop {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self {
            tx,
            rx,
            holds: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn handle(&self) -> LoopHandle {
        LoopHandle {
            tx: self.tx.clone(),
            holds: Arc::clone(&self.holds),
        }
    }

    pub fn run(&self, controller: &mut AppController) {
        while let Ok(event) = self.rx.recv() {
            if self.dispatch(controller, event) {
                break;
            }
        }
    }

    /// Processes queued events without blocking. Test pump.
    pub fn drain(&self, controller: &mut AppController) {
        while let Ok(event) = self.rx.try_recv() {
            if self.dispatch(controller, event) {
                break;
            }
        }
    }

    pub fn next_event(&self, timeout: Duration) -> Option<AppEvent> {
        self.rx.recv_timeout(timeout).ok()
    }

    // One activation request maps onto the lifecycle methods in a fixed
    // order: startup (first request only), before-emit, command-line.
    // Returns true when the loop should stop.
    fn dispatch(&self, controller: &mut AppController, event: AppEvent) -> bool {
        match event {
            AppEvent::Activation(request) => {
                if !controller.started() {
                    controller.on_startup();
                }
                controller.on_before_emit(&request.payload());
                let _ = controller.on_command_line(&request.argv);
                false
            }
            AppEvent::HotkeyPressed => {
                controller.on_activate();
                false
            }
            AppEvent::Idle(task) => {
                task(controller);
                false
            }
            AppEvent::Quit => {
                if self.holds.load(Ordering::SeqCst) > 0 {
                    logging::info("quit deferred; keep-alive hold active");
                    false
                } else {
                    true
                }
            }
        }
    }
}

impl LoopHandle {
    pub fn post(&self, event: AppEvent) {
        let _ = self.tx.send(event);
    }

    pub fn schedule_idle(&self, task: impl FnOnce(&mut AppController) + Send + 'static) {
        let _ = self.tx.send(AppEvent::Idle(Box::new(task)));
    }

    pub fn acquire_hold(&self) {
        self.holds.fetch_add(1, Ordering::SeqCst);
    }

    pub fn release_hold(&self) {
        let _ = self
            .holds
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |holds| {
                holds.checked_sub(1)
            });
    }

    pub fn holds(&self) -> usize {
        self.holds.load(Ordering::SeqCst)
    }
}
