//! Cancellable execution supervisor.
//!
//! Runs one command handler to completion on a worker thread while the
//! controlling thread polls an abort source with a bounded timeout. The
//! only shared state between the two is a single completion flag,
//! written once by the worker and read repeatedly by the supervisor.
//!
//! Cancellation is not cooperative: when abort is observed first, the
//! supervisor abandons the worker without joining it and reports
//! [`ExecOutcome::Cancelled`]; the caller is expected to terminate the
//! process immediately. Handlers must assume they may never get to run
//! cleanup code.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crate::registry::CommandHandler;

/// How long one abort poll may block before looping again.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Result of one abort poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortPoll {
    /// Nothing observed within the timeout.
    Quiet,
    /// End-of-input or the cancel byte was observed: hard abort.
    Abort,
}

/// Source of the user-driven hard-abort signal.
///
/// The interactive shell implements this over the terminal; tests inject
/// scripted implementations. Only the supervisor reads the abort source
/// while a handler runs.
pub trait AbortWatch {
    /// Wait up to `timeout` for an abort signal.
    fn poll(&mut self, timeout: Duration) -> AbortPoll;
}

/// Outcome of one supervised invocation, produced exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecOutcome {
    Completed,
    Failed(String),
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Idle,
    Running,
}

/// Supervises handler execution: `Idle -> Running -> outcome -> Idle`.
///
/// At most one handler runs at a time; `run_watched` holds the
/// supervisor mutably for the whole invocation.
pub struct ExecutionSupervisor {
    state: RunState,
    poll_interval: Duration,
}

impl Default for ExecutionSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionSupervisor {
    pub fn new() -> Self {
        Self {
            state: RunState::Idle,
            poll_interval: POLL_INTERVAL,
        }
    }

    /// Override the bounded poll timeout (tests use short intervals).
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// Interactive path: run the handler on a worker thread while
    /// polling `watch` for abort.
    ///
    /// Abort observed first returns [`ExecOutcome::Cancelled`] without
    /// joining the worker; the abandoned thread dies with the process.
    /// Supervision itself still ends, so the state returns to idle.
    pub fn run_watched(
        &mut self,
        handler: &CommandHandler,
        args: &[String],
        watch: &mut dyn AbortWatch,
    ) -> ExecOutcome {
        self.state = RunState::Running;
        tracing::debug!(command = args.first().map(String::as_str), "handler starting");

        let finished = Arc::new(AtomicBool::new(false));
        let worker_finished = finished.clone();
        let worker_handler = handler.clone();
        let worker_args: Vec<String> = args.to_vec();

        let worker = thread::Builder::new()
            .name("treeline-handler".into())
            .spawn(move || {
                // catch_unwind keeps the completion flag authoritative
                // even when the handler panics.
                let result =
                    panic::catch_unwind(AssertUnwindSafe(|| worker_handler(&worker_args)));
                worker_finished.store(true, Ordering::Release);
                result
            });
        let worker = match worker {
            Ok(handle) => handle,
            Err(err) => {
                self.state = RunState::Idle;
                return ExecOutcome::Failed(format!("failed to start handler thread: {err}"));
            }
        };

        while !finished.load(Ordering::Acquire) {
            if watch.poll(self.poll_interval) == AbortPoll::Abort {
                tracing::info!("abort observed, abandoning running handler");
                self.state = RunState::Idle;
                return ExecOutcome::Cancelled;
            }
        }

        let outcome = match worker.join() {
            Ok(Ok(Ok(()))) => ExecOutcome::Completed,
            Ok(Ok(Err(err))) => ExecOutcome::Failed(err.to_string()),
            Ok(Err(payload)) => ExecOutcome::Failed(panic_message(payload.as_ref())),
            Err(payload) => ExecOutcome::Failed(panic_message(payload.as_ref())),
        };
        tracing::debug!(?outcome, "handler finished");
        self.state = RunState::Idle;
        outcome
    }

    /// Single-shot path: run the handler synchronously with no
    /// concurrent abort observation.
    pub fn run_blocking(&mut self, handler: &CommandHandler, args: &[String]) -> ExecOutcome {
        self.state = RunState::Running;
        let result = panic::catch_unwind(AssertUnwindSafe(|| handler(args)));
        self.state = RunState::Idle;
        match result {
            Ok(Ok(())) => ExecOutcome::Completed,
            Ok(Err(err)) => ExecOutcome::Failed(err.to_string()),
            Err(payload) => ExecOutcome::Failed(panic_message(payload.as_ref())),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("handler panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("handler panicked: {s}")
    } else {
        "handler panicked".to_string()
    }
}
