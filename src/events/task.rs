use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::time::Duration;

use crate::foundation::error::{FaceliftError, FaceliftResult};

/// Outcome of polling a [`Deferred`].
#[derive(Debug)]
pub enum TaskPoll<T> {
    /// The computation is still running.
    Pending,
    /// The computation finished; the value is handed out exactly once.
    Ready(T),
    /// The worker went away without a value (it panicked, or the value was already taken).
    Lost,
}

impl<T> TaskPoll<T> {
    /// Return `true` for [`TaskPoll::Pending`].
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// A computation running on a background thread.
///
/// The owner polls it from the render thread (once per tick, typically) and runs its
/// continuation there when the value arrives. There is no cancellation: dropping a
/// `Deferred` detaches the worker, which runs to completion and discards its value.
#[derive(Debug)]
pub struct Deferred<T> {
    label: String,
    rx: Option<Receiver<T>>,
}

impl<T: Send + 'static> Deferred<T> {
    /// Spawn `f` on a named worker thread.
    pub fn spawn(
        label: impl Into<String>,
        f: impl FnOnce() -> T + Send + 'static,
    ) -> FaceliftResult<Self> {
        let label = label.into();
        let (tx, rx) = mpsc::sync_channel(1);
        std::thread::Builder::new()
            .name(format!("facelift-{label}"))
            .spawn(move || {
                // The receiver may be gone if the owner dropped the task; that is fine.
                let _ = tx.send(f());
            })
            .map_err(|e| {
                FaceliftError::Other(anyhow::anyhow!("failed to spawn task '{label}': {e}"))
            })?;
        Ok(Self { label, rx: Some(rx) })
    }
}

impl<T> Deferred<T> {
    /// Build an already-completed task.
    pub fn ready(label: impl Into<String>, value: T) -> Self {
        let (tx, rx) = mpsc::sync_channel(1);
        let _ = tx.send(value);
        Self {
            label: label.into(),
            rx: Some(rx),
        }
    }

    /// Label given at construction (also the worker thread name suffix).
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Return `true` until the value (or its loss) has been observed by a poll.
    pub fn is_pending(&self) -> bool {
        self.rx.is_some()
    }

    /// Check for completion without blocking.
    pub fn poll(&mut self) -> TaskPoll<T> {
        let Some(rx) = self.rx.as_ref() else {
            return TaskPoll::Lost;
        };
        match rx.try_recv() {
            Ok(v) => {
                self.rx = None;
                TaskPoll::Ready(v)
            }
            Err(TryRecvError::Empty) => TaskPoll::Pending,
            Err(TryRecvError::Disconnected) => {
                self.rx = None;
                TaskPoll::Lost
            }
        }
    }

    /// Wait up to `timeout` for completion.
    ///
    /// Intended for shutdown paths and tests; the render loop only ever calls [`Self::poll`].
    pub fn wait_timeout(&mut self, timeout: Duration) -> TaskPoll<T> {
        let Some(rx) = self.rx.as_ref() else {
            return TaskPoll::Lost;
        };
        match rx.recv_timeout(timeout) {
            Ok(v) => {
                self.rx = None;
                TaskPoll::Ready(v)
            }
            Err(RecvTimeoutError::Timeout) => TaskPoll::Pending,
            Err(RecvTimeoutError::Disconnected) => {
                self.rx = None;
                TaskPoll::Lost
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/events/task.rs"]
mod tests;
