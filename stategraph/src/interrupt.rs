//! Breakpoints and interrupts: pause a run, hand its state out, wait for resume.
//!
//! One [`InterruptManager`] exists per run. The engine calls
//! [`interrupt`](InterruptManager::interrupt) and then
//! [`wait_for_resume`](InterruptManager::wait_for_resume); the controller
//! reads the [`InterruptInfo`] from the receiver returned by
//! [`InterruptManager::new`] and answers with [`resume`](InterruptManager::resume).
//! A paused run stays paused until `resume` is called or its cancellation
//! token fires.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Misuse of the pause/resume rendezvous.
#[derive(Debug, Error)]
pub enum InterruptError {
    /// `interrupt` called while a previous interrupt is still pending.
    #[error("already interrupted")]
    AlreadyInterrupted,

    /// `resume` called with no pending interrupt.
    #[error("not interrupted")]
    NotInterrupted,

    /// Interrupt payload or state could not be serialized.
    #[error("interrupt serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Nobody holds the interrupt receiver, so the pause could never be observed.
    #[error("no interrupt listener")]
    NoListener,

    /// Cancellation fired while waiting for resume.
    #[error("cancelled while waiting for resume")]
    Cancelled,

    /// Resume channel closed.
    #[error("resume channel closed")]
    Closed,
}

/// Notification that a run paused at `node_name`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InterruptInfo {
    pub node_name: String,
    /// Payload from the node's interrupt request; `null` for breakpoints.
    pub data: Value,
    /// Serialized state at the pause point.
    pub state: Value,
    #[serde(default)]
    pub run_id: String,
}

impl InterruptInfo {
    /// Deserializes the carried state.
    pub fn state_as<S: serde::de::DeserializeOwned>(&self) -> Result<S, serde_json::Error> {
        S::deserialize(&self.state)
    }
}

#[derive(Default)]
struct Flags {
    interrupted: bool,
    breakpoints: HashSet<String>,
}

struct Inner<S> {
    run_id: String,
    flags: Mutex<Flags>,
    interrupt_tx: mpsc::Sender<InterruptInfo>,
    resume_tx: mpsc::Sender<S>,
    resume_rx: tokio::sync::Mutex<mpsc::Receiver<S>>,
}

/// Breakpoint set plus the interrupt/resume rendezvous for one run.
///
/// Cheap to clone; clones share the same state, so the controller side can
/// hold one to call `resume` and edit breakpoints while the run is paused.
///
/// Both directions use channels of capacity 1, not an unbuffered handoff.
/// `interrupt` returns once the [`InterruptInfo`] is buffered, before anyone
/// has read it, and `resume` returns once the state is buffered, before the
/// run has picked it up. A second call in either direction waits until the
/// first message has been taken. Use `is_interrupted` for the pause state
/// rather than the return of either call.
pub struct InterruptManager<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for InterruptManager<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> InterruptManager<S>
where
    S: Serialize + Send + 'static,
{
    /// Creates a manager for `run_id` and the receiver of its interrupt notifications.
    pub fn new(run_id: impl Into<String>) -> (Self, mpsc::Receiver<InterruptInfo>) {
        let (interrupt_tx, interrupt_rx) = mpsc::channel(1);
        let (resume_tx, resume_rx) = mpsc::channel(1);
        let manager = Self {
            inner: Arc::new(Inner {
                run_id: run_id.into(),
                flags: Mutex::new(Flags::default()),
                interrupt_tx,
                resume_tx,
                resume_rx: tokio::sync::Mutex::new(resume_rx),
            }),
        };
        (manager, interrupt_rx)
    }

    /// Like [`new`](Self::new), with an initial breakpoint set.
    pub fn with_breakpoints<I, N>(
        run_id: impl Into<String>,
        breakpoints: I,
    ) -> (Self, mpsc::Receiver<InterruptInfo>)
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let (manager, rx) = Self::new(run_id);
        manager
            .flags()
            .breakpoints
            .extend(breakpoints.into_iter().map(Into::into));
        (manager, rx)
    }

    fn flags(&self) -> MutexGuard<'_, Flags> {
        self.inner
            .flags
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn run_id(&self) -> &str {
        &self.inner.run_id
    }

    pub fn add_breakpoint(&self, node_name: impl Into<String>) {
        self.flags().breakpoints.insert(node_name.into());
    }

    pub fn remove_breakpoint(&self, node_name: &str) {
        self.flags().breakpoints.remove(node_name);
    }

    pub fn has_breakpoint(&self, node_name: &str) -> bool {
        self.flags().breakpoints.contains(node_name)
    }

    /// Current breakpoints, sorted.
    pub fn breakpoints(&self) -> Vec<String> {
        let mut names: Vec<_> = self.flags().breakpoints.iter().cloned().collect();
        names.sort();
        names
    }

    pub fn is_interrupted(&self) -> bool {
        self.flags().interrupted
    }

    /// Marks the run as paused at `node_name` and delivers an [`InterruptInfo`].
    ///
    /// Waits while an earlier notification is still unread. Fails with
    /// `AlreadyInterrupted` if a pause is pending and with `NoListener` if the
    /// receiver is gone (the pending flag is cleared again in that case).
    pub async fn interrupt(
        &self,
        node_name: &str,
        data: Option<Value>,
        state: &S,
    ) -> Result<(), InterruptError> {
        let info = InterruptInfo {
            node_name: node_name.to_string(),
            data: data.unwrap_or(Value::Null),
            state: serde_json::to_value(state)?,
            run_id: self.inner.run_id.clone(),
        };

        {
            let mut flags = self.flags();
            if flags.interrupted {
                return Err(InterruptError::AlreadyInterrupted);
            }
            flags.interrupted = true;
        }

        if self.inner.interrupt_tx.send(info).await.is_err() {
            self.flags().interrupted = false;
            return Err(InterruptError::NoListener);
        }
        Ok(())
    }

    /// Clears the pending interrupt and hands `state` to the waiting run.
    pub async fn resume(&self, state: S) -> Result<(), InterruptError> {
        {
            let mut flags = self.flags();
            if !flags.interrupted {
                return Err(InterruptError::NotInterrupted);
            }
            flags.interrupted = false;
        }
        self.inner
            .resume_tx
            .send(state)
            .await
            .map_err(|_| InterruptError::Closed)
    }

    /// Waits for the state passed to [`resume`](Self::resume), or for `cancel`.
    ///
    /// On `Cancelled` or `Closed` the pending flag is cleared, so a later
    /// `resume` fails with `NotInterrupted` instead of buffering a state
    /// nobody will read.
    pub async fn wait_for_resume(&self, cancel: &CancellationToken) -> Result<S, InterruptError> {
        let mut rx = self.inner.resume_rx.lock().await;
        let result = tokio::select! {
            state = rx.recv() => state.ok_or(InterruptError::Closed),
            _ = cancel.cancelled() => Err(InterruptError::Cancelled),
        };
        if result.is_err() {
            self.flags().interrupted = false;
        }
        result
    }
}
