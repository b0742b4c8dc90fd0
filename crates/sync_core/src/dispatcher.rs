//! Debounced dispatch of pending updates on a dedicated worker thread.
//!
//! The dispatcher looks at the [`EventWatcher`] on every pass of its loop.
//! Pending work is only dispatched once no event of any kind has arrived for
//! longer than the quiescence window, so a burst of producer events collapses
//! into one handler call that sees the final state. Within one cycle content
//! is handled before view, and view before vertex.

use std::{
    any::Any,
    io,
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicBool, AtomicU8, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use serde::Serialize;
use tracing::{debug, error, info};

use crate::{
    handlers::UpdateHandlers,
    stats::DispatchStats,
    watcher::{EventWatcher, UpdateKind},
};

pub const SERVICE_NAME: &str = "viewer events watcher";
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);
const DISPATCH_ORDER: [UpdateKind; 3] = [UpdateKind::Content, UpdateKind::View, UpdateKind::Vertex];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatcherState {
    Created,
    Running,
    Stopped,
}

impl DispatcherState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Created,
            1 => Self::Running,
            _ => Self::Stopped,
        }
    }
}

/// Stop flag and lifecycle state shared by the worker and its handle.
#[derive(Debug)]
pub(crate) struct DispatcherControl {
    stop: AtomicBool,
    state: AtomicU8,
}

impl DispatcherControl {
    fn new() -> Self {
        Self {
            stop: AtomicBool::new(false),
            state: AtomicU8::new(DispatcherState::Created as u8),
        }
    }

    pub(crate) fn state(&self) -> DispatcherState {
        DispatcherState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: DispatcherState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// Returns true only for the call that actually raised the flag.
    fn request_stop(&self) -> bool {
        !self.stop.swap(true, Ordering::AcqRel)
    }
}

/// What one pass of the dispatch loop did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Nothing pending.
    Idle,
    /// Work is pending but updates are locked.
    Held,
    /// Work is pending and the last event is still fresh; holds the time left
    /// until the quiescence window closes.
    Settling(Duration),
    Dispatched(Fired),
    Stopped,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Fired {
    pub(crate) content: bool,
    pub(crate) view: bool,
    pub(crate) vertex: bool,
}

impl Fired {
    fn mark(&mut self, kind: UpdateKind) {
        match kind {
            UpdateKind::Content => self.content = true,
            UpdateKind::View => self.view = true,
            UpdateKind::Vertex => self.vertex = true,
        }
    }
}

pub struct CoalescingDispatcher {
    watcher: Arc<EventWatcher>,
    handlers: UpdateHandlers,
    quiescence: Duration,
    stats: Arc<DispatchStats>,
    control: Arc<DispatcherControl>,
}

impl CoalescingDispatcher {
    pub fn new(
        watcher: Arc<EventWatcher>,
        handlers: UpdateHandlers,
        quiescence: Duration,
        stats: Arc<DispatchStats>,
    ) -> Self {
        Self {
            watcher,
            handlers,
            quiescence,
            stats,
            control: Arc::new(DispatcherControl::new()),
        }
    }

    pub fn state(&self) -> DispatcherState {
        self.control.state()
    }

    pub fn quiescence(&self) -> Duration {
        self.quiescence
    }

    /// Sleep granularity while idle: half the quiescence window.
    pub fn poll_interval(&self) -> Duration {
        (self.quiescence / 2).max(MIN_POLL_INTERVAL)
    }

    /// Spawns the worker thread and moves the dispatcher onto it.
    pub fn start(self, thread_name: &str) -> io::Result<DispatcherHandle> {
        let (wake_tx, wake_rx) = bounded(1);
        let control = Arc::clone(&self.control);
        control.set_state(DispatcherState::Running);
        let spawned = thread::Builder::new()
            .name(thread_name.to_string())
            .spawn(move || self.run(wake_rx));
        match spawned {
            Ok(thread) => Ok(DispatcherHandle {
                control,
                wake: wake_tx,
                thread: Some(thread),
            }),
            Err(err) => {
                control.set_state(DispatcherState::Stopped);
                Err(err)
            }
        }
    }

    fn run(mut self, wake: Receiver<()>) {
        info!(
            service = SERVICE_NAME,
            quiescence_ms = millis(self.quiescence),
            "sync: dispatcher started"
        );
        let poll = self.poll_interval();
        loop {
            let wait = match self.step(Instant::now()) {
                Step::Stopped => break,
                Step::Dispatched(_) => continue,
                Step::Idle | Step::Held => poll,
                Step::Settling(remaining) => remaining.min(poll),
            };
            match wake.recv_timeout(wait) {
                Ok(()) | Err(RecvTimeoutError::Timeout) => {}
                // Handle dropped while we slept; treat like a stop request.
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        self.control.set_state(DispatcherState::Stopped);
        info!(service = SERVICE_NAME, "sync: dispatcher stopped");
    }

    /// One pass of the dispatch loop, evaluated at `now`.
    pub(crate) fn step(&mut self, now: Instant) -> Step {
        if self.control.stop_requested() {
            return Step::Stopped;
        }
        let pending = DISPATCH_ORDER.map(|kind| self.watcher.is_dirty(kind));
        if !pending.contains(&true) {
            return Step::Idle;
        }
        if self.watcher.is_locked() {
            return Step::Held;
        }
        let Some(last_event) = self.watcher.last_event_at() else {
            return Step::Idle;
        };
        let silence = now.saturating_duration_since(last_event);
        if silence <= self.quiescence {
            return Step::Settling(self.quiescence - silence);
        }

        // Without a vertex handler a vertex move is a content change.
        let fold_vertex = !self.handlers.handles_vertex_moves();
        let vertex_pending = pending[2];
        let mut fired = Fired::default();
        for (kind, was_pending) in DISPATCH_ORDER.into_iter().zip(pending) {
            let due = match kind {
                UpdateKind::Content => was_pending || (fold_vertex && vertex_pending),
                UpdateKind::Vertex => was_pending && !fold_vertex,
                UpdateKind::View => was_pending,
            };
            if !due {
                continue;
            }
            // Pending work is dropped, not flushed, once stop is requested.
            if self.control.stop_requested() {
                return Step::Stopped;
            }
            if self.take_due(kind, fold_vertex) {
                debug!(
                    kind = kind.as_str(),
                    silence_ms = millis(silence),
                    "sync: event and silence detected, processing it now"
                );
                self.invoke(kind);
                fired.mark(kind);
            }
        }
        Step::Dispatched(fired)
    }

    fn take_due(&self, kind: UpdateKind, fold_vertex: bool) -> bool {
        match kind {
            UpdateKind::Content if fold_vertex => {
                let content = self.watcher.take(UpdateKind::Content);
                let vertex = self.watcher.take(UpdateKind::Vertex);
                content || vertex
            }
            _ => self.watcher.take(kind),
        }
    }

    fn invoke(&mut self, kind: UpdateKind) {
        let watcher = &self.watcher;
        let handlers = &mut self.handlers;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| match kind {
            UpdateKind::Content => (handlers.content)(),
            UpdateKind::View => (handlers.view)(),
            UpdateKind::Vertex => match handlers.vertex.as_mut() {
                Some(handler) => handler(watcher.moved_spot()),
                None => (handlers.content)(),
            },
        }));

        self.stats.record_dispatch(kind);
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                self.stats.record_failure();
                error!(kind = kind.as_str(), "sync: update handler failed: {err:#}");
            }
            Err(payload) => {
                self.stats.record_failure();
                error!(
                    kind = kind.as_str(),
                    "sync: update handler panicked: {}",
                    panic_message(payload.as_ref())
                );
            }
        }
    }
}

pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

/// Owner side of a running dispatcher.
pub struct DispatcherHandle {
    control: Arc<DispatcherControl>,
    wake: Sender<()>,
    thread: Option<JoinHandle<()>>,
}

impl DispatcherHandle {
    pub fn state(&self) -> DispatcherState {
        self.control.state()
    }

    pub(crate) fn control(&self) -> Arc<DispatcherControl> {
        Arc::clone(&self.control)
    }

    /// Asks the worker to exit. Safe to call any number of times.
    pub fn stop(&self) {
        if self.control.request_stop() {
            let _ = self.wake.try_send(());
            debug!(service = SERVICE_NAME, "sync: dispatcher stop requested");
        }
    }

    /// Waits for the worker to exit. Does not wait when called from the
    /// worker itself, e.g. by a handler that closes the viewer window.
    pub fn join(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        if thread.thread().id() == thread::current().id() {
            debug!(
                service = SERVICE_NAME,
                "sync: stop requested from the dispatcher thread, not joining"
            );
            return;
        }
        if thread.join().is_err() {
            error!(service = SERVICE_NAME, "sync: dispatcher thread panicked");
            self.control.set_state(DispatcherState::Stopped);
        }
    }
}

impl Drop for DispatcherHandle {
    fn drop(&mut self) {
        self.stop();
        self.join();
    }
}

#[cfg(test)]
#[path = "tests/dispatcher_tests.rs"]
mod tests;
