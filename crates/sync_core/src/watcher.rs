//! Passive sink for producer events.
//!
//! Every producer callback ends up here. Recording an event is a timestamp
//! store followed by a flag store, done on whatever thread raised it.

use std::{
    sync::atomic::{AtomicBool, AtomicU64, Ordering},
    time::{Duration, Instant},
};

use parking_lot::Mutex;
use serde::Serialize;
use shared::domain::SpotId;

const NO_EVENT: u64 = u64::MAX;

/// Which kind of secondary-view update an event asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    /// Rebuild the visible scene objects.
    Content,
    /// Reposition the camera.
    View,
    /// Move one scene object after its vertex was dragged.
    Vertex,
}

impl UpdateKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::View => "view",
            Self::Vertex => "vertex",
        }
    }
}

pub struct EventWatcher {
    epoch: Instant,
    // Nanoseconds since `epoch`, NO_EVENT until the first event.
    last_event: AtomicU64,
    content_dirty: AtomicBool,
    view_dirty: AtomicBool,
    vertex_dirty: AtomicBool,
    locked: AtomicBool,
    moved_spot: Mutex<Option<SpotId>>,
}

impl Default for EventWatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventWatcher {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            last_event: AtomicU64::new(NO_EVENT),
            content_dirty: AtomicBool::new(false),
            view_dirty: AtomicBool::new(false),
            vertex_dirty: AtomicBool::new(false),
            locked: AtomicBool::new(false),
            moved_spot: Mutex::new(None),
        }
    }

    /// Something that changes the scene content happened.
    pub fn on_content_event(&self) {
        self.record_at(UpdateKind::Content, Instant::now());
    }

    /// The primary viewer's camera transform changed.
    pub fn on_view_event(&self) {
        self.record_at(UpdateKind::View, Instant::now());
    }

    /// A vertex was moved; only the most recent spot is kept.
    pub fn on_vertex_moved(&self, spot: SpotId) {
        self.record_vertex_at(spot, Instant::now());
    }

    pub(crate) fn record_vertex_at(&self, spot: SpotId, at: Instant) {
        *self.moved_spot.lock() = Some(spot);
        self.record_at(UpdateKind::Vertex, at);
    }

    pub(crate) fn record_at(&self, kind: UpdateKind, at: Instant) {
        let nanos = u64::try_from(at.saturating_duration_since(self.epoch).as_nanos())
            .unwrap_or(NO_EVENT - 1)
            .min(NO_EVENT - 1);
        // The timestamp must be visible before the flag that announces it.
        self.last_event.store(nanos, Ordering::Release);
        self.flag(kind).store(true, Ordering::Release);
        tracing::trace!(kind = kind.as_str(), "sync: producer event recorded");
    }

    pub fn is_content_dirty(&self) -> bool {
        self.is_dirty(UpdateKind::Content)
    }

    pub fn is_view_dirty(&self) -> bool {
        self.is_dirty(UpdateKind::View)
    }

    pub fn is_vertex_dirty(&self) -> bool {
        self.is_dirty(UpdateKind::Vertex)
    }

    pub fn is_dirty(&self, kind: UpdateKind) -> bool {
        self.flag(kind).load(Ordering::Acquire)
    }

    pub fn any_dirty(&self) -> bool {
        self.is_content_dirty() || self.is_view_dirty() || self.is_vertex_dirty()
    }

    /// Time of the most recent event of any kind.
    pub fn last_event_at(&self) -> Option<Instant> {
        match self.last_event.load(Ordering::Acquire) {
            NO_EVENT => None,
            nanos => Some(self.epoch + Duration::from_nanos(nanos)),
        }
    }

    pub fn moved_spot(&self) -> Option<SpotId> {
        *self.moved_spot.lock()
    }

    /// While locked the dispatcher leaves pending work untouched.
    pub fn set_locked(&self, locked: bool) {
        self.locked.store(locked, Ordering::Release);
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    /// Clears the flag and reports whether it was set.
    pub(crate) fn take(&self, kind: UpdateKind) -> bool {
        self.flag(kind).swap(false, Ordering::AcqRel)
    }

    fn flag(&self, kind: UpdateKind) -> &AtomicBool {
        match kind {
            UpdateKind::Content => &self.content_dirty,
            UpdateKind::View => &self.view_dirty,
            UpdateKind::Vertex => &self.vertex_dirty,
        }
    }
}

#[cfg(test)]
#[path = "tests/watcher_tests.rs"]
mod tests;
