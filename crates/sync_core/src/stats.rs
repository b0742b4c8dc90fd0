use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::watcher::UpdateKind;

/// Handler invocation counters shared by the dispatcher and its owner.
#[derive(Debug, Default)]
pub struct DispatchStats {
    content: AtomicU64,
    view: AtomicU64,
    vertex: AtomicU64,
    failures: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub content_dispatches: u64,
    pub view_dispatches: u64,
    pub vertex_dispatches: u64,
    pub handler_failures: u64,
}

impl StatsSnapshot {
    pub fn dispatches(&self, kind: UpdateKind) -> u64 {
        match kind {
            UpdateKind::Content => self.content_dispatches,
            UpdateKind::View => self.view_dispatches,
            UpdateKind::Vertex => self.vertex_dispatches,
        }
    }
}

impl DispatchStats {
    pub(crate) fn record_dispatch(&self, kind: UpdateKind) {
        let counter = match kind {
            UpdateKind::Content => &self.content,
            UpdateKind::View => &self.view,
            UpdateKind::Vertex => &self.vertex,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            content_dispatches: self.content.load(Ordering::Relaxed),
            view_dispatches: self.view.load(Ordering::Relaxed),
            vertex_dispatches: self.vertex.load(Ordering::Relaxed),
            handler_failures: self.failures.load(Ordering::Relaxed),
        }
    }
}
