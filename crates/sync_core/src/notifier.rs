//! Composition root: one watcher, one dispatcher, every producer registry.

use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use parking_lot::Mutex;
use shared::{
    domain::{ListenerId, ListenerSource, PropertyChange, SpotId, TimepointIndex, ViewerTransform},
    error::RegistrationError,
};
use tracing::{debug, info, warn};
use viewer_integration::{DomainModel, ViewerWindow};

use crate::{
    dispatcher::{
        millis, CoalescingDispatcher, DispatcherControl, DispatcherHandle, DispatcherState,
        SERVICE_NAME,
    },
    error::NotifierError,
    handlers::UpdateHandlers,
    stats::{DispatchStats, StatsSnapshot},
    watcher::EventWatcher,
};

pub const DEFAULT_QUIESCENCE: Duration = Duration::from_millis(10);

#[derive(Debug, Clone)]
pub struct NotifierOptions {
    /// Silence required after the last event before handlers run.
    pub quiescence: Duration,
    pub thread_name: String,
}

impl Default for NotifierOptions {
    fn default() -> Self {
        Self {
            quiescence: DEFAULT_QUIESCENCE,
            thread_name: SERVICE_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Registration {
    source: ListenerSource,
    id: ListenerId,
}

impl Registration {
    fn remove(self, viewer: &dyn ViewerWindow, model: &dyn DomainModel) -> Result<(), RegistrationError> {
        match self.source {
            ListenerSource::RenderTransform => viewer.remove_transform_listener(self.id),
            ListenerSource::Timepoint => viewer.remove_timepoint_listener(self.id),
            ListenerSource::ViewerProperty => viewer.remove_property_change_listener(self.id),
            ListenerSource::Coloring => viewer.remove_coloring_listener(self.id),
            ListenerSource::WindowClose => viewer.remove_close_hook(self.id),
            ListenerSource::Focus => model.remove_focus_listener(self.id),
            ListenerSource::VertexPosition => model.remove_vertex_position_listener(self.id),
            ListenerSource::GraphChange => model.remove_graph_change_listener(self.id),
        }
    }
}

struct Teardown {
    registrations: Vec<Registration>,
    dispatcher: DispatcherHandle,
}

struct NotifierInner {
    watcher: Arc<EventWatcher>,
    stats: Arc<DispatchStats>,
    control: Arc<DispatcherControl>,
    viewer: Arc<dyn ViewerWindow>,
    model: Arc<dyn DomainModel>,
    // None once torn down.
    teardown: Mutex<Option<Teardown>>,
}

/// Runs the content handler when the viewer or the model changes in a way
/// that needs a scene rebuild, and the view handler when the viewer's camera
/// moves. Dropping the notifier or closing the viewer window tears it down.
pub struct Notifier {
    inner: Arc<NotifierInner>,
}

impl Notifier {
    pub fn new(
        handlers: UpdateHandlers,
        model: Arc<dyn DomainModel>,
        viewer: Arc<dyn ViewerWindow>,
    ) -> Result<Self, NotifierError> {
        Self::with_options(handlers, model, viewer, NotifierOptions::default())
    }

    pub fn with_options(
        handlers: UpdateHandlers,
        model: Arc<dyn DomainModel>,
        viewer: Arc<dyn ViewerWindow>,
        options: NotifierOptions,
    ) -> Result<Self, NotifierError> {
        let watcher = Arc::new(EventWatcher::new());
        let stats = Arc::new(DispatchStats::default());

        let mut registrations = Vec::with_capacity(8);
        if let Err(err) = attach(
            &watcher,
            handlers.handles_vertex_moves(),
            viewer.as_ref(),
            model.as_ref(),
            &mut registrations,
        ) {
            rollback(&registrations, viewer.as_ref(), model.as_ref());
            return Err(err.into());
        }

        let dispatcher = CoalescingDispatcher::new(
            Arc::clone(&watcher),
            handlers,
            options.quiescence,
            Arc::clone(&stats),
        );
        let dispatcher = match dispatcher.start(&options.thread_name) {
            Ok(handle) => handle,
            Err(err) => {
                rollback(&registrations, viewer.as_ref(), model.as_ref());
                return Err(NotifierError::SpawnDispatcher(err));
            }
        };

        let inner = Arc::new(NotifierInner {
            watcher,
            stats,
            control: dispatcher.control(),
            viewer: Arc::clone(&viewer),
            model,
            teardown: Mutex::new(Some(Teardown {
                registrations,
                dispatcher,
            })),
        });

        let close_hook = close_hook(Arc::downgrade(&inner));
        match viewer.on_close(close_hook) {
            Ok(id) => {
                if let Some(teardown) = inner.teardown.lock().as_mut() {
                    teardown.registrations.push(Registration {
                        source: ListenerSource::WindowClose,
                        id,
                    });
                }
            }
            Err(err) => {
                if let Err(close_err) = inner.close() {
                    warn!("sync: cleanup after failed close-hook registration: {close_err}");
                }
                return Err(err.into());
            }
        }

        info!(
            quiescence_ms = millis(options.quiescence),
            thread = %options.thread_name,
            "sync: notifier attached to viewer and model"
        );
        Ok(Self { inner })
    }

    /// Unregisters every listener and stops the dispatcher. Calls after the
    /// first one do nothing.
    pub fn close(&self) -> Result<(), NotifierError> {
        self.inner.close()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.teardown.lock().is_none()
    }

    /// Holds back all dispatching while `locked`; events keep accumulating.
    pub fn set_updates_locked(&self, locked: bool) {
        self.inner.watcher.set_locked(locked);
        debug!(locked, "sync: update lock changed");
    }

    pub fn watcher(&self) -> &Arc<EventWatcher> {
        &self.inner.watcher
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.inner.stats.snapshot()
    }

    pub fn dispatcher_state(&self) -> DispatcherState {
        self.inner.control.state()
    }
}

impl Drop for Notifier {
    fn drop(&mut self) {
        if let Err(err) = self.inner.close() {
            warn!("sync: notifier teardown on drop: {err}");
        }
    }
}

impl NotifierInner {
    fn close(&self) -> Result<(), NotifierError> {
        let Some(mut teardown) = self.teardown.lock().take() else {
            debug!("sync: notifier already closed");
            return Ok(());
        };

        let mut failures = Vec::new();
        for registration in &teardown.registrations {
            if let Err(err) = registration.remove(self.viewer.as_ref(), self.model.as_ref()) {
                warn!(registry = %registration.source, "sync: failed to unregister listener: {err}");
                failures.push(err);
            }
        }
        teardown.dispatcher.stop();
        teardown.dispatcher.join();
        info!(
            unregistered = teardown.registrations.len() - failures.len(),
            "sync: notifier closed"
        );

        if failures.is_empty() {
            Ok(())
        } else {
            Err(NotifierError::Unregister { failures })
        }
    }
}

fn close_hook(inner: Weak<NotifierInner>) -> viewer_integration::CloseHook {
    Arc::new(move || {
        let Some(inner) = inner.upgrade() else {
            return;
        };
        debug!("sync: cleaning up while viewer window is closing");
        if let Err(err) = inner.close() {
            warn!("sync: teardown on window close: {err}");
        }
    })
}

/// Binds one small closure per producer capability to the shared watcher.
fn attach(
    watcher: &Arc<EventWatcher>,
    route_vertex_moves: bool,
    viewer: &dyn ViewerWindow,
    model: &dyn DomainModel,
    registrations: &mut Vec<Registration>,
) -> Result<(), RegistrationError> {
    let mut push = |source: ListenerSource, id: ListenerId| {
        registrations.push(Registration { source, id });
    };

    let w = Arc::clone(watcher);
    let id = viewer.add_transform_listener(Arc::new(move |_: &ViewerTransform| w.on_view_event()))?;
    push(ListenerSource::RenderTransform, id);

    let w = Arc::clone(watcher);
    let id = viewer.add_timepoint_listener(Arc::new(move |_: TimepointIndex| w.on_content_event()))?;
    push(ListenerSource::Timepoint, id);

    let w = Arc::clone(watcher);
    let id = viewer
        .add_property_change_listener(Arc::new(move |_: &PropertyChange| w.on_content_event()))?;
    push(ListenerSource::ViewerProperty, id);

    let w = Arc::clone(watcher);
    let id = viewer.add_coloring_listener(Arc::new(move || w.on_content_event()))?;
    push(ListenerSource::Coloring, id);

    let w = Arc::clone(watcher);
    let id = model.add_focus_listener(Arc::new(move || w.on_content_event()))?;
    push(ListenerSource::Focus, id);

    let w = Arc::clone(watcher);
    let id = model.add_vertex_position_listener(Arc::new(move |spot: SpotId| {
        if route_vertex_moves {
            w.on_vertex_moved(spot);
        } else {
            w.on_content_event();
        }
    }))?;
    push(ListenerSource::VertexPosition, id);

    let w = Arc::clone(watcher);
    let id = model.add_graph_change_listener(Arc::new(move || w.on_content_event()))?;
    push(ListenerSource::GraphChange, id);

    Ok(())
}

fn rollback(registrations: &[Registration], viewer: &dyn ViewerWindow, model: &dyn DomainModel) {
    for registration in registrations {
        if let Err(err) = registration.remove(viewer, model) {
            warn!(registry = %registration.source, "sync: rollback failed to unregister listener: {err}");
        }
    }
}

#[cfg(test)]
#[path = "tests/notifier_tests.rs"]
mod tests;
