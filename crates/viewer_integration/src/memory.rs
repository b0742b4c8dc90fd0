//! In-memory viewer window and data model.
//!
//! Producer methods (`set_transform`, `move_spot`, ...) update the state first
//! and then notify a snapshot of the registered listeners on the calling
//! thread, the way a UI toolkit notifies from its dispatch thread.

use parking_lot::Mutex;
use shared::{
    domain::{ListenerId, ListenerSource, PropertyChange, SpotId, TimepointIndex, ViewerTransform},
    error::RegistrationError,
};

use crate::{
    registry::ListenerRegistry, CloseHook, ColoringListener, DomainModel, FocusListener,
    GraphChangeListener, PropertyChangeListener, TimepointListener, TransformListener,
    VertexPositionListener, ViewerWindow,
};

#[derive(Debug, Clone, Copy)]
struct ViewerState {
    timepoint: TimepointIndex,
    transform: ViewerTransform,
    closed: bool,
}

pub struct InMemoryViewer {
    state: Mutex<ViewerState>,
    transform_listeners: ListenerRegistry<TransformListener>,
    timepoint_listeners: ListenerRegistry<TimepointListener>,
    property_listeners: ListenerRegistry<PropertyChangeListener>,
    coloring_listeners: ListenerRegistry<ColoringListener>,
    close_hooks: ListenerRegistry<CloseHook>,
}

impl Default for InMemoryViewer {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryViewer {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ViewerState {
                timepoint: TimepointIndex(0),
                transform: ViewerTransform::IDENTITY,
                closed: false,
            }),
            transform_listeners: ListenerRegistry::new(ListenerSource::RenderTransform),
            timepoint_listeners: ListenerRegistry::new(ListenerSource::Timepoint),
            property_listeners: ListenerRegistry::new(ListenerSource::ViewerProperty),
            coloring_listeners: ListenerRegistry::new(ListenerSource::Coloring),
            close_hooks: ListenerRegistry::new(ListenerSource::WindowClose),
        }
    }

    pub fn set_transform(&self, transform: ViewerTransform) {
        self.state.lock().transform = transform;
        for listener in self.transform_listeners.snapshot() {
            listener(&transform);
        }
    }

    pub fn set_timepoint(&self, timepoint: TimepointIndex) {
        self.state.lock().timepoint = timepoint;
        for listener in self.timepoint_listeners.snapshot() {
            listener(timepoint);
        }
    }

    pub fn set_property(&self, change: PropertyChange) {
        for listener in self.property_listeners.snapshot() {
            listener(&change);
        }
    }

    pub fn change_coloring(&self) {
        for listener in self.coloring_listeners.snapshot() {
            listener();
        }
    }

    /// Runs the close hooks, then closes every registry. Later calls do nothing.
    pub fn close_window(&self) {
        {
            let mut state = self.state.lock();
            if state.closed {
                return;
            }
            state.closed = true;
        }
        for hook in self.close_hooks.snapshot() {
            hook();
        }
        self.transform_listeners.close();
        self.timepoint_listeners.close();
        self.property_listeners.close();
        self.coloring_listeners.close();
        self.close_hooks.close();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn listener_count(&self, source: ListenerSource) -> usize {
        match source {
            ListenerSource::RenderTransform => self.transform_listeners.len(),
            ListenerSource::Timepoint => self.timepoint_listeners.len(),
            ListenerSource::ViewerProperty => self.property_listeners.len(),
            ListenerSource::Coloring => self.coloring_listeners.len(),
            ListenerSource::WindowClose => self.close_hooks.len(),
            ListenerSource::Focus | ListenerSource::VertexPosition | ListenerSource::GraphChange => 0,
        }
    }
}

impl ViewerWindow for InMemoryViewer {
    fn add_transform_listener(
        &self,
        listener: TransformListener,
    ) -> Result<ListenerId, RegistrationError> {
        self.transform_listeners.add(listener)
    }

    fn remove_transform_listener(&self, id: ListenerId) -> Result<(), RegistrationError> {
        self.transform_listeners.remove(id)
    }

    fn add_timepoint_listener(
        &self,
        listener: TimepointListener,
    ) -> Result<ListenerId, RegistrationError> {
        self.timepoint_listeners.add(listener)
    }

    fn remove_timepoint_listener(&self, id: ListenerId) -> Result<(), RegistrationError> {
        self.timepoint_listeners.remove(id)
    }

    fn add_property_change_listener(
        &self,
        listener: PropertyChangeListener,
    ) -> Result<ListenerId, RegistrationError> {
        self.property_listeners.add(listener)
    }

    fn remove_property_change_listener(&self, id: ListenerId) -> Result<(), RegistrationError> {
        self.property_listeners.remove(id)
    }

    fn add_coloring_listener(
        &self,
        listener: ColoringListener,
    ) -> Result<ListenerId, RegistrationError> {
        self.coloring_listeners.add(listener)
    }

    fn remove_coloring_listener(&self, id: ListenerId) -> Result<(), RegistrationError> {
        self.coloring_listeners.remove(id)
    }

    fn on_close(&self, hook: CloseHook) -> Result<ListenerId, RegistrationError> {
        self.close_hooks.add(hook)
    }

    fn remove_close_hook(&self, id: ListenerId) -> Result<(), RegistrationError> {
        self.close_hooks.remove(id)
    }

    fn current_timepoint(&self) -> TimepointIndex {
        self.state.lock().timepoint
    }

    fn viewer_transform(&self) -> ViewerTransform {
        self.state.lock().transform
    }
}

#[derive(Debug, Default)]
struct ModelState {
    next_spot: i64,
    focused: Option<SpotId>,
}

pub struct InMemoryModel {
    state: Mutex<ModelState>,
    focus_listeners: ListenerRegistry<FocusListener>,
    vertex_listeners: ListenerRegistry<VertexPositionListener>,
    graph_listeners: ListenerRegistry<GraphChangeListener>,
}

impl Default for InMemoryModel {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryModel {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ModelState::default()),
            focus_listeners: ListenerRegistry::new(ListenerSource::Focus),
            vertex_listeners: ListenerRegistry::new(ListenerSource::VertexPosition),
            graph_listeners: ListenerRegistry::new(ListenerSource::GraphChange),
        }
    }

    /// Adds a spot to the graph and reports a topology change.
    pub fn add_spot(&self) -> SpotId {
        let spot = {
            let mut state = self.state.lock();
            state.next_spot += 1;
            SpotId(state.next_spot)
        };
        for listener in self.graph_listeners.snapshot() {
            listener();
        }
        spot
    }

    pub fn move_spot(&self, spot: SpotId) {
        for listener in self.vertex_listeners.snapshot() {
            listener(spot);
        }
    }

    pub fn focus(&self, spot: Option<SpotId>) {
        self.state.lock().focused = spot;
        for listener in self.focus_listeners.snapshot() {
            listener();
        }
    }

    pub fn focused(&self) -> Option<SpotId> {
        self.state.lock().focused
    }

    pub fn spot_count(&self) -> usize {
        usize::try_from(self.state.lock().next_spot).unwrap_or_default()
    }

    /// Closes every registry; later adds and removes are rejected.
    pub fn close(&self) {
        self.focus_listeners.close();
        self.vertex_listeners.close();
        self.graph_listeners.close();
    }

    pub fn listener_count(&self, source: ListenerSource) -> usize {
        match source {
            ListenerSource::Focus => self.focus_listeners.len(),
            ListenerSource::VertexPosition => self.vertex_listeners.len(),
            ListenerSource::GraphChange => self.graph_listeners.len(),
            _ => 0,
        }
    }
}

impl DomainModel for InMemoryModel {
    fn add_focus_listener(&self, listener: FocusListener) -> Result<ListenerId, RegistrationError> {
        self.focus_listeners.add(listener)
    }

    fn remove_focus_listener(&self, id: ListenerId) -> Result<(), RegistrationError> {
        self.focus_listeners.remove(id)
    }

    fn add_vertex_position_listener(
        &self,
        listener: VertexPositionListener,
    ) -> Result<ListenerId, RegistrationError> {
        self.vertex_listeners.add(listener)
    }

    fn remove_vertex_position_listener(&self, id: ListenerId) -> Result<(), RegistrationError> {
        self.vertex_listeners.remove(id)
    }

    fn add_graph_change_listener(
        &self,
        listener: GraphChangeListener,
    ) -> Result<ListenerId, RegistrationError> {
        self.graph_listeners.add(listener)
    }

    fn remove_graph_change_listener(&self, id: ListenerId) -> Result<(), RegistrationError> {
        self.graph_listeners.remove(id)
    }
}

#[cfg(test)]
#[path = "tests/memory_tests.rs"]
mod tests;
