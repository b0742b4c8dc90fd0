//! Boundary to the primary viewer window and the tracking data model.
//!
//! Both collaborators expose one add/remove pair per listener capability. A
//! listener is a plain closure; the synchronization core binds several small
//! closures to one shared watcher instead of implementing one listener
//! interface per capability.

use std::sync::Arc;

use shared::{
    domain::{ListenerId, PropertyChange, SpotId, TimepointIndex, ViewerTransform},
    error::RegistrationError,
};

pub mod memory;
pub mod registry;

pub use memory::{InMemoryModel, InMemoryViewer};
pub use registry::ListenerRegistry;

pub type TransformListener = Arc<dyn Fn(&ViewerTransform) + Send + Sync>;
pub type TimepointListener = Arc<dyn Fn(TimepointIndex) + Send + Sync>;
pub type PropertyChangeListener = Arc<dyn Fn(&PropertyChange) + Send + Sync>;
pub type ColoringListener = Arc<dyn Fn() + Send + Sync>;
pub type FocusListener = Arc<dyn Fn() + Send + Sync>;
pub type VertexPositionListener = Arc<dyn Fn(SpotId) + Send + Sync>;
pub type GraphChangeListener = Arc<dyn Fn() + Send + Sync>;
pub type CloseHook = Arc<dyn Fn() + Send + Sync>;

/// The primary viewer window whose interaction drives the secondary view.
pub trait ViewerWindow: Send + Sync {
    fn add_transform_listener(
        &self,
        listener: TransformListener,
    ) -> Result<ListenerId, RegistrationError>;
    fn remove_transform_listener(&self, id: ListenerId) -> Result<(), RegistrationError>;

    fn add_timepoint_listener(
        &self,
        listener: TimepointListener,
    ) -> Result<ListenerId, RegistrationError>;
    fn remove_timepoint_listener(&self, id: ListenerId) -> Result<(), RegistrationError>;

    fn add_property_change_listener(
        &self,
        listener: PropertyChangeListener,
    ) -> Result<ListenerId, RegistrationError>;
    fn remove_property_change_listener(&self, id: ListenerId) -> Result<(), RegistrationError>;

    fn add_coloring_listener(
        &self,
        listener: ColoringListener,
    ) -> Result<ListenerId, RegistrationError>;
    fn remove_coloring_listener(&self, id: ListenerId) -> Result<(), RegistrationError>;

    /// Registers a hook run when the window is closing.
    fn on_close(&self, hook: CloseHook) -> Result<ListenerId, RegistrationError>;
    fn remove_close_hook(&self, id: ListenerId) -> Result<(), RegistrationError>;

    fn current_timepoint(&self) -> TimepointIndex;
    fn viewer_transform(&self) -> ViewerTransform;
}

/// The tracking data model shared by all views of a project.
pub trait DomainModel: Send + Sync {
    fn add_focus_listener(&self, listener: FocusListener) -> Result<ListenerId, RegistrationError>;
    fn remove_focus_listener(&self, id: ListenerId) -> Result<(), RegistrationError>;

    fn add_vertex_position_listener(
        &self,
        listener: VertexPositionListener,
    ) -> Result<ListenerId, RegistrationError>;
    fn remove_vertex_position_listener(&self, id: ListenerId) -> Result<(), RegistrationError>;

    fn add_graph_change_listener(
        &self,
        listener: GraphChangeListener,
    ) -> Result<ListenerId, RegistrationError>;
    fn remove_graph_change_listener(&self, id: ListenerId) -> Result<(), RegistrationError>;
}
