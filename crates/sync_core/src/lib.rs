//! Keeps a secondary 3D view in step with the primary viewer.
//!
//! Producer callbacks on the viewer and the data model only mark an
//! [`EventWatcher`] dirty. A [`CoalescingDispatcher`] running on its own
//! thread waits until the event stream has been quiet for a short window and
//! then runs the content and view handlers once each. [`Notifier`] wires the
//! two together and tears everything down when the viewer window closes.

pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod notifier;
pub mod stats;
pub mod watcher;

pub use dispatcher::{CoalescingDispatcher, DispatcherHandle, DispatcherState, SERVICE_NAME};
pub use error::NotifierError;
pub use handlers::{UpdateHandler, UpdateHandlers, VertexHandler};
pub use notifier::{Notifier, NotifierOptions, DEFAULT_QUIESCENCE};
pub use stats::{DispatchStats, StatsSnapshot};
pub use watcher::{EventWatcher, UpdateKind};
