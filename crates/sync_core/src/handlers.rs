//! Callbacks run by the dispatcher when an update is due.

use shared::domain::SpotId;

pub type UpdateHandler = Box<dyn FnMut() -> anyhow::Result<()> + Send>;
pub type VertexHandler = Box<dyn FnMut(Option<SpotId>) -> anyhow::Result<()> + Send>;

pub struct UpdateHandlers {
    pub(crate) content: UpdateHandler,
    pub(crate) view: UpdateHandler,
    pub(crate) vertex: Option<VertexHandler>,
}

impl UpdateHandlers {
    /// `content` rebuilds the scene for the current timepoint and coloring,
    /// `view` moves the camera to match the primary viewer.
    pub fn new<C, V>(content: C, view: V) -> Self
    where
        C: FnMut() -> anyhow::Result<()> + Send + 'static,
        V: FnMut() -> anyhow::Result<()> + Send + 'static,
    {
        Self {
            content: Box::new(content),
            view: Box::new(view),
            vertex: None,
        }
    }

    /// Routes vertex-position events to `vertex` instead of a content rebuild.
    pub fn with_vertex_handler<F>(mut self, vertex: F) -> Self
    where
        F: FnMut(Option<SpotId>) -> anyhow::Result<()> + Send + 'static,
    {
        self.vertex = Some(Box::new(vertex));
        self
    }

    pub fn handles_vertex_moves(&self) -> bool {
        self.vertex.is_some()
    }
}
