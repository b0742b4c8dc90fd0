use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident, $inner:ty) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub $inner);
    };
}

id_newtype!(SpotId, i64);
id_newtype!(TimepointIndex, i64);
id_newtype!(ListenerId, u64);

/// Producer registries a watcher can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListenerSource {
    RenderTransform,
    Timepoint,
    ViewerProperty,
    Coloring,
    Focus,
    VertexPosition,
    GraphChange,
    WindowClose,
}

impl ListenerSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RenderTransform => "render_transform",
            Self::Timepoint => "timepoint",
            Self::ViewerProperty => "viewer_property",
            Self::Coloring => "coloring",
            Self::Focus => "focus",
            Self::VertexPosition => "vertex_position",
            Self::GraphChange => "graph_change",
            Self::WindowClose => "window_close",
        }
    }
}

impl fmt::Display for ListenerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row-major 3x4 affine transform of the primary viewer (rotation/scale + translation).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewerTransform(pub [f64; 12]);

impl ViewerTransform {
    pub const IDENTITY: Self = Self([
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0,
    ]);

    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        let mut m = Self::IDENTITY.0;
        m[3] = x;
        m[7] = y;
        m[11] = z;
        Self(m)
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.0[row * 4 + col]
    }
}

impl Default for ViewerTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyChange {
    pub name: String,
}

impl PropertyChange {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
