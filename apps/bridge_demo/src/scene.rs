//! The secondary view kept in step with the primary viewer.

use serde::Serialize;
use shared::domain::{SpotId, TimepointIndex, ViewerTransform};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SceneMirror {
    pub timepoint: Option<TimepointIndex>,
    pub spot_count: usize,
    pub focused: Option<SpotId>,
    pub camera: ViewerTransform,
    pub rebuilds: u64,
    pub camera_moves: u64,
    pub repositioned: Vec<SpotId>,
}

impl SceneMirror {
    pub fn rebuild(&mut self, timepoint: TimepointIndex, spot_count: usize, focused: Option<SpotId>) {
        self.timepoint = Some(timepoint);
        self.spot_count = spot_count;
        self.focused = focused;
        self.rebuilds += 1;
        self.repositioned.clear();
    }

    pub fn move_camera(&mut self, camera: ViewerTransform) {
        self.camera = camera;
        self.camera_moves += 1;
    }

    /// Returns false when the move carried no spot.
    pub fn reposition(&mut self, spot: Option<SpotId>) -> bool {
        match spot {
            Some(spot) => {
                if !self.repositioned.contains(&spot) {
                    self.repositioned.push(spot);
                }
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
#[path = "tests/scene_tests.rs"]
mod tests;
