use crate::feature::{FeatureCollection, LngLat, PathMode};
use crate::geometry::create_draft_preview;

/// The in-progress vertex path for a line or polygon. Transient: never part
/// of the committed collection, discarded on mode change or finalize.
#[derive(Debug, Clone)]
pub struct Draft {
    mode: PathMode,
    vertices: Vec<LngLat>,
}

impl Draft {
    pub fn new(mode: PathMode) -> Self {
        Self {
            mode,
            vertices: Vec::new(),
        }
    }

    pub fn mode(&self) -> PathMode {
        self.mode
    }

    pub fn vertices(&self) -> &[LngLat] {
        &self.vertices
    }

    pub fn push(&mut self, coordinate: LngLat) {
        self.vertices.push(coordinate);
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    /// Whether the path has reached the mode's vertex minimum.
    pub fn can_finalize(&self) -> bool {
        self.vertices.len() >= self.mode.min_vertices()
    }

    /// The preview collection shown while clicking the path out.
    pub fn preview(&self) -> FeatureCollection {
        create_draft_preview(&self.vertices, self.mode)
    }

    pub fn into_parts(self) -> (PathMode, Vec<LngLat>) {
        (self.mode, self.vertices)
    }
}
