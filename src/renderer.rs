use crate::feature::{FeatureCollection, LngLat};

/// The surface the editor draws to and hit-tests against. Implementations
/// wrap an actual vector map (layers, styling, screen-space picking); the
/// editor only pushes collections out and consumes hit answers, so it runs
/// headless against a fake.
pub trait MapRenderer {
    /// Replace the committed-features source.
    fn render(&mut self, features: &FeatureCollection);

    /// Replace the draft-preview source (empty collection clears it).
    fn render_draft(&mut self, preview: &FeatureCollection);

    /// Replace the vertex-handle source (empty collection clears it).
    fn render_handles(&mut self, handles: &FeatureCollection);

    /// Id of the committed feature rendered under `point`, if any.
    fn hit_feature(&self, point: LngLat) -> Option<String>;

    /// Vertex handle under `point`: owning feature id and vertex index.
    fn hit_handle(&self, point: LngLat) -> Option<(String, usize)>;
}

/// Renderer that draws nothing and hits nothing.
#[derive(Debug, Default)]
pub struct NoopRenderer;

impl MapRenderer for NoopRenderer {
    fn render(&mut self, _features: &FeatureCollection) {}

    fn render_draft(&mut self, _preview: &FeatureCollection) {}

    fn render_handles(&mut self, _handles: &FeatureCollection) {}

    fn hit_feature(&self, _point: LngLat) -> Option<String> {
        None
    }

    fn hit_handle(&self, _point: LngLat) -> Option<(String, usize)> {
        None
    }
}
