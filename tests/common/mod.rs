use geosketch::editor::{HANDLE_FEATURE_ID_KEY, HANDLE_VERTEX_INDEX_KEY};
use geosketch::geometry::feature_bounds;
use geosketch::{Editor, FeatureCollection, Geometry, LngLat, MapRenderer, SequentialSource};

/// Headless stand-in for the map: remembers the last collection pushed to
/// each source and answers hit tests from that remembered state, the way
/// `queryRenderedFeatures` answers from what is on screen.
#[derive(Debug, Default)]
pub struct FakeRenderer {
    pub features: FeatureCollection,
    pub draft: FeatureCollection,
    pub handles: FeatureCollection,
}

impl MapRenderer for FakeRenderer {
    fn render(&mut self, features: &FeatureCollection) {
        self.features = features.clone();
    }

    fn render_draft(&mut self, preview: &FeatureCollection) {
        self.draft = preview.clone();
    }

    fn render_handles(&mut self, handles: &FeatureCollection) {
        self.handles = handles.clone();
    }

    fn hit_feature(&self, point: LngLat) -> Option<String> {
        self.features
            .features
            .iter()
            .find(|f| feature_bounds(f).is_some_and(|b| b.contains(point)))
            .and_then(|f| f.id())
            .map(str::to_owned)
    }

    fn hit_handle(&self, point: LngLat) -> Option<(String, usize)> {
        let handle = self.handles.features.iter().find(|f| {
            matches!(f.geometry, Some(Geometry::Point { coordinates }) if coordinates == point)
        })?;
        let feature_id = handle
            .properties
            .get(HANDLE_FEATURE_ID_KEY)?
            .as_str()?
            .to_owned();
        let vertex_index = handle.properties.get(HANDLE_VERTEX_INDEX_KEY)?.as_u64()? as usize;
        Some((feature_id, vertex_index))
    }
}

/// A fresh editor over the fake renderer with deterministic ids
/// (`feature-1`, `feature-2`, ...). Run tests with `RUST_LOG=debug` to see
/// the editor's log output.
pub fn test_editor() -> Editor<FakeRenderer> {
    let _ = env_logger::builder().is_test(true).try_init();
    Editor::new(FakeRenderer::default()).with_id_source(Box::new(SequentialSource::new()))
}
