use serde_json::{Map, Value};

use crate::feature::{Feature, FeatureCollection, Geometry, LngLat};

/// Handle property naming the owning feature.
pub const HANDLE_FEATURE_ID_KEY: &str = "featureId";
/// Handle property carrying the vertex index.
pub const HANDLE_VERTEX_INDEX_KEY: &str = "vertexIndex";

fn handle_feature(feature_id: &str, index: usize, coordinate: LngLat) -> Feature {
    let mut properties = Map::new();
    properties.insert(
        HANDLE_FEATURE_ID_KEY.to_owned(),
        Value::String(feature_id.to_owned()),
    );
    properties.insert(HANDLE_VERTEX_INDEX_KEY.to_owned(), Value::from(index));
    Feature::new(
        Geometry::Point {
            coordinates: coordinate,
        },
        properties,
    )
}

/// True when the feature carries one of the geometry kinds the editor can
/// hang vertex handles on.
pub fn is_editable_path(feature: &Feature) -> bool {
    matches!(
        feature.geometry,
        Some(Geometry::LineString { .. }) | Some(Geometry::Polygon { .. })
    )
}

/// One draggable Point per coordinate of the selected line or polygon,
/// tagged with the owning feature id and vertex index. A polygon's
/// duplicated closing coordinate gets no handle of its own — dragging
/// handle 0 moves it in lockstep. Other geometry kinds yield an empty
/// collection.
pub fn vertex_handles(feature: &Feature) -> FeatureCollection {
    let mut handles = FeatureCollection::new();
    let Some(feature_id) = feature.id() else {
        return handles;
    };
    match &feature.geometry {
        Some(Geometry::LineString { coordinates }) => {
            for (index, coordinate) in coordinates.iter().enumerate() {
                handles.push(handle_feature(feature_id, index, *coordinate));
            }
        }
        Some(Geometry::Polygon { coordinates }) => {
            if let Some(ring) = coordinates.first() {
                let distinct = &ring[..ring.len().saturating_sub(1)];
                for (index, coordinate) in distinct.iter().enumerate() {
                    handles.push(handle_feature(feature_id, index, *coordinate));
                }
            }
        }
        _ => {}
    }
    handles
}

/// A copy of `feature` with one vertex moved. Pure. Moving a polygon's
/// vertex 0 also moves the closing coordinate so the ring stays closed.
/// Features without a matching vertex come back unchanged.
pub fn move_vertex(feature: &Feature, vertex_index: usize, coordinate: LngLat) -> Feature {
    match &feature.geometry {
        Some(Geometry::LineString { coordinates }) => {
            let mut moved = coordinates.clone();
            if let Some(slot) = moved.get_mut(vertex_index) {
                *slot = coordinate;
            }
            feature.with_geometry(Geometry::LineString { coordinates: moved })
        }
        Some(Geometry::Polygon { coordinates }) => {
            let mut rings = coordinates.clone();
            if let Some(ring) = rings.first_mut() {
                let last = ring.len().saturating_sub(1);
                if let Some(slot) = ring.get_mut(vertex_index) {
                    *slot = coordinate;
                }
                if vertex_index == 0 && last > 0 {
                    ring[last] = coordinate;
                }
            }
            feature.with_geometry(Geometry::Polygon { coordinates: rings })
        }
        _ => feature.clone(),
    }
}

/// An in-flight vertex drag holding a working copy of the feature. The
/// working copy alone absorbs pointer movement; history sees nothing until
/// the drag commits on release.
#[derive(Debug, Clone)]
pub struct VertexDrag {
    working: Feature,
    vertex_index: usize,
    has_moved: bool,
}

impl VertexDrag {
    pub fn new(feature: Feature, vertex_index: usize) -> Self {
        Self {
            working: feature,
            vertex_index,
            has_moved: false,
        }
    }

    pub fn working(&self) -> &Feature {
        &self.working
    }

    pub fn has_moved(&self) -> bool {
        self.has_moved
    }

    pub fn drag_to(&mut self, coordinate: LngLat) {
        self.working = move_vertex(&self.working, self.vertex_index, coordinate);
        self.has_moved = true;
    }

    pub fn into_working(self) -> Feature {
        self.working
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{DrawMode, PathMode};
    use crate::geometry::{create_path_feature, create_point_feature};
    use crate::id_generator::SequentialSource;

    fn square() -> Feature {
        let mut ids = SequentialSource::new();
        create_path_feature(
            vec![[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0]],
            PathMode::Polygon,
            &mut ids,
        )
    }

    #[test]
    fn polygon_handles_skip_closing_coordinate() {
        let handles = vertex_handles(&square());
        assert_eq!(handles.len(), 4);
        let first = &handles.features[0];
        assert_eq!(
            first.properties.get(HANDLE_FEATURE_ID_KEY),
            Some(&Value::String("feature-1".to_owned()))
        );
        assert_eq!(
            first.properties.get(HANDLE_VERTEX_INDEX_KEY),
            Some(&Value::from(0))
        );
    }

    #[test]
    fn line_handles_cover_every_vertex() {
        let mut ids = SequentialSource::new();
        let line = create_path_feature(
            vec![[0.0, 0.0], [1.0, 1.0], [2.0, 0.0]],
            PathMode::Line,
            &mut ids,
        );
        assert_eq!(vertex_handles(&line).len(), 3);
    }

    #[test]
    fn point_features_have_no_handles() {
        let mut ids = SequentialSource::new();
        let point = create_point_feature([0.0, 0.0], DrawMode::Point, &mut ids);
        assert!(vertex_handles(&point).is_empty());
    }

    #[test]
    fn moving_vertex_zero_keeps_ring_closed() {
        let moved = move_vertex(&square(), 0, [-1.0, -1.0]);
        match moved.geometry {
            Some(Geometry::Polygon { ref coordinates }) => {
                let ring = &coordinates[0];
                assert_eq!(ring[0], [-1.0, -1.0]);
                assert_eq!(ring.last(), Some(&[-1.0, -1.0]));
                assert_eq!(ring.len(), 5);
            }
            other => panic!("expected polygon, got {other:?}"),
        }
    }

    #[test]
    fn moving_interior_vertex_leaves_endpoints_alone() {
        let moved = move_vertex(&square(), 2, [9.0, 9.0]);
        match moved.geometry {
            Some(Geometry::Polygon { ref coordinates }) => {
                let ring = &coordinates[0];
                assert_eq!(ring[2], [9.0, 9.0]);
                assert_eq!(ring[0], [0.0, 0.0]);
                assert_eq!(ring.first(), ring.last());
            }
            other => panic!("expected polygon, got {other:?}"),
        }
    }

    #[test]
    fn drag_tracks_movement_in_working_copy_only() {
        let original = square();
        let mut drag = VertexDrag::new(original.clone(), 1);
        assert!(!drag.has_moved());

        drag.drag_to([5.0, 5.0]);
        assert!(drag.has_moved());
        assert_ne!(drag.working(), &original);
        // id and properties ride along untouched
        assert_eq!(drag.working().id(), original.id());
    }
}
