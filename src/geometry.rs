use serde_json::{Map, Value};

use crate::feature::{DrawMode, Feature, FeatureCollection, Geometry, LngLat, PathMode};
use crate::id_generator::IdSource;
use crate::properties::DRAW_MODE_KEY;

/// Close a polygon ring by appending a copy of the first vertex.
///
/// Empty or already-closed input (first == last by exact equality) is
/// returned untouched, same allocation — callers compare against the input
/// to skip redundant updates. Idempotent.
pub fn close_polygon_ring(vertices: Vec<LngLat>) -> Vec<LngLat> {
    match (vertices.first(), vertices.last()) {
        (Some(first), Some(last)) if first != last => {
            let first = *first;
            let mut closed = vertices;
            closed.push(first);
            closed
        }
        _ => vertices,
    }
}

fn mode_properties(mode: DrawMode) -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert(
        DRAW_MODE_KEY.to_owned(),
        Value::String(mode.as_str().to_owned()),
    );
    properties
}

/// Build a Point feature at `coordinate` with a freshly minted id.
pub fn create_point_feature(
    coordinate: LngLat,
    mode: DrawMode,
    ids: &mut dyn IdSource,
) -> Feature {
    let mut feature = Feature::new(
        Geometry::Point {
            coordinates: coordinate,
        },
        mode_properties(mode),
    );
    feature.set_id(ids.next_id());
    feature
}

/// Build a LineString or Polygon feature from accumulated draft vertices.
/// Vertex minimums (2 for line, 3 for polygon) are the caller's job; the
/// polygon ring is closed here.
pub fn create_path_feature(
    vertices: Vec<LngLat>,
    mode: PathMode,
    ids: &mut dyn IdSource,
) -> Feature {
    let geometry = match mode {
        PathMode::Line => Geometry::LineString {
            coordinates: vertices,
        },
        PathMode::Polygon => Geometry::Polygon {
            coordinates: vec![close_polygon_ring(vertices)],
        },
    };
    let mut feature = Feature::new(geometry, mode_properties(mode.draw_mode()));
    feature.set_id(ids.next_id());
    feature
}

/// Build the preview collection shown while a path is still being clicked
/// out. Never committed, so the features carry no ids: one Point per
/// vertex, a LineString once there are two, and for polygon mode with
/// three or more additionally the would-be fill plus a crisp closed
/// outline.
pub fn create_draft_preview(coords: &[LngLat], mode: PathMode) -> FeatureCollection {
    let mut preview = FeatureCollection::new();
    if coords.is_empty() {
        return preview;
    }

    for coordinate in coords {
        preview.push(Feature::new(
            Geometry::Point {
                coordinates: *coordinate,
            },
            Map::new(),
        ));
    }

    if coords.len() >= 2 {
        preview.push(Feature::new(
            Geometry::LineString {
                coordinates: coords.to_vec(),
            },
            Map::new(),
        ));
    }

    if mode == PathMode::Polygon && coords.len() >= 3 {
        let ring = close_polygon_ring(coords.to_vec());
        preview.push(Feature::new(
            Geometry::Polygon {
                coordinates: vec![ring.clone()],
            },
            Map::new(),
        ));
        preview.push(Feature::new(
            Geometry::LineString { coordinates: ring },
            Map::new(),
        ));
    }

    preview
}

fn mean(coords: &[LngLat]) -> Option<LngLat> {
    if coords.is_empty() {
        return None;
    }
    let (sum_lng, sum_lat) = coords
        .iter()
        .fold((0.0, 0.0), |(lng, lat), c| (lng + c[0], lat + c[1]));
    let n = coords.len() as f64;
    Some([sum_lng / n, sum_lat / n])
}

/// A representative center for flying the map to a feature.
///
/// Point: its own coordinate. LineString: unweighted mean of its
/// coordinates. Polygon: unweighted mean of the outer ring's distinct
/// vertices (closing duplicate excluded). This is a centroid of vertices,
/// not an area-weighted centroid, and the exact averaging is contractual.
pub fn feature_center(feature: &Feature) -> Option<LngLat> {
    match feature.geometry.as_ref()? {
        Geometry::Point { coordinates } => Some(*coordinates),
        Geometry::LineString { coordinates } => mean(coordinates),
        Geometry::Polygon { coordinates } => {
            let ring = coordinates.first()?;
            if ring.len() < 2 {
                return None;
            }
            let distinct = if ring.first() == ring.last() {
                &ring[..ring.len() - 1]
            } else {
                &ring[..]
            };
            mean(distinct)
        }
        _ => None,
    }
}

/// Axis-aligned lng/lat bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: LngLat,
    pub max: LngLat,
}

impl Bounds {
    /// Bounds spanning two corners in any orientation.
    pub fn from_corners(a: LngLat, b: LngLat) -> Self {
        Self {
            min: [a[0].min(b[0]), a[1].min(b[1])],
            max: [a[0].max(b[0]), a[1].max(b[1])],
        }
    }

    fn around(point: LngLat) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    fn expand(&mut self, point: LngLat) {
        self.min = [self.min[0].min(point[0]), self.min[1].min(point[1])];
        self.max = [self.max[0].max(point[0]), self.max[1].max(point[1])];
    }

    pub fn contains(&self, point: LngLat) -> bool {
        point[0] >= self.min[0]
            && point[0] <= self.max[0]
            && point[1] >= self.min[1]
            && point[1] <= self.max[1]
    }

    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min[0] <= other.max[0]
            && self.max[0] >= other.min[0]
            && self.min[1] <= other.max[1]
            && self.max[1] >= other.min[1]
    }
}

fn collect_positions<'a>(geometry: &'a Geometry, out: &mut Vec<&'a LngLat>) {
    match geometry {
        Geometry::Point { coordinates } => out.push(coordinates),
        Geometry::LineString { coordinates } | Geometry::MultiPoint { coordinates } => {
            out.extend(coordinates.iter());
        }
        Geometry::Polygon { coordinates } | Geometry::MultiLineString { coordinates } => {
            out.extend(coordinates.iter().flatten());
        }
        Geometry::MultiPolygon { coordinates } => {
            out.extend(coordinates.iter().flatten().flatten());
        }
        Geometry::GeometryCollection { geometries } => {
            for geometry in geometries {
                collect_positions(geometry, out);
            }
        }
    }
}

/// Bounding box over every position of the feature's geometry, or `None`
/// for a null or empty geometry.
pub fn feature_bounds(feature: &Feature) -> Option<Bounds> {
    let mut positions = Vec::new();
    collect_positions(feature.geometry.as_ref()?, &mut positions);
    let mut iter = positions.into_iter();
    let mut bounds = Bounds::around(*iter.next()?);
    for position in iter {
        bounds.expand(*position);
    }
    Some(bounds)
}
