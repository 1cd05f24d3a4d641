use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::properties::{DRAW_MODE_KEY, ID_KEY};

/// A GeoJSON position in `[longitude, latitude]` order.
pub type LngLat = [f64; 2];

/// GeoJSON geometry. The editor only ever produces `Point`, `LineString`
/// and `Polygon`; the remaining variants exist so imported collections
/// survive a round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: LngLat },
    LineString { coordinates: Vec<LngLat> },
    Polygon { coordinates: Vec<Vec<LngLat>> },
    MultiPoint { coordinates: Vec<LngLat> },
    MultiLineString { coordinates: Vec<Vec<LngLat>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<LngLat>>> },
    GeometryCollection { geometries: Vec<Geometry> },
}

/// The draw mode a feature was created with. Stored as a string property
/// (`drawMode`) so serialized output stays plain GeoJSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawMode {
    Point,
    Line,
    Polygon,
    Symbol,
}

impl DrawMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Line => "line",
            Self::Polygon => "polygon",
            Self::Symbol => "symbol",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "point" => Some(Self::Point),
            "line" => Some(Self::Line),
            "polygon" => Some(Self::Polygon),
            "symbol" => Some(Self::Symbol),
            _ => None,
        }
    }
}

/// The subset of draw modes that accumulate a draft vertex path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathMode {
    Line,
    Polygon,
}

impl PathMode {
    /// Minimum number of draft vertices before the path can be finalized.
    pub fn min_vertices(self) -> usize {
        match self {
            Self::Line => 2,
            Self::Polygon => 3,
        }
    }

    pub fn draw_mode(self) -> DrawMode {
        match self {
            Self::Line => DrawMode::Line,
            Self::Polygon => DrawMode::Polygon,
        }
    }
}

/// A single GeoJSON feature. The feature id lives in `properties["_id"]`
/// and the originating draw mode in `properties["drawMode"]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default = "feature_tag")]
    tag: String,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default, deserialize_with = "null_as_empty_map")]
    pub properties: Map<String, Value>,
}

fn feature_tag() -> String {
    "Feature".to_owned()
}

fn null_as_empty_map<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    // GeoJSON allows `"properties": null`
    let map = Option::<Map<String, Value>>::deserialize(deserializer)?;
    Ok(map.unwrap_or_default())
}

impl Feature {
    pub fn new(geometry: Geometry, properties: Map<String, Value>) -> Self {
        Self {
            tag: feature_tag(),
            geometry: Some(geometry),
            properties,
        }
    }

    /// The feature's stable id, if it has been assigned one.
    pub fn id(&self) -> Option<&str> {
        self.properties.get(ID_KEY).and_then(Value::as_str)
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.properties
            .insert(ID_KEY.to_owned(), Value::String(id.into()));
    }

    /// The draw mode recorded at creation, if any.
    pub fn draw_mode(&self) -> Option<DrawMode> {
        self.properties
            .get(DRAW_MODE_KEY)
            .and_then(Value::as_str)
            .and_then(DrawMode::parse)
    }

    pub fn with_geometry(&self, geometry: Geometry) -> Self {
        Self {
            tag: self.tag.clone(),
            geometry: Some(geometry),
            properties: self.properties.clone(),
        }
    }
}

/// An ordered GeoJSON feature collection. Order is display order:
/// append-only except for deletion by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type", default = "collection_tag")]
    tag: String,
    #[serde(default)]
    pub features: Vec<Feature>,
}

fn collection_tag() -> String {
    "FeatureCollection".to_owned()
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self {
            tag: collection_tag(),
            features: Vec::new(),
        }
    }

    pub fn from_features(features: Vec<Feature>) -> Self {
        Self {
            tag: collection_tag(),
            features,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn find(&self, id: &str) -> Option<&Feature> {
        self.features.iter().find(|f| f.id() == Some(id))
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Replace the feature with the same id, preserving its position.
    /// Returns false if no feature carries that id.
    pub fn replace(&mut self, feature: Feature) -> bool {
        let Some(id) = feature.id().map(str::to_owned) else {
            return false;
        };
        match self.features.iter_mut().find(|f| f.id() == Some(&id)) {
            Some(slot) => {
                *slot = feature;
                true
            }
            None => false,
        }
    }

    /// Remove every feature whose id appears in `ids`.
    pub fn remove_ids(&mut self, ids: &[String]) {
        self.features
            .retain(|f| f.id().is_none_or(|id| !ids.iter().any(|x| x == id)));
    }
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::new()
    }
}
