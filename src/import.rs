use std::collections::HashSet;

use serde_json::Value;
use thiserror::Error;

use crate::codec::CsvRow;
use crate::feature::{DrawMode, Feature, FeatureCollection};
use crate::id_generator::IdSource;
use crate::properties::is_reserved_key;

/// What to do with the existing collection when importing GeoJSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Discard the current collection; the import becomes the new baseline.
    Replace,
    /// Append the imported features to the current collection.
    Merge,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid GeoJSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("expected a FeatureCollection, a Feature, or an array of Features")]
    UnsupportedShape,
}

/// Parse pasted/loaded GeoJSON text into features. Accepts a
/// `FeatureCollection`, a bare `Feature`, or a JSON array of features.
/// Features arriving without an `_id` get a fresh one so selection and
/// vertex editing work uniformly afterwards.
pub fn features_from_geojson(
    text: &str,
    ids: &mut dyn IdSource,
) -> Result<Vec<Feature>, ImportError> {
    let parsed: Value = serde_json::from_str(text)?;
    let mut features: Vec<Feature> = match &parsed {
        Value::Object(object) => match object.get("type").and_then(Value::as_str) {
            Some("FeatureCollection") if object.get("features").is_some_and(Value::is_array) => {
                serde_json::from_value(object["features"].clone())?
            }
            Some("Feature") => vec![serde_json::from_value(parsed.clone())?],
            _ => return Err(ImportError::UnsupportedShape),
        },
        Value::Array(_) => serde_json::from_value(parsed)?,
        _ => return Err(ImportError::UnsupportedShape),
    };

    for feature in &mut features {
        if feature.id().is_none() {
            feature.set_id(ids.next_id());
        }
    }
    Ok(features)
}

/// Re-mint any imported id that would collide — with `existing`, or with an
/// earlier feature in the same batch. Payload ids are kept only while they
/// stay unique, so committing the result cannot produce duplicate ids.
pub fn ensure_unique_ids(
    features: &mut [Feature],
    existing: &FeatureCollection,
    ids: &mut dyn IdSource,
) {
    let mut seen: HashSet<String> = existing
        .features
        .iter()
        .filter_map(|f| f.id().map(str::to_owned))
        .collect();
    for feature in features {
        let taken = match feature.id() {
            Some(id) => seen.contains(id),
            None => true,
        };
        if taken {
            let mut minted = ids.next_id();
            while seen.contains(&minted) {
                minted = ids.next_id();
            }
            feature.set_id(minted);
        }
        if let Some(id) = feature.id() {
            seen.insert(id.to_owned());
        }
    }
}

/// Turn parsed CSV rows into committed-shape Point features tagged with
/// the `point` draw mode, their remaining columns as string properties.
/// Reserved columns (`_id`, `drawMode`) are dropped — a spreadsheet cell
/// cannot override the minted bookkeeping.
pub fn point_features_from_rows(rows: Vec<CsvRow>, ids: &mut dyn IdSource) -> Vec<Feature> {
    rows.into_iter()
        .map(|row| {
            let mut feature = crate::geometry::create_point_feature(
                [row.lng, row.lat],
                DrawMode::Point,
                ids,
            );
            for (key, value) in row.properties {
                if is_reserved_key(&key) {
                    continue;
                }
                feature.properties.insert(key, Value::String(value));
            }
            feature
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::parse_csv;
    use crate::feature::Geometry;
    use crate::id_generator::SequentialSource;

    #[test]
    fn accepts_collection_feature_and_array() {
        let mut ids = SequentialSource::new();
        let collection = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","geometry":{"type":"Point","coordinates":[1.0,2.0]},"properties":{}}
        ]}"#;
        assert_eq!(features_from_geojson(collection, &mut ids).unwrap().len(), 1);

        let bare = r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[1.0,2.0]},"properties":null}"#;
        assert_eq!(features_from_geojson(bare, &mut ids).unwrap().len(), 1);

        let array = format!("[{bare},{bare}]");
        assert_eq!(features_from_geojson(&array, &mut ids).unwrap().len(), 2);
    }

    #[test]
    fn backfills_missing_ids_only() {
        let mut ids = SequentialSource::new();
        let text = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","geometry":null,"properties":{"_id":"keep-me"}},
            {"type":"Feature","geometry":null,"properties":{}}
        ]}"#;
        let features = features_from_geojson(text, &mut ids).unwrap();
        assert_eq!(features[0].id(), Some("keep-me"));
        assert_eq!(features[1].id(), Some("feature-1"));
    }

    #[test]
    fn rejects_non_geojson_shapes() {
        let mut ids = SequentialSource::new();
        assert!(matches!(
            features_from_geojson(r#"{"type":"Point","coordinates":[0,0]}"#, &mut ids),
            Err(ImportError::UnsupportedShape)
        ));
        assert!(matches!(
            features_from_geojson("42", &mut ids),
            Err(ImportError::UnsupportedShape)
        ));
        assert!(matches!(
            features_from_geojson("not json", &mut ids),
            Err(ImportError::InvalidJson(_))
        ));
    }

    #[test]
    fn colliding_imported_ids_are_reminted() {
        let mut ids = SequentialSource::new();
        let mut existing = FeatureCollection::new();
        let mut held = Feature::new(
            Geometry::Point {
                coordinates: [0.0, 0.0],
            },
            serde_json::Map::new(),
        );
        held.set_id("taken");
        existing.push(held);

        let payload = r#"[
            {"type":"Feature","geometry":null,"properties":{"_id":"taken"}},
            {"type":"Feature","geometry":null,"properties":{"_id":"fresh"}},
            {"type":"Feature","geometry":null,"properties":{"_id":"fresh"}}
        ]"#;
        let mut features = features_from_geojson(payload, &mut ids).unwrap();
        ensure_unique_ids(&mut features, &existing, &mut ids);

        assert_eq!(features[0].id(), Some("feature-1"));
        assert_eq!(features[1].id(), Some("fresh"));
        // second "fresh" collides within the batch itself
        assert_eq!(features[2].id(), Some("feature-2"));
    }

    #[test]
    fn reserved_csv_columns_never_override_minted_bookkeeping() {
        let mut ids = SequentialSource::new();
        let rows =
            parse_csv("lat,lng,_id,drawMode,name\n1.0,2.0,same,polygon,a\n3.0,4.0,same,polygon,b")
                .unwrap();
        let features = point_features_from_rows(rows, &mut ids);
        assert_eq!(features[0].id(), Some("feature-1"));
        assert_eq!(features[1].id(), Some("feature-2"));
        assert_eq!(features[0].draw_mode(), Some(DrawMode::Point));
        assert_eq!(
            features[0].properties.get("name"),
            Some(&Value::String("a".to_owned()))
        );
    }

    #[test]
    fn csv_rows_become_point_features() {
        let mut ids = SequentialSource::new();
        let rows = parse_csv("lat,lng,name\n35.681,139.767,tokyo").unwrap();
        let features = point_features_from_rows(rows, &mut ids);
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].draw_mode(), Some(DrawMode::Point));
        assert_eq!(
            features[0].geometry,
            Some(Geometry::Point {
                coordinates: [139.767, 35.681]
            })
        );
        assert_eq!(
            features[0].properties.get("name"),
            Some(&Value::String("tokyo".to_owned()))
        );
    }
}
