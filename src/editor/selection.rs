use std::collections::HashSet;

use crate::feature::{FeatureCollection, LngLat};
use crate::geometry::{Bounds, feature_bounds};

/// The set of selected (highlighted) feature ids. Order is irrelevant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: HashSet<String>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// The selected id when exactly one feature is selected.
    pub fn sole_id(&self) -> Option<&str> {
        if self.ids.len() == 1 {
            self.ids.iter().next().map(String::as_str)
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Plain-click semantics: clicking the already-sole-selected feature
    /// clears the selection; clicking anything else makes it the sole
    /// selection.
    pub fn toggle_plain(&mut self, id: String) {
        if self.sole_id() == Some(id.as_str()) {
            self.ids.clear();
        } else {
            self.ids.clear();
            self.ids.insert(id);
        }
    }

    /// Modified-click semantics: toggle the one id without disturbing the
    /// rest of the selection.
    pub fn toggle_modified(&mut self, id: String) {
        if !self.ids.remove(&id) {
            self.ids.insert(id);
        }
    }

    pub fn replace_with(&mut self, ids: impl IntoIterator<Item = String>) {
        self.ids = ids.into_iter().collect();
    }

    pub fn extend_with(&mut self, ids: impl IntoIterator<Item = String>) {
        self.ids.extend(ids);
    }

    /// Drop ids that no longer name a feature (after undo/redo, delete,
    /// replace-imports).
    pub fn retain_existing(&mut self, features: &FeatureCollection) {
        self.ids.retain(|id| features.contains_id(id));
    }
}

/// An in-progress rubber-band (box) selection over empty map space.
#[derive(Debug, Clone, Copy)]
pub struct RubberBand {
    origin: LngLat,
    corner: LngLat,
}

impl RubberBand {
    pub fn new(origin: LngLat) -> Self {
        Self {
            origin,
            corner: origin,
        }
    }

    pub fn drag_to(&mut self, corner: LngLat) {
        self.corner = corner;
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_corners(self.origin, self.corner)
    }

    /// Ids of the features whose bounds intersect the band rectangle.
    pub fn features_within(&self, features: &FeatureCollection) -> Vec<String> {
        let bounds = self.bounds();
        features
            .features
            .iter()
            .filter(|f| feature_bounds(f).is_some_and(|b| b.intersects(&bounds)))
            .filter_map(|f| f.id().map(str::to_owned))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::DrawMode;
    use crate::geometry::create_point_feature;
    use crate::id_generator::SequentialSource;

    fn three_points() -> FeatureCollection {
        let mut ids = SequentialSource::new();
        let mut fc = FeatureCollection::new();
        for lng in [0.0, 5.0, 10.0] {
            fc.push(create_point_feature([lng, 0.0], DrawMode::Point, &mut ids));
        }
        fc
    }

    #[test]
    fn plain_toggle_replaces_then_clears() {
        let mut selection = Selection::default();
        selection.toggle_plain("a".to_owned());
        assert_eq!(selection.sole_id(), Some("a"));

        selection.toggle_plain("b".to_owned());
        assert_eq!(selection.sole_id(), Some("b"));

        selection.toggle_plain("b".to_owned());
        assert!(selection.is_empty());
    }

    #[test]
    fn modified_toggle_preserves_others() {
        let mut selection = Selection::default();
        selection.toggle_modified("a".to_owned());
        selection.toggle_modified("b".to_owned());
        assert_eq!(selection.len(), 2);

        selection.toggle_modified("a".to_owned());
        assert_eq!(selection.len(), 1);
        assert!(selection.contains("b"));
    }

    #[test]
    fn band_collects_intersecting_features() {
        let fc = three_points();
        let mut band = RubberBand::new([-1.0, -1.0]);
        band.drag_to([6.0, 1.0]);
        let mut hits = band.features_within(&fc);
        hits.sort();
        assert_eq!(hits, vec!["feature-1", "feature-2"]);
    }

    #[test]
    fn retain_existing_drops_stale_ids() {
        let fc = three_points();
        let mut selection = Selection::default();
        selection.replace_with(["feature-1".to_owned(), "ghost".to_owned()]);
        selection.retain_existing(&fc);
        assert_eq!(selection.sole_id(), Some("feature-1"));
    }
}
