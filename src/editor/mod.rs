mod draft;
mod selection;
mod vertex;

use std::collections::BTreeMap;

use log::{debug, info};

pub use draft::Draft;
pub use selection::{RubberBand, Selection};
pub use vertex::{
    HANDLE_FEATURE_ID_KEY, HANDLE_VERTEX_INDEX_KEY, VertexDrag, is_editable_path, move_vertex,
    vertex_handles,
};

use crate::codec::{CsvError, encode_features_to_url, parse_csv};
use crate::feature::{DrawMode, Feature, FeatureCollection, LngLat, PathMode};
use crate::geometry::{create_path_feature, create_point_feature};
use crate::history::History;
use crate::id_generator::{IdSource, UuidSource};
use crate::import::{
    ImportError, ImportMode, ensure_unique_ids, features_from_geojson, point_features_from_rows,
};
use crate::input::{HistoryAction, Modifiers, history_shortcut};
use crate::properties::{is_reserved_key, merge_user_properties};
use crate::renderer::MapRenderer;

/// The editor's active tool. Explicit sum type — there is no "null mode".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolMode {
    /// Selecting and editing existing features.
    #[default]
    Idle,
    /// Placing or drawing new features of the given kind.
    Draw(DrawMode),
}

impl ToolMode {
    fn path_mode(self) -> Option<PathMode> {
        match self {
            Self::Draw(DrawMode::Line) => Some(PathMode::Line),
            Self::Draw(DrawMode::Polygon) => Some(PathMode::Polygon),
            _ => None,
        }
    }
}

/// The feature-editing engine: owns the committed collection (behind the
/// undo history), the draw-mode state machine, selection, and any in-flight
/// vertex drag or rubber band, and keeps the renderer's sources in sync.
///
/// All entry points run on the caller's single event loop; every mutation
/// of the collection funnels through the history's `set`, so observed
/// snapshots are immutable and operations are all-or-nothing.
pub struct Editor<R: MapRenderer> {
    renderer: R,
    history: History<FeatureCollection>,
    ids: Box<dyn IdSource>,
    mode: ToolMode,
    draft: Option<Draft>,
    selection: Selection,
    drag: Option<VertexDrag>,
    band: Option<RubberBand>,
    just_dragged: bool,
}

impl<R: MapRenderer> Editor<R> {
    pub fn new(renderer: R) -> Self {
        Self::with_features(renderer, FeatureCollection::new())
    }

    /// Start from an existing collection (e.g. decoded from a share URL).
    /// The collection seeds the history baseline: restoring shared state is
    /// not an undoable edit.
    pub fn with_features(renderer: R, features: FeatureCollection) -> Self {
        let mut editor = Self {
            renderer,
            history: History::new(features),
            ids: Box::new(UuidSource),
            mode: ToolMode::default(),
            draft: None,
            selection: Selection::default(),
            drag: None,
            band: None,
            just_dragged: false,
        };
        editor.sync();
        editor
    }

    /// Swap the id source (deterministic ids in tests).
    pub fn with_id_source(mut self, ids: Box<dyn IdSource>) -> Self {
        self.ids = ids;
        self
    }

    pub fn features(&self) -> &FeatureCollection {
        self.history.current()
    }

    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn draft_vertices(&self) -> &[LngLat] {
        self.draft.as_ref().map_or(&[], Draft::vertices)
    }

    pub fn can_finalize_draft(&self) -> bool {
        self.draft.as_ref().is_some_and(Draft::can_finalize)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Switch tools. Changing mode discards any in-progress draft or drag
    /// and clears the selection.
    pub fn set_mode(&mut self, mode: ToolMode) {
        if self.mode == mode {
            return;
        }
        debug!("tool mode: {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
        self.draft = mode.path_mode().map(Draft::new);
        self.drag = None;
        self.band = None;
        self.selection.clear();
        self.sync();
    }

    /// A map click with world coordinates, already hit-tested against
    /// nothing — the editor asks the renderer which feature (if any) is
    /// under the cursor.
    pub fn click(&mut self, coordinate: LngLat, modifiers: Modifiers) {
        // the mouse-up that ended a vertex drag also arrives as a click
        if self.just_dragged {
            self.just_dragged = false;
            return;
        }

        if let Some(hit) = self.renderer.hit_feature(coordinate) {
            if modifiers.shift {
                self.selection.toggle_modified(hit);
            } else {
                self.selection.toggle_plain(hit);
            }
            self.sync();
            return;
        }

        match self.mode {
            ToolMode::Draw(mode @ (DrawMode::Point | DrawMode::Symbol)) => {
                let feature = create_point_feature(coordinate, mode, self.ids.as_mut());
                self.commit_with(|fc| {
                    let mut next = fc.clone();
                    next.push(feature);
                    next
                });
            }
            ToolMode::Draw(DrawMode::Line | DrawMode::Polygon) => {
                if let Some(draft) = &mut self.draft {
                    draft.push(coordinate);
                }
                self.sync();
            }
            ToolMode::Idle => {
                if !modifiers.shift {
                    self.selection.clear();
                    self.sync();
                }
            }
        }
    }

    /// Commit the draft path once it has enough vertices. A no-op outside
    /// path modes or below the minimum, by contract.
    pub fn finalize_draft(&mut self) {
        if !self.can_finalize_draft() {
            return;
        }
        if let Some(draft) = self.draft.take() {
            let (mode, vertices) = draft.into_parts();
            let feature = create_path_feature(vertices, mode, self.ids.as_mut());
            info!("finalized {} draft as {:?}", mode.draw_mode().as_str(), feature.id());
            self.draft = Some(Draft::new(mode));
            self.commit_with(|fc| {
                let mut next = fc.clone();
                next.push(feature);
                next
            });
        }
    }

    /// Discard the draft vertices without committing anything.
    pub fn clear_draft(&mut self) {
        if let Some(draft) = &mut self.draft {
            draft.clear();
        }
        self.sync();
    }

    /// Pointer press: starts a vertex drag when a handle is under the
    /// cursor, or opens a rubber band over empty space while idle.
    pub fn pointer_down(&mut self, coordinate: LngLat) {
        if let Some((feature_id, vertex_index)) = self.renderer.hit_handle(coordinate) {
            let editable = self
                .editable_feature()
                .filter(|f| f.id() == Some(feature_id.as_str()))
                .cloned();
            if let Some(feature) = editable {
                self.drag = Some(VertexDrag::new(feature, vertex_index));
                return;
            }
        }
        if self.mode == ToolMode::Idle && self.renderer.hit_feature(coordinate).is_none() {
            self.band = Some(RubberBand::new(coordinate));
        }
    }

    /// Pointer movement: feeds an active vertex drag (live preview, no
    /// history commit) or grows the rubber band.
    pub fn pointer_move(&mut self, coordinate: LngLat) {
        if let Some(drag) = &mut self.drag {
            drag.drag_to(coordinate);
            let mut preview = self.history.current().clone();
            preview.replace(drag.working().clone());
            let handles = vertex_handles(drag.working());
            self.renderer.render(&preview);
            self.renderer.render_handles(&handles);
            return;
        }
        if let Some(band) = &mut self.band {
            band.drag_to(coordinate);
        }
    }

    /// Pointer release: commits a moved vertex drag, or resolves the rubber
    /// band into a selection (replace, or union with the modifier).
    pub fn pointer_up(&mut self, coordinate: LngLat, modifiers: Modifiers) {
        if let Some(drag) = self.drag.take() {
            self.just_dragged = true;
            if drag.has_moved() {
                let working = drag.into_working();
                debug!("vertex drag committed on {:?}", working.id());
                self.commit_with(|fc| {
                    let mut next = fc.clone();
                    next.replace(working.clone());
                    next
                });
            } else {
                self.sync();
            }
            return;
        }

        if let Some(mut band) = self.band.take() {
            band.drag_to(coordinate);
            let hits = band.features_within(self.history.current());
            if modifiers.shift {
                self.selection.extend_with(hits);
            } else {
                self.selection.replace_with(hits);
            }
            self.sync();
        }
    }

    pub fn undo(&mut self) -> bool {
        let stepped = self.history.undo();
        if stepped {
            self.after_history_step();
        }
        stepped
    }

    pub fn redo(&mut self) -> bool {
        let stepped = self.history.redo();
        if stepped {
            self.after_history_step();
        }
        stepped
    }

    /// Route a keyboard event through the undo/redo chords.
    pub fn handle_key(&mut self, key: &str, modifiers: Modifiers, in_text_input: bool) -> bool {
        match history_shortcut(key, modifiers, in_text_input) {
            Some(HistoryAction::Undo) => self.undo(),
            Some(HistoryAction::Redo) => self.redo(),
            None => false,
        }
    }

    /// Delete every selected feature in one history step.
    pub fn delete_selected(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        let ids: Vec<String> = self.selection.ids().map(str::to_owned).collect();
        info!("deleting {} selected feature(s)", ids.len());
        self.selection.clear();
        self.commit_with(|fc| {
            let mut next = fc.clone();
            next.remove_ids(&ids);
            next
        });
    }

    /// Replace a feature's user properties. Reserved keys in the input are
    /// discarded before merging, so bookkeeping keys cannot be clobbered
    /// through this path. Returns false when no feature has that id.
    pub fn update_feature_properties(
        &mut self,
        id: &str,
        user: &BTreeMap<String, String>,
    ) -> bool {
        let Some(feature) = self.history.current().find(id) else {
            return false;
        };
        let sanitized: BTreeMap<String, String> = user
            .iter()
            .filter(|(key, _)| !is_reserved_key(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        let mut updated = feature.clone();
        updated.properties = merge_user_properties(&feature.properties, &sanitized);
        self.commit_with(|fc| {
            let mut next = fc.clone();
            next.replace(updated.clone());
            next
        });
        true
    }

    /// Wipe the collection (undoable) and all transient state.
    pub fn reset(&mut self) {
        self.selection.clear();
        self.drag = None;
        self.band = None;
        if let Some(draft) = &mut self.draft {
            draft.clear();
        }
        self.commit_with(|_| FeatureCollection::new());
    }

    /// Import CSV point rows as one history step. Returns how many points
    /// were added.
    pub fn import_csv(&mut self, text: &str) -> Result<usize, CsvError> {
        let rows = parse_csv(text)?;
        let features = point_features_from_rows(rows, self.ids.as_mut());
        let count = features.len();
        info!("importing {count} CSV point(s)");
        self.commit_with(|fc| {
            let mut next = fc.clone();
            next.features.extend(features.iter().cloned());
            next
        });
        Ok(count)
    }

    /// Import GeoJSON text, either replacing the collection or appending to
    /// it — a single history step either way. Payload ids colliding with the
    /// target collection (or repeated within the payload) are re-minted so
    /// the commit never holds duplicate ids. Returns how many features were
    /// imported.
    pub fn import_geojson(&mut self, text: &str, mode: ImportMode) -> Result<usize, ImportError> {
        let mut features = features_from_geojson(text, self.ids.as_mut())?;
        let count = features.len();
        info!("importing {count} GeoJSON feature(s) ({mode:?})");
        match mode {
            ImportMode::Replace => {
                ensure_unique_ids(&mut features, &FeatureCollection::new(), self.ids.as_mut());
                self.selection.clear();
                self.commit_with(|_| FeatureCollection::from_features(features));
            }
            ImportMode::Merge => {
                ensure_unique_ids(&mut features, self.history.current(), self.ids.as_mut());
                self.commit_with(|fc| {
                    let mut next = fc.clone();
                    next.features.extend(features);
                    next
                });
            }
        }
        Ok(count)
    }

    /// The shareable URL for the current collection.
    pub fn share_url(&self, base_url: &str) -> String {
        encode_features_to_url(base_url, self.history.current())
    }

    fn commit_with(&mut self, f: impl FnOnce(&FeatureCollection) -> FeatureCollection) {
        self.history.set_with(f);
        self.selection.retain_existing(self.history.current());
        self.sync();
    }

    fn after_history_step(&mut self) {
        self.drag = None;
        self.selection.retain_existing(self.history.current());
        self.sync();
    }

    /// The selected feature when exactly one is selected and it can carry
    /// vertex handles.
    fn editable_feature(&self) -> Option<&Feature> {
        let id = self.selection.sole_id()?;
        self.history
            .current()
            .find(id)
            .filter(|f| is_editable_path(f))
    }

    fn sync(&mut self) {
        let handles = self
            .editable_feature()
            .map(vertex_handles)
            .unwrap_or_default();
        let preview = self
            .draft
            .as_ref()
            .map(Draft::preview)
            .unwrap_or_default();
        self.renderer.render(self.history.current());
        self.renderer.render_draft(&preview);
        self.renderer.render_handles(&handles);
    }
}
