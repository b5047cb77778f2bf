//! Composition engine: placement, z-order, transforms, and selection.
//!
//! Every mutating call returns the [`Action`] describing what changed so the
//! host can re-render incrementally. `place` returns the new placement id
//! instead; the host reads the placement back through [`Engine::placement`].
//!
//! Selection is the only mode: `None` or one placement id that is always
//! present in the store.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use uuid::Uuid;

use crate::consts::{
    BASELINE_Z, CLOTHING_SCALE, DEFAULT_OFFSET, MAX_SCALE, MIN_PLACEMENT_Z, MIN_SCALE, STICKER_SCALE,
};
use crate::doc::{PartialPlacement, PlacedItem, PlacementId, PlacementKind, PlacementStore, Sprite, Transform};
use crate::input::{Gesture, Point};
use crate::scene::SceneId;

/// Changes reported back to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    None,
    Updated { id: PlacementId, fields: PartialPlacement },
    Removed { id: PlacementId },
    Cleared,
    SelectionChanged(Option<PlacementId>),
    SceneChanged(SceneId),
    DressUpChanged(bool),
}

/// View-level state that is not part of any placement.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// The currently selected placement, if any.
    pub selected_id: Option<PlacementId>,
    /// Active background scene.
    pub scene: SceneId,
    /// Mannequin silhouette shown beneath placements.
    pub dress_up: bool,
}

/// Canvas composition engine. Process-local, never persisted.
#[derive(Debug, Default)]
pub struct Engine {
    pub doc: PlacementStore,
    pub ui: UiState,
    pub gesture: Gesture,
}

impl Engine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Placement ---

    /// Put a sprite on the canvas and select it.
    ///
    /// New placements all start at the default anchor; the z-index is the
    /// current placement count plus the baseline.
    pub fn place(&mut self, sprite: Sprite) -> PlacementId {
        let scale = match sprite.kind() {
            PlacementKind::Clothing => CLOTHING_SCALE,
            PlacementKind::Sticker => STICKER_SCALE,
        };
        let count = i64::try_from(self.doc.len()).unwrap_or(i64::MAX - BASELINE_Z);
        let item = PlacedItem {
            placement_id: Uuid::new_v4(),
            sprite,
            transform: Transform {
                x: DEFAULT_OFFSET.0,
                y: DEFAULT_OFFSET.1,
                rotation_degrees: 0.0,
                scale,
                flipped_horizontally: false,
            },
            z_index: count + BASELINE_Z,
        };
        let id = item.placement_id;
        self.doc.insert(item);
        self.ui.selected_id = Some(id);
        id
    }

    /// Remove a placement. Unknown ids are a no-op.
    pub fn remove(&mut self, id: &PlacementId) -> Action {
        if self.doc.remove(id).is_none() {
            return Action::None;
        }
        if self.ui.selected_id.as_ref() == Some(id) {
            self.ui.selected_id = None;
        }
        if self.gesture.dragging().as_ref() == Some(id) {
            self.gesture = Gesture::Idle;
        }
        Action::Removed { id: *id }
    }

    /// Remove every placement and clear the selection.
    pub fn clear_all(&mut self) -> Action {
        self.doc.clear();
        self.ui.selected_id = None;
        self.gesture = Gesture::Idle;
        Action::Cleared
    }

    // --- Selection ---

    /// Select a placement, or clear the selection. Unknown ids clear it.
    pub fn select(&mut self, id: Option<PlacementId>) -> Action {
        let next = id.filter(|id| self.doc.contains(id));
        if next == self.ui.selected_id {
            return Action::None;
        }
        self.ui.selected_id = next;
        Action::SelectionChanged(next)
    }

    // --- Transform ---

    /// Merge position, rotation, scale, and flip fields into a placement.
    ///
    /// `z_index` in `fields` is ignored; stacking changes go through
    /// [`Engine::bring_to_front`] and [`Engine::send_backward`]. Non-finite
    /// numbers are dropped, scale is clamped into `[MIN_SCALE, MAX_SCALE]`,
    /// and rotation is wrapped into `(-360, 360)`.
    pub fn update_transform(&mut self, id: &PlacementId, fields: PartialPlacement) -> Action {
        let fields = sanitize(fields);
        if fields.is_empty() || !self.doc.apply_partial(id, &fields) {
            return Action::None;
        }
        Action::Updated { id: *id, fields }
    }

    /// Raise a placement above every other one.
    pub fn bring_to_front(&mut self, id: &PlacementId) -> Action {
        if !self.doc.contains(id) {
            return Action::None;
        }
        let top = self.doc.max_z().unwrap_or(BASELINE_Z).max(BASELINE_Z);
        self.set_z(id, top + 1)
    }

    /// Drop a placement beneath every other one, never below the floor
    /// reserved above the mannequin layer.
    ///
    /// Repeated calls on different placements can leave several at the
    /// floor; ties draw in insertion order.
    pub fn send_backward(&mut self, id: &PlacementId) -> Action {
        if !self.doc.contains(id) {
            return Action::None;
        }
        let bottom = self.doc.min_z().unwrap_or(BASELINE_Z).min(BASELINE_Z);
        self.set_z(id, (bottom - 1).max(MIN_PLACEMENT_Z))
    }

    /// Mirror a placement horizontally.
    pub fn toggle_flip(&mut self, id: &PlacementId) -> Action {
        let Some(item) = self.doc.get(id) else {
            return Action::None;
        };
        let fields = PartialPlacement {
            flipped_horizontally: Some(!item.transform.flipped_horizontally),
            ..Default::default()
        };
        self.doc.apply_partial(id, &fields);
        Action::Updated { id: *id, fields }
    }

    fn set_z(&mut self, id: &PlacementId, z_index: i64) -> Action {
        let fields = PartialPlacement { z_index: Some(z_index), ..Default::default() };
        self.doc.apply_partial(id, &fields);
        Action::Updated { id: *id, fields }
    }

    // --- Scene ---

    /// Switch the background scene. Any id is accepted.
    pub fn set_scene(&mut self, scene: impl Into<SceneId>) -> Action {
        let scene = scene.into();
        self.ui.scene = scene.clone();
        Action::SceneChanged(scene)
    }

    /// Show or hide the mannequin layer.
    pub fn set_dress_up(&mut self, on: bool) -> Action {
        if self.ui.dress_up == on {
            return Action::None;
        }
        self.ui.dress_up = on;
        Action::DressUpChanged(on)
    }

    // --- Drag gestures ---

    /// Pointer pressed. `hit` is the placement under the pointer as
    /// determined by the host; pressing empty canvas clears the selection.
    pub fn on_pointer_down(&mut self, hit: Option<PlacementId>, pt: Point) -> Action {
        match hit.filter(|id| self.doc.contains(id)) {
            Some(id) => {
                self.gesture = Gesture::Dragging { id, last: pt, moved: false };
                self.select(Some(id))
            }
            None => {
                self.gesture = Gesture::Idle;
                self.select(None)
            }
        }
    }

    /// Pointer moved. Drags the held placement by the pointer delta.
    pub fn on_pointer_move(&mut self, pt: Point) -> Action {
        let Gesture::Dragging { id, last, .. } = self.gesture else {
            return Action::None;
        };
        if pt == last {
            return Action::None;
        }
        let Some(item) = self.doc.get(&id) else {
            self.gesture = Gesture::Idle;
            return Action::None;
        };
        let (dx, dy) = pt.delta_from(last);
        let fields = PartialPlacement {
            x: Some(item.transform.x + dx),
            y: Some(item.transform.y + dy),
            ..Default::default()
        };
        self.gesture = Gesture::Dragging { id, last: pt, moved: true };
        self.update_transform(&id, fields)
    }

    /// Pointer released. Ends any drag in progress.
    pub fn on_pointer_up(&mut self, pt: Point) -> Action {
        let action = self.on_pointer_move(pt);
        self.gesture = Gesture::Idle;
        action
    }

    // --- Queries ---

    /// The currently selected placement, if any.
    #[must_use]
    pub fn selection(&self) -> Option<PlacementId> {
        self.ui.selected_id
    }

    #[must_use]
    pub fn scene(&self) -> &SceneId {
        &self.ui.scene
    }

    #[must_use]
    pub fn placement(&self, id: &PlacementId) -> Option<&PlacedItem> {
        self.doc.get(id)
    }

    /// Placements in draw order.
    #[must_use]
    pub fn sorted_placements(&self) -> Vec<&PlacedItem> {
        self.doc.sorted()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.doc.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.doc.is_empty()
    }
}

fn sanitize(fields: PartialPlacement) -> PartialPlacement {
    let finite = |v: Option<f64>| v.filter(|v| v.is_finite());
    PartialPlacement {
        x: finite(fields.x),
        y: finite(fields.y),
        rotation_degrees: finite(fields.rotation_degrees).map(|r| r % 360.0),
        scale: finite(fields.scale).map(|s| s.clamp(MIN_SCALE, MAX_SCALE)),
        flipped_horizontally: fields.flipped_horizontally,
        z_index: None,
    }
}
