//! Document model: placements, their transforms, and the in-memory store.
//!
//! This module defines what sits on the styling canvas (`PlacedItem`), the
//! tagged source it was placed from (`Sprite`), a sparse-update type for
//! incremental edits (`PartialPlacement`), and the runtime store that owns all
//! live placements (`PlacementStore`).
//!
//! The store remembers insertion order. Draw order is `z_index` ascending with
//! ties broken by insertion order, so duplicate z values at the floor stay
//! deterministic.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::ANCHOR_FRACTION;

/// Unique identifier for one placement. Distinct from the source item id.
pub type PlacementId = Uuid;

/// Discriminant of a placement's source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementKind {
    /// A clothing item from the user's catalog.
    Clothing,
    /// A decorative sticker from the seeded sticker set.
    Sticker,
}

/// The catalog entry a placement was made from.
///
/// `source_id` is a weak back-reference: deleting the source does not remove
/// placements made from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Sprite {
    Clothing {
        #[serde(rename = "sourceId")]
        source_id: String,
        name: String,
        #[serde(rename = "imageUrl")]
        image_url: String,
        category: String,
    },
    Sticker {
        #[serde(rename = "sourceId")]
        source_id: String,
        name: String,
        #[serde(rename = "imageUrl")]
        image_url: String,
    },
}

impl Sprite {
    /// Build a clothing sprite.
    #[must_use]
    pub fn clothing(
        source_id: impl Into<String>,
        name: impl Into<String>,
        image_url: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self::Clothing {
            source_id: source_id.into(),
            name: name.into(),
            image_url: image_url.into(),
            category: category.into(),
        }
    }

    /// Build a sticker sprite.
    #[must_use]
    pub fn sticker(source_id: impl Into<String>, name: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self::Sticker { source_id: source_id.into(), name: name.into(), image_url: image_url.into() }
    }

    #[must_use]
    pub fn kind(&self) -> PlacementKind {
        match self {
            Self::Clothing { .. } => PlacementKind::Clothing,
            Self::Sticker { .. } => PlacementKind::Sticker,
        }
    }

    #[must_use]
    pub fn source_id(&self) -> &str {
        match self {
            Self::Clothing { source_id, .. } | Self::Sticker { source_id, .. } => source_id,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Clothing { name, .. } | Self::Sticker { name, .. } => name,
        }
    }

    #[must_use]
    pub fn image_url(&self) -> &str {
        match self {
            Self::Clothing { image_url, .. } | Self::Sticker { image_url, .. } => image_url,
        }
    }
}

/// Visual transform of a placement.
///
/// `x` and `y` are offsets in canvas pixels from the anchor point at
/// [`ANCHOR_FRACTION`] of the canvas size. Pointer coordinates use the same
/// pixel unit, so drag deltas add to them directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    /// Horizontal offset from the anchor, in pixels.
    pub x: f64,
    /// Vertical offset from the anchor, in pixels.
    pub y: f64,
    /// Clockwise rotation in degrees.
    pub rotation_degrees: f64,
    /// Uniform scale factor.
    pub scale: f64,
    /// Mirrored around the vertical axis. Also drives the counter-flip of the
    /// placement's control overlay.
    pub flipped_horizontally: bool,
}

impl Transform {
    /// Position in canvas pixels from the top-left corner, for a canvas of
    /// the given size.
    #[must_use]
    pub fn canvas_position(&self, width: f64, height: f64) -> (f64, f64) {
        (width * ANCHOR_FRACTION.0 + self.x, height * ANCHOR_FRACTION.1 + self.y)
    }
}

/// One sprite positioned on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedItem {
    pub placement_id: PlacementId,
    pub sprite: Sprite,
    pub transform: Transform,
    /// Stacking order; lower values are drawn beneath higher values.
    pub z_index: i64,
}

impl PlacedItem {
    #[must_use]
    pub fn kind(&self) -> PlacementKind {
        self.sprite.kind()
    }
}

/// Sparse update for a placement. Only present fields are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialPlacement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_degrees: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flipped_horizontally: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i64>,
}

impl PartialPlacement {
    /// Returns `true` if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// In-memory store of placements, remembering insertion order.
#[derive(Debug, Default)]
pub struct PlacementStore {
    items: HashMap<PlacementId, PlacedItem>,
    order: Vec<PlacementId>,
}

impl PlacementStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a placement at the end of the insertion order. An existing
    /// placement with the same id is replaced in place.
    pub fn insert(&mut self, item: PlacedItem) {
        let id = item.placement_id;
        if self.items.insert(id, item).is_none() {
            self.order.push(id);
        }
    }

    /// Remove a placement by id, returning it if it was present.
    pub fn remove(&mut self, id: &PlacementId) -> Option<PlacedItem> {
        let removed = self.items.remove(id)?;
        self.order.retain(|other| other != id);
        Some(removed)
    }

    /// Drop every placement.
    pub fn clear(&mut self) {
        self.items.clear();
        self.order.clear();
    }

    #[must_use]
    pub fn get(&self, id: &PlacementId) -> Option<&PlacedItem> {
        self.items.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &PlacementId) -> bool {
        self.items.contains_key(id)
    }

    /// Apply a partial update to an existing placement. Returns false if the
    /// placement doesn't exist.
    pub fn apply_partial(&mut self, id: &PlacementId, partial: &PartialPlacement) -> bool {
        let Some(item) = self.items.get_mut(id) else {
            return false;
        };
        let t = &mut item.transform;
        if let Some(x) = partial.x {
            t.x = x;
        }
        if let Some(y) = partial.y {
            t.y = y;
        }
        if let Some(r) = partial.rotation_degrees {
            t.rotation_degrees = r;
        }
        if let Some(s) = partial.scale {
            t.scale = s;
        }
        if let Some(f) = partial.flipped_horizontally {
            t.flipped_horizontally = f;
        }
        if let Some(z) = partial.z_index {
            item.z_index = z;
        }
        true
    }

    /// Placements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &PlacedItem> {
        self.order.iter().filter_map(|id| self.items.get(id))
    }

    /// Placements in draw order: `z_index` ascending, ties in insertion order.
    #[must_use]
    pub fn sorted(&self) -> Vec<&PlacedItem> {
        let mut items: Vec<&PlacedItem> = self.iter().collect();
        // Stable sort keeps insertion order among equal z values.
        items.sort_by_key(|item| item.z_index);
        items
    }

    /// Highest z-index in the store, if any.
    #[must_use]
    pub fn max_z(&self) -> Option<i64> {
        self.items.values().map(|item| item.z_index).max()
    }

    /// Lowest z-index in the store, if any.
    #[must_use]
    pub fn min_z(&self) -> Option<i64> {
        self.items.values().map(|item| item.z_index).min()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
