//! Shared numeric constants for the canvas crate.

// ── Z-order ─────────────────────────────────────────────────────

/// Z-index of the mannequin silhouette. Never assigned to a placement.
pub const MANNEQUIN_Z: i64 = 1;

/// Lowest z-index `send_backward` may assign.
pub const MIN_PLACEMENT_Z: i64 = 2;

/// Z-index baseline for normal placements; the first placement gets exactly this.
pub const BASELINE_Z: i64 = 10;

// ── Placement defaults ──────────────────────────────────────────

/// Anchor point for placement offsets, as a fraction of canvas width and
/// height. Offset `(0, 0)` sits here.
pub const ANCHOR_FRACTION: (f64, f64) = (0.25, 0.25);

/// Offset every new placement starts at, in canvas pixels from the anchor.
/// New placements stack on the anchor until dragged apart.
pub const DEFAULT_OFFSET: (f64, f64) = (0.0, 0.0);

/// Initial scale for clothing placements.
pub const CLOTHING_SCALE: f64 = 1.0;

/// Initial scale for sticker placements. Stickers start smaller.
pub const STICKER_SCALE: f64 = 0.6;

// ── Transform limits ────────────────────────────────────────────

/// Smallest scale `update_transform` will store.
pub const MIN_SCALE: f64 = 0.1;

/// Largest scale `update_transform` will store.
pub const MAX_SCALE: f64 = 5.0;
