//! Canvas composition engine for the wardrobe styling board.
//!
//! Users place clothing items and stickers onto a 2D scene, drag them around,
//! flip them, and restack them above a fixed mannequin layer. This crate owns
//! that state and nothing else: rendering, hit-testing, and persistence of
//! the catalog belong to the host. Canvas state is never persisted.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::Engine`] and the [`engine::Action`]s it reports |
//! | [`doc`] | Placement types and the insertion-ordered store |
//! | [`input`] | Pointer types and the drag gesture state |
//! | [`scene`] | Background scene identifiers |
//! | [`consts`] | Z-order baselines, default anchor, scale limits |

pub mod consts;
pub mod doc;
pub mod engine;
pub mod input;
pub mod scene;

pub use doc::{PartialPlacement, PlacedItem, PlacementId, PlacementKind, Sprite, Transform};
pub use engine::{Action, Engine};
pub use scene::SceneId;
