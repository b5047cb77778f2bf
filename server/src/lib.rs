//! Closet server: wardrobe catalog, profile, and stylist behind a JSON API.
//!
//! ARCHITECTURE
//! ============
//! - `store`: remote persistence adapter (`RemoteStore`) with Postgres and
//!   in-memory implementations.
//! - `services`: catalog (optimistic sync), profile, stylist gateway.
//! - `llm`: provider clients behind the `LlmChat` trait.
//! - `routes`: Axum handlers over [`state::AppState`].
//!
//! The canvas composition engine lives in the `canvas` crate; closet items
//! and stickers convert into its sprites.

pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod model;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
