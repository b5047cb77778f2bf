//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own business logic and remote-sync concerns so route
//! handlers can stay focused on request translation.

pub mod catalog;
pub mod profile;
pub mod stylist;
