//! Domain types shared by the catalog, profile, and stylist services.
//!
//! In-memory and JSON field names are camelCase. The remote store uses
//! snake_case columns; that mapping lives in [`crate::store`].

use std::collections::BTreeSet;
use std::fmt;

use canvas::Sprite;
use serde::{Deserialize, Serialize};

// =============================================================================
// CATALOG
// =============================================================================

/// How a garment fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fit {
    Tight,
    Regular,
    Loose,
    Cropped,
}

impl Fit {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tight => "tight",
            Self::Regular => "regular",
            Self::Loose => "loose",
            Self::Cropped => "cropped",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "tight" => Some(Self::Tight),
            "regular" => Some(Self::Regular),
            "loose" => Some(Self::Loose),
            "cropped" => Some(Self::Cropped),
            _ => None,
        }
    }
}

impl fmt::Display for Fit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A clothing item in the user's closet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    /// Temporary client id until the remote store confirms, then the server id.
    pub id: String,
    pub name: String,
    pub category: String,
    pub image_url: String,
    pub color: String,
    pub tags: BTreeSet<String>,
    pub fit: Fit,
}

impl From<&CatalogItem> for Sprite {
    fn from(item: &CatalogItem) -> Self {
        Sprite::clothing(item.id.clone(), item.name.clone(), item.image_url.clone(), item.category.clone())
    }
}

/// A decorative sticker. Seeded once, never mutated or persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StickerItem {
    pub id: String,
    pub name: String,
    pub image_url: String,
}

impl From<&StickerItem> for Sprite {
    fn from(item: &StickerItem) -> Self {
        Sprite::sticker(item.id.clone(), item.name.clone(), item.image_url.clone())
    }
}

/// The built-in sticker set.
#[must_use]
pub fn seed_stickers() -> Vec<StickerItem> {
    [
        ("s1", "Star", "https://cdn-icons-png.flaticon.com/512/1828/1828884.png"),
        ("s2", "Heart", "https://cdn-icons-png.flaticon.com/512/833/833472.png"),
        ("s3", "Flower", "https://cdn-icons-png.flaticon.com/512/2926/2926701.png"),
        ("s4", "Coffee", "https://cdn-icons-png.flaticon.com/512/2935/2935307.png"),
        ("s5", "Sparkle", "https://cdn-icons-png.flaticon.com/512/4127/4127281.png"),
    ]
    .into_iter()
    .map(|(id, name, url)| StickerItem { id: id.into(), name: name.into(), image_url: url.into() })
    .collect()
}

// =============================================================================
// PROFILE
// =============================================================================

/// User identity and gamification counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub style_points: u64,
    pub outfits_created: u64,
    pub is_premium: bool,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self { name: "Guest".into(), style_points: 0, outfits_created: 0, is_premium: false }
    }
}

/// User preferences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Constrain recommendations to more conservative, layered outfits.
    pub modest_mode: bool,
}

// =============================================================================
// STYLIST
// =============================================================================

/// An item suggested from outside the user's closet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffiliateItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image_url: String,
    pub affiliate_link: String,
}
