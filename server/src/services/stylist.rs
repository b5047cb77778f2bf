//! Stylist service: outfit recommendations and travel packing lists.
//!
//! DESIGN
//! ======
//! A stateless gateway over [`LlmChat`]. Each call is a single-shot request:
//! the closet snapshot goes in by value (no image URLs) together with the
//! modest-mode flag, and structured JSON comes back. Item ids in the reply
//! are resolved against the snapshot; unknown ids are dropped.
//!
//! ERROR HANDLING
//! ==============
//! Nothing here returns an error to the caller. Any LLM failure, timeout, or
//! malformed reply is logged and replaced by a fixed fallback payload. When
//! no LLM is configured every call takes the fallback path.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::env_parse;
use crate::error::ErrorCode;
use crate::llm::LlmChat;
use crate::llm::types::{LlmError, Message};
use crate::model::{AffiliateItem, CatalogItem, Fit};

const DEFAULT_STYLIST_MAX_TOKENS: u32 = 1024;
const DEFAULT_STYLIST_TIMEOUT_SECS: u64 = 30;

/// Most closet items a single recommendation may select.
pub const MAX_OUTFIT_ITEMS: usize = 3;

pub const FALLBACK_ADVICE: &str =
    "My inspiration is a little busy right now, but you'll look great with the pieces already in your closet!";
pub const PACKING_FALLBACK: &str = "We couldn't reach the stylist, but don't forget to pack your favourite pieces!";
pub const PACKING_DEFAULT: &str = "Have a great trip! Check the weather forecast before you pack.";

const DEFAULT_AFFILIATE_IMAGE: &str = "https://images.unsplash.com/photo-1483985988355-763728e1935b?w=500&q=80";

/// Substring keywords mapped to a representative product image. First match wins.
const AFFILIATE_IMAGES: &[(&[&str], &str)] = &[
    (&["bag"], "https://images.unsplash.com/photo-1584917865442-de89df76afd3?w=500&q=80"),
    (
        &["necklace", "earring", "jewel"],
        "https://images.unsplash.com/photo-1599643478518-17488fbbcd75?w=500&q=80",
    ),
    (&["shoe", "boot", "sneaker"], "https://images.unsplash.com/photo-1543163521-1bf539c55dd2?w=500&q=80"),
    (&["jacket", "coat", "trench"], "https://images.unsplash.com/photo-1591047139829-d91aecb6caea?w=500&q=80"),
    (&["glasses"], "https://images.unsplash.com/photo-1511499767150-a48a237f0083?w=500&q=80"),
    (&["scarf", "shawl"], "https://images.unsplash.com/photo-1584030373081-f37b7bb4fa8e?w=500&q=80"),
];

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StylistError {
    #[error("LLM not configured")]
    NotConfigured,
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
    #[error("LLM call timed out after {0:?}")]
    Timeout(Duration),
    #[error("malformed stylist reply: {0}")]
    Malformed(String),
}

impl ErrorCode for StylistError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotConfigured => "E_LLM_NOT_CONFIGURED",
            Self::Llm(_) => "E_LLM_ERROR",
            Self::Timeout(_) => "E_LLM_TIMEOUT",
            Self::Malformed(_) => "E_MALFORMED_REPLY",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Llm(e) if e.retryable()) || matches!(self, Self::Timeout(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StylistConfig {
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl StylistConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            max_tokens: env_parse("STYLIST_MAX_TOKENS", DEFAULT_STYLIST_MAX_TOKENS),
            timeout: Duration::from_secs(env_parse("STYLIST_TIMEOUT_SECS", DEFAULT_STYLIST_TIMEOUT_SECS)),
        }
    }
}

impl Default for StylistConfig {
    fn default() -> Self {
        Self { max_tokens: DEFAULT_STYLIST_MAX_TOKENS, timeout: Duration::from_secs(DEFAULT_STYLIST_TIMEOUT_SECS) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub text: String,
    /// Zero to three items from the caller's closet.
    pub outfit_items: Vec<CatalogItem>,
    pub missing_item: AffiliateItem,
}

/// The closet fields the model sees. Image URLs stay out of the prompt.
#[derive(Serialize)]
struct InventoryEntry<'a> {
    id: &'a str,
    name: &'a str,
    category: &'a str,
    color: &'a str,
    fit: Fit,
    tags: Vec<&'a str>,
}

impl<'a> From<&'a CatalogItem> for InventoryEntry<'a> {
    fn from(item: &'a CatalogItem) -> Self {
        Self {
            id: &item.id,
            name: &item.name,
            category: &item.category,
            color: &item.color,
            fit: item.fit,
            tags: item.tags.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelReply {
    #[serde(default)]
    selected_item_ids: Vec<String>,
    advice: String,
    suggested_missing_item: ModelMissingItem,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelMissingItem {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    estimated_price: String,
}

// =============================================================================
// SERVICE
// =============================================================================

#[derive(Clone)]
pub struct Stylist {
    llm: Option<Arc<dyn LlmChat>>,
    config: StylistConfig,
}

impl Stylist {
    #[must_use]
    pub fn new(llm: Option<Arc<dyn LlmChat>>, config: StylistConfig) -> Self {
        Self { llm, config }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.llm.is_some()
    }

    /// Suggest an outfit from `catalog` for `query`. Always returns a
    /// well-formed recommendation.
    pub async fn recommend(&self, query: &str, catalog: &[CatalogItem], modest: bool) -> Recommendation {
        match self.try_recommend(query, catalog, modest).await {
            Ok(rec) => {
                info!(selected = rec.outfit_items.len(), modest, "recommendation ready");
                rec
            }
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "recommendation failed; using fallback");
                fallback_recommendation(catalog)
            }
        }
    }

    /// Packing list for a trip. Always returns text.
    pub async fn packing_list(&self, destination: &str, days: u32, catalog: &[CatalogItem], modest: bool) -> String {
        let prompt = packing_prompt(destination, days, catalog, modest);
        match self.ask(PACKING_SYSTEM, prompt).await {
            Ok(text) if text.trim().is_empty() => PACKING_DEFAULT.to_string(),
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, code = e.error_code(), destination, days, "packing list failed; using fallback");
                PACKING_FALLBACK.to_string()
            }
        }
    }

    async fn try_recommend(
        &self,
        query: &str,
        catalog: &[CatalogItem],
        modest: bool,
    ) -> Result<Recommendation, StylistError> {
        let prompt = recommend_prompt(query, catalog, modest)?;
        let text = self.ask(RECOMMEND_SYSTEM, prompt).await?;
        parse_recommendation(&text, catalog)
    }

    async fn ask(&self, system: &str, prompt: String) -> Result<String, StylistError> {
        let llm = self.llm.as_ref().ok_or(StylistError::NotConfigured)?;
        let messages = [Message::user(prompt)];
        let response = tokio::time::timeout(self.config.timeout, llm.chat(self.config.max_tokens, system, &messages))
            .await
            .map_err(|_| StylistError::Timeout(self.config.timeout))??;
        Ok(response.text)
    }
}

// =============================================================================
// PROMPTS
// =============================================================================

const RECOMMEND_SYSTEM: &str = "You are a friendly personal stylist. Reply with a single JSON object and nothing else.";
const PACKING_SYSTEM: &str = "You are an organised travel assistant who builds packing lists from a user's closet.";

const MODEST_RULES: &str = "The user prefers modest dress. Never suggest short skirts, crop tops, shorts, or low \
necklines on their own; layer them under a long jacket or cardigan, and keep silhouettes relaxed.";

fn recommend_prompt(query: &str, catalog: &[CatalogItem], modest: bool) -> Result<String, StylistError> {
    let inventory: Vec<InventoryEntry<'_>> = catalog.iter().map(InventoryEntry::from).collect();
    let inventory =
        serde_json::to_string(&inventory).map_err(|e| StylistError::Malformed(format!("closet encode: {e}")))?;
    let style = if modest { MODEST_RULES } else { "The user likes a modern, everyday style." };
    Ok(format!(
        "Pick up to {MAX_OUTFIT_ITEMS} pieces from the closet below for the request, and suggest one item the \
user does not own that would complete the look.\n\n\
CLOSET (JSON): {inventory}\n\n\
REQUEST: \"{query}\"\n\n\
{style}\n\n\
Respond with JSON: {{\"selectedItemIds\": [\"id\"], \"advice\": \"...\", \
\"suggestedMissingItem\": {{\"name\": \"...\", \"description\": \"...\", \"estimatedPrice\": \"...\"}}}}"
    ))
}

fn packing_prompt(destination: &str, days: u32, catalog: &[CatalogItem], modest: bool) -> String {
    let available = catalog
        .iter()
        .map(|i| format!("{} ({}, {})", i.name, i.category, i.color))
        .collect::<Vec<_>>()
        .join(", ");
    let modest = if modest { format!("\n\n{MODEST_RULES}") } else { String::new() };
    format!(
        "The user is travelling to {destination} for {days} days.\n\nCLOSET: {available}{modest}\n\n\
List the closet pieces to pack, suggest outfit combinations, and remind them of toiletries and tech."
    )
}

// =============================================================================
// PARSING
// =============================================================================

/// Slice out the outermost JSON object, skipping code fences or prose.
fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

fn parse_recommendation(text: &str, catalog: &[CatalogItem]) -> Result<Recommendation, StylistError> {
    let json = extract_json(text).ok_or_else(|| StylistError::Malformed("no JSON object in reply".into()))?;
    let reply: ModelReply = serde_json::from_str(json).map_err(|e| StylistError::Malformed(e.to_string()))?;
    if reply.suggested_missing_item.name.trim().is_empty() {
        return Err(StylistError::Malformed("suggested item has no name".into()));
    }

    let mut outfit_items: Vec<CatalogItem> = Vec::new();
    for id in &reply.selected_item_ids {
        if outfit_items.len() == MAX_OUTFIT_ITEMS {
            break;
        }
        match catalog.iter().find(|item| &item.id == id) {
            Some(item) if !outfit_items.iter().any(|picked| picked.id == item.id) => outfit_items.push(item.clone()),
            Some(_) => {}
            None => warn!(%id, "model selected an id not in the closet; dropping"),
        }
    }

    let missing = reply.suggested_missing_item;
    Ok(Recommendation {
        text: reply.advice,
        outfit_items,
        missing_item: AffiliateItem {
            id: format!("ai-rec-{}", Uuid::new_v4().simple()),
            image_url: affiliate_image(&missing.name).to_string(),
            name: missing.name,
            description: missing.description,
            price: missing.estimated_price,
            affiliate_link: "#".into(),
        },
    })
}

/// Pick a product image by keyword in the item name.
#[must_use]
pub fn affiliate_image(name: &str) -> &'static str {
    let lower = name.to_lowercase();
    AFFILIATE_IMAGES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map_or(DEFAULT_AFFILIATE_IMAGE, |(_, url)| *url)
}

#[must_use]
pub fn default_affiliate_item() -> AffiliateItem {
    AffiliateItem {
        id: "a1".into(),
        name: "Beige Trench Coat".into(),
        description: "An autumn essential that finishes almost any look.".into(),
        price: "2499 TL".into(),
        image_url: "https://images.unsplash.com/photo-1591047139829-d91aecb6caea?w=500&q=80".into(),
        affiliate_link: "#".into(),
    }
}

#[must_use]
pub fn fallback_recommendation(catalog: &[CatalogItem]) -> Recommendation {
    Recommendation {
        text: FALLBACK_ADVICE.into(),
        outfit_items: catalog.iter().take(MAX_OUTFIT_ITEMS).cloned().collect(),
        missing_item: default_affiliate_item(),
    }
}

#[cfg(test)]
#[path = "stylist_test.rs"]
mod tests;
