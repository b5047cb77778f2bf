use super::*;
use crate::state::test_helpers::{MockLlm, catalog_item};

fn closet() -> Vec<CatalogItem> {
    vec![
        catalog_item("c1", "White Shirt", "Tops"),
        catalog_item("c2", "Wide Jeans", "Bottoms"),
        catalog_item("c3", "Loafers", "Shoes"),
        catalog_item("c4", "Mini Skirt", "Bottoms"),
    ]
}

fn stylist(llm: MockLlm) -> (Arc<MockLlm>, Stylist) {
    let llm = Arc::new(llm);
    let stylist = Stylist::new(Some(llm.clone()), StylistConfig::default());
    (llm, stylist)
}

const GOOD_REPLY: &str = r#"{
  "selectedItemIds": ["c1", "c2", "c3"],
  "advice": "Crisp shirt, relaxed denim, polished loafers.",
  "suggestedMissingItem": { "name": "Leather Tote Bag", "description": "Holds it together.", "estimatedPrice": "1250 TL" }
}"#;

// =============================================================================
// recommend
// =============================================================================

#[tokio::test]
async fn recommend_resolves_selected_ids() {
    let (_llm, stylist) = stylist(MockLlm::replying(&[GOOD_REPLY]));
    let rec = stylist.recommend("brunch", &closet(), false).await;

    assert_eq!(rec.text, "Crisp shirt, relaxed denim, polished loafers.");
    let ids: Vec<&str> = rec.outfit_items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["c1", "c2", "c3"]);
    assert_eq!(rec.missing_item.name, "Leather Tote Bag");
    assert_eq!(rec.missing_item.price, "1250 TL");
    assert_eq!(rec.missing_item.image_url, affiliate_image("bag"));
    assert!(rec.missing_item.id.starts_with("ai-rec-"));
    assert_eq!(rec.missing_item.affiliate_link, "#");
}

#[tokio::test]
async fn recommend_tolerates_code_fences() {
    let fenced = format!("```json\n{GOOD_REPLY}\n```");
    let (_llm, stylist) = stylist(MockLlm::replying(&[fenced.as_str()]));
    let rec = stylist.recommend("brunch", &closet(), false).await;
    assert_eq!(rec.outfit_items.len(), 3);
    assert_ne!(rec.text, FALLBACK_ADVICE);
}

#[tokio::test]
async fn unknown_and_duplicate_ids_are_dropped_and_capped_at_three() {
    let reply = r#"{"selectedItemIds": ["ghost", "c1", "c1", "c2", "c3", "c4"], "advice": "ok",
        "suggestedMissingItem": {"name": "Silk Scarf"}}"#;
    let (_llm, stylist) = stylist(MockLlm::replying(&[reply]));
    let rec = stylist.recommend("office", &closet(), false).await;

    let ids: Vec<&str> = rec.outfit_items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["c1", "c2", "c3"]);
    assert_eq!(rec.missing_item.description, "");
}

#[tokio::test]
async fn llm_error_falls_back_to_first_three_items() {
    let (_llm, stylist) = stylist(MockLlm::failing());
    let catalog = closet();
    let rec = stylist.recommend("date night", &catalog, false).await;

    assert_eq!(rec.text, FALLBACK_ADVICE);
    assert_eq!(rec.outfit_items, catalog[..3].to_vec());
    assert_eq!(rec.missing_item, default_affiliate_item());
}

#[tokio::test]
async fn malformed_reply_falls_back() {
    let (_llm, stylist) = stylist(MockLlm::replying(&["Sure! Wear the shirt."]));
    let rec = stylist.recommend("date night", &closet(), false).await;
    assert_eq!(rec.text, FALLBACK_ADVICE);
}

#[tokio::test]
async fn reply_without_missing_item_name_falls_back() {
    let reply = r#"{"selectedItemIds": ["c1"], "advice": "ok", "suggestedMissingItem": {"name": " "}}"#;
    let (_llm, stylist) = stylist(MockLlm::replying(&[reply]));
    let rec = stylist.recommend("date night", &closet(), false).await;
    assert_eq!(rec.missing_item, default_affiliate_item());
}

#[tokio::test]
async fn empty_catalog_still_yields_a_recommendation() {
    let (_llm, stylist) = stylist(MockLlm::failing());
    let rec = stylist.recommend("anything", &[], false).await;
    assert!(rec.outfit_items.is_empty());
    assert!(!rec.missing_item.name.is_empty());
}

#[tokio::test]
async fn unconfigured_stylist_uses_fallback() {
    let stylist = Stylist::new(None, StylistConfig::default());
    assert!(!stylist.is_configured());
    let rec = stylist.recommend("anything", &closet(), true).await;
    assert_eq!(rec.text, FALLBACK_ADVICE);
    assert_eq!(rec.outfit_items.len(), 3);
}

#[tokio::test]
async fn prompt_carries_inventory_without_images_and_modest_rules() {
    let (llm, stylist) = stylist(MockLlm::replying(&[GOOD_REPLY]));
    stylist.recommend("wedding guest", &closet(), true).await;

    let prompts = llm.prompts();
    assert_eq!(prompts.len(), 1);
    let prompt = &prompts[0];
    assert!(prompt.contains("wedding guest"));
    assert!(prompt.contains("\"id\":\"c1\""));
    assert!(prompt.contains("\"fit\":\"regular\""));
    assert!(!prompt.contains("img.test"));
    assert!(prompt.contains(MODEST_RULES));
}

#[tokio::test]
async fn prompt_omits_modest_rules_when_off() {
    let (llm, stylist) = stylist(MockLlm::replying(&[GOOD_REPLY]));
    stylist.recommend("gym", &closet(), false).await;
    assert!(!llm.prompts()[0].contains(MODEST_RULES));
}

// =============================================================================
// packing_list
// =============================================================================

#[tokio::test]
async fn packing_list_returns_model_text() {
    let (llm, stylist) = stylist(MockLlm::replying(&["1. White Shirt\n2. Loafers"]));
    let text = stylist.packing_list("Lisbon", 4, &closet(), false).await;
    assert_eq!(text, "1. White Shirt\n2. Loafers");
    let prompt = &llm.prompts()[0];
    assert!(prompt.contains("Lisbon"));
    assert!(prompt.contains("4 days"));
    assert!(prompt.contains("White Shirt (Tops, Navy)"));
}

#[tokio::test]
async fn packing_list_empty_reply_uses_default_text() {
    let (_llm, stylist) = stylist(MockLlm::replying(&["  "]));
    assert_eq!(stylist.packing_list("Oslo", 2, &closet(), false).await, PACKING_DEFAULT);
}

#[tokio::test]
async fn packing_list_failure_uses_fallback_text() {
    let (_llm, stylist) = stylist(MockLlm::failing());
    assert_eq!(stylist.packing_list("Oslo", 2, &closet(), true).await, PACKING_FALLBACK);
}

// =============================================================================
// lookups + parsing
// =============================================================================

#[test]
fn affiliate_image_matches_keywords_case_insensitively() {
    assert_eq!(affiliate_image("Leather BAG"), AFFILIATE_IMAGES[0].1);
    assert_eq!(affiliate_image("Gold Earrings"), AFFILIATE_IMAGES[1].1);
    assert_eq!(affiliate_image("Chelsea Boots"), AFFILIATE_IMAGES[2].1);
    assert_eq!(affiliate_image("Trench"), AFFILIATE_IMAGES[3].1);
    assert_eq!(affiliate_image("Cat-eye Sunglasses"), AFFILIATE_IMAGES[4].1);
    assert_eq!(affiliate_image("Wool Shawl"), AFFILIATE_IMAGES[5].1);
    assert_eq!(affiliate_image("Beret"), DEFAULT_AFFILIATE_IMAGE);
}

#[test]
fn extract_json_handles_prose_and_fences() {
    assert_eq!(extract_json("here: {\"a\":1} thanks"), Some("{\"a\":1}"));
    assert_eq!(extract_json("```json\n{}\n```"), Some("{}"));
    assert_eq!(extract_json("no braces"), None);
    assert_eq!(extract_json("} backwards {"), None);
}

#[test]
fn stylist_error_retryability() {
    assert!(StylistError::Timeout(Duration::from_secs(1)).retryable());
    assert!(!StylistError::Malformed("x".into()).retryable());
    assert_eq!(StylistError::NotConfigured.error_code(), "E_LLM_NOT_CONFIGURED");
}

#[test]
fn config_defaults() {
    let cfg = StylistConfig::default();
    assert_eq!(cfg.max_tokens, 1024);
    assert_eq!(cfg.timeout, Duration::from_secs(30));
}
