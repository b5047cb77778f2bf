use super::*;
use crate::state::test_helpers::test_app_state;

async fn serve() -> String {
    let (_store, state) = test_app_state();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app(state)).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn healthz_is_ok() {
    assert_eq!(healthz().await, StatusCode::OK);
}

#[test]
fn error_response_carries_code_and_message() {
    let err = crate::services::catalog::DraftError::EmptyBatch;
    let response = error_response(StatusCode::BAD_REQUEST, &err);
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn router_serves_closet_round_trip() {
    let base = serve().await;
    let http = reqwest::Client::new();

    let health = http.get(format!("{base}/healthz")).send().await.unwrap();
    assert_eq!(health.status().as_u16(), 200);

    let created = http
        .post(format!("{base}/api/closet"))
        .json(&serde_json::json!({
            "items": [{ "name": "Trench", "category": "Outerwear", "imageUrl": "https://img.test/t.png",
                        "color": "Beige", "tags": ["classic"], "fit": "regular" }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status().as_u16(), 202);

    let listed: serde_json::Value = http
        .get(format!("{base}/api/closet"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed[0]["name"], "Trench");
}

#[tokio::test]
async fn router_packing_for_free_user_is_not_an_error() {
    let base = serve().await;
    let resp = reqwest::Client::new()
        .post(format!("{base}/api/stylist/packing"))
        .json(&serde_json::json!({ "destination": "Kyoto", "days": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["status"], "upgrade_required");
}

#[tokio::test]
async fn router_modest_mode_put() {
    let base = serve().await;
    let json: serde_json::Value = reqwest::Client::new()
        .put(format!("{base}/api/profile/modest-mode"))
        .json(&serde_json::json!({ "modestMode": true }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(json["preferences"]["modestMode"], true);
}
