use std::sync::Arc;

use closet::config::AppConfig;
use closet::llm::{LlmChat, LlmClient};
use closet::services::stylist::StylistConfig;
use closet::store::RemoteStore;
use closet::store::memory::MemoryStore;
use closet::store::postgres::PgStore;
use closet::{db, routes, state};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env();

    let store: Arc<dyn RemoteStore> = match &config.database_url {
        Some(url) => match db::init_pool(url, config.db_max_connections, config.sync.timeout).await {
            Ok(pool) => {
                if config.user_id.is_none() {
                    tracing::warn!("CLOSET_USER_ID not set; remote reads and writes will be refused");
                }
                Arc::new(PgStore::new(pool, config.user_id))
            }
            Err(e) => {
                tracing::warn!(error = %e, "DATABASE_URL unusable; using in-memory store, nothing will persist");
                memory_store(&config)
            }
        },
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store, nothing will persist");
            memory_store(&config)
        }
    };

    // Non-fatal: the stylist serves fallbacks when no LLM is configured.
    let llm: Option<Arc<dyn LlmChat>> = match LlmClient::from_env() {
        Ok(client) => {
            tracing::info!(model = client.model(), "LLM client initialized");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!(error = %e, "LLM client not configured; stylist will use fallbacks");
            None
        }
    };

    let state = state::AppState::new(store, llm, config.sync, StylistConfig::from_env());
    state.load().await;

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = config.port, "closet server listening");
    axum::serve(listener, app).await.expect("server failed");
}

fn memory_store(config: &AppConfig) -> Arc<dyn RemoteStore> {
    Arc::new(MemoryStore::new(Some(config.user_id.unwrap_or_else(uuid::Uuid::new_v4))))
}
