use std::sync::Arc;

use classhub_config::{CorsConfig, JwtConfig, ServerConfig, StoreBackend, UploadConfig};
use classhub_core::{FileStorage, LocalFileStorage};
use classhub_db::{MemoryStore, PgStore, Store, init_db_pool};
use classhub_roster::RosterService;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub roster: RosterService,
    pub uploads: Arc<dyn FileStorage>,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub upload_config: UploadConfig,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("roster", &self.roster)
            .field("jwt_config", &"<redacted>")
            .field("cors_config", &self.cors_config)
            .field("upload_config", &self.upload_config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Wires the roster service and a local upload store around `store`.
    pub fn new(
        store: Arc<dyn Store>,
        jwt_config: JwtConfig,
        cors_config: CorsConfig,
        upload_config: UploadConfig,
    ) -> Self {
        let uploads = LocalFileStorage::with_max_size(
            upload_config.dir.clone(),
            upload_config.base_url.clone(),
            upload_config.max_bytes,
        );
        Self {
            roster: RosterService::new(store.clone()),
            store,
            uploads: Arc::new(uploads),
            jwt_config,
            cors_config,
            upload_config,
        }
    }
}

/// Builds the state from the environment, connecting and migrating Postgres
/// unless the in-memory backend is selected.
pub async fn init_app_state(server_config: &ServerConfig) -> anyhow::Result<AppState> {
    let store: Arc<dyn Store> = match server_config.store_backend {
        StoreBackend::Postgres => {
            let pool = init_db_pool().await?;
            let store = PgStore::new(pool);
            store.migrate().await?;
            tracing::info!("Connected to Postgres and applied migrations");
            Arc::new(store)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    Ok(AppState::new(
        store,
        JwtConfig::from_env(),
        CorsConfig::from_env(),
        UploadConfig::from_env(),
    ))
}
