//! Application state and sub-state extractors.
//!
//! AppState is split into sub-states so handlers can extract only what they
//! need via Axum's `FromRef`.

use crate::services::{DspGenerator, WebhookClient};
use dealplan_core::Config;
use dealplan_db::{
    ArtifactRepository, ClientRepository, InputRepository, OpportunityRepository,
    ResponsibleRepository,
};
use dealplan_storage::{Storage, UrlSigner};
use sqlx::PgPool;
use std::sync::Arc;

/// Database pool and the repositories built on it
#[derive(Clone)]
pub struct DbState {
    pub pool: PgPool,
    pub client_repository: ClientRepository,
    pub responsible_repository: ResponsibleRepository,
    pub opportunity_repository: OpportunityRepository,
    pub input_repository: InputRepository,
    pub artifact_repository: ArtifactRepository,
}

impl DbState {
    pub fn new(pool: PgPool) -> Self {
        Self {
            client_repository: ClientRepository::new(pool.clone()),
            responsible_repository: ResponsibleRepository::new(pool.clone()),
            opportunity_repository: OpportunityRepository::new(pool.clone()),
            input_repository: InputRepository::new(pool.clone()),
            artifact_repository: ArtifactRepository::new(pool.clone()),
            pool,
        }
    }
}

/// Object storage plus upload limits
#[derive(Clone)]
pub struct FileState {
    pub storage: Arc<dyn Storage>,
    /// Verifies URLs served by `/files/{bucket}/{*key}`
    pub url_signer: UrlSigner,
    pub max_input_size_bytes: usize,
}

/// Main application state: aggregates sub-states for dependency injection.
#[derive(Clone)]
pub struct AppState {
    pub db: DbState,
    pub files: FileState,
    pub dsp: DspGenerator,
    pub webhooks: WebhookClient,
    pub config: Config,
}

impl axum::extract::FromRef<Arc<AppState>> for DbState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.db.clone()
    }
}

impl axum::extract::FromRef<Arc<AppState>> for FileState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.files.clone()
    }
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
