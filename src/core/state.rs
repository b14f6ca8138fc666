use std::sync::Arc;

use sqlx::PgPool;

use crate::core::config::Settings;

/// Shared by every handler and the expiry sweep. Cloning is cheap: the pool is already
/// reference counted and settings sit behind an `Arc`.
#[derive(Clone)]
pub(crate) struct AppState {
    settings: Arc<Settings>,
    db: PgPool,
}

impl AppState {
    pub(crate) fn new(settings: Settings, db: PgPool) -> Self {
        Self { settings: Arc::new(settings), db }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.settings
    }

    pub(crate) fn db(&self) -> &PgPool {
        &self.db
    }

    /// Seconds past an attempt's deadline during which a submit is still honoured.
    pub(crate) fn submit_grace_seconds(&self) -> u64 {
        self.settings.attempts().submit_grace_seconds
    }
}
