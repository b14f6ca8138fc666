use anyhow::{Context, Result};

use crate::core::state::AppState;
use crate::core::{metrics, time::now_utc};
use crate::repositories;

/// Moves every attempt past its deadline plus grace to `expired`. Returns how many moved.
pub(crate) async fn close_expired_attempts(state: &AppState) -> Result<u64> {
    let grace_seconds = state.submit_grace_seconds();
    let closed = repositories::attempts::expire_overdue(state.db(), now_utc(), grace_seconds as i64)
        .await
        .context("Failed to expire overdue attempts")?;

    if closed > 0 {
        metrics::attempts_expired(closed);
        tracing::info!(closed, grace_seconds, "Expired overdue attempts");
    } else {
        tracing::debug!("No overdue attempts");
    }

    Ok(closed)
}
