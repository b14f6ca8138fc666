use anyhow::{Context, Result};
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

use crate::core::{shutdown::shutdown_signal, state::AppState};
use crate::tasks::expiry;

/// Runs the expiry sweep until ctrl-c/SIGTERM. A failed sweep is logged and retried on the
/// next tick.
pub(crate) async fn run(state: AppState) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = tokio::spawn(sweep_loop(state, shutdown_rx));

    shutdown_signal("worker").await;
    shutdown_tx.send_replace(true);

    sweeper.await.context("Expiry sweep task panicked")?;
    Ok(())
}

async fn sweep_loop(state: AppState, mut shutdown: watch::Receiver<bool>) {
    let period = state.settings().attempts().sweep_interval();
    tracing::info!(period_seconds = period.as_secs(), "Attempt expiry sweep started");

    let mut tick = interval(period);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = tick.tick() => {
                if let Err(err) = expiry::close_expired_attempts(&state).await {
                    tracing::error!(error = %format!("{err:#}"), "Attempt expiry sweep failed");
                }
            }
        }
    }

    tracing::info!("Attempt expiry sweep stopped");
}
