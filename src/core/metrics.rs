use std::sync::OnceLock;

use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

const LATENCY_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5];

/// Installs the Prometheus recorder once per process. No-op when the exporter is disabled.
pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled || PROM_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            LATENCY_BUCKETS,
        )?
        .install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(PrometheusHandle::render)
}

pub(crate) fn attempt_started() {
    metrics::counter!("attempts_started_total").increment(1);
}

/// `late` marks a submit accepted inside the grace period after the deadline.
pub(crate) fn attempt_submitted(late: bool) {
    metrics::counter!("attempts_submitted_total", "late" => late.to_string()).increment(1);
}

pub(crate) fn attempts_expired(count: u64) {
    metrics::counter!("attempts_expired_total").increment(count);
}

pub(crate) fn submission_rejected(reason: &'static str) {
    metrics::counter!("attempt_submissions_rejected_total", "reason" => reason).increment(1);
}
