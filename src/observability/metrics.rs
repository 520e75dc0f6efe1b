//! Metrics collection and exposition.
//!
//! # Metrics
//! - `authz_decisions_total` (counter): decisions by `mode` and `decision`
//!
//! # Design Decisions
//! - Exposed through a Prometheus-compatible HTTP listener
//! - Recording without an installed exporter is a no-op

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::authz::{Decision, Mode};

/// Counter name for authorization decisions.
pub const DECISIONS_TOTAL: &str = "authz_decisions_total";

/// Starts the Prometheus exporter on `addr`. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Counts one decision.
pub fn record_decision(mode: Mode, decision: Decision) {
    metrics::counter!(
        DECISIONS_TOTAL,
        "mode" => mode.as_str(),
        "decision" => decision.as_str()
    )
    .increment(1);
}
