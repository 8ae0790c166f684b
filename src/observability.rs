use std::net::SocketAddr;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: booking requests submitted.
pub const REQUESTS_SUBMITTED_TOTAL: &str = "aula_requests_submitted_total";

/// Counter: requests approved (occupancy materialized).
pub const APPROVALS_TOTAL: &str = "aula_approvals_total";

/// Counter: requests rejected.
pub const REJECTIONS_TOTAL: &str = "aula_rejections_total";

/// Counter: conflicts detected while gating an occupancy write.
pub const CONFLICTS_DETECTED_TOTAL: &str = "aula_conflicts_detected_total";

// ── Cache metrics ───────────────────────────────────────────────

/// Counter: availability/listing cache hits.
pub const CACHE_HITS_TOTAL: &str = "aula_cache_hits_total";

/// Counter: availability/listing cache misses (recompute-and-store).
pub const CACHE_MISSES_TOTAL: &str = "aula_cache_misses_total";

/// Counter: whole-cache invalidations fired by mutations.
pub const CACHE_INVALIDATIONS_TOTAL: &str = "aula_cache_invalidations_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}
