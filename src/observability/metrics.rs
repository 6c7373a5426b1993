//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_connections_total` (counter): accepted client connections
//! - `proxy_active_connections` (gauge): connection tasks still running
//! - `proxy_requests_total` (counter): finished requests by outcome
//! - `proxy_cache_lookups_total` (counter): lookups by result (hit, miss)
//! - `proxy_cache_stores_total` (counter): objects written to the cache
//! - `proxy_cache_evictions_total` (counter): slots overwritten by a store
//! - `proxy_relayed_bytes_total` (counter): response bytes relayed from origins

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP scrape listener.
///
/// Must be called from within the Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_connection_accepted() {
    counter!("proxy_connections_total").increment(1);
}

pub fn set_active_connections(count: u64) {
    gauge!("proxy_active_connections").set(count as f64);
}

/// Record a finished request; `outcome` is a result label or an error kind.
pub fn record_request(outcome: &'static str) {
    counter!("proxy_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("proxy_cache_lookups_total", "result" => result).increment(1);
}

pub fn record_cache_store() {
    counter!("proxy_cache_stores_total").increment(1);
}

pub fn record_cache_eviction() {
    counter!("proxy_cache_evictions_total").increment(1);
}

pub fn record_relayed_bytes(bytes: usize) {
    counter!("proxy_relayed_bytes_total").increment(bytes as u64);
}
