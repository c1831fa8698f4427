use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

#[derive(Debug, Default)]
pub struct AppMetrics {
    requests_total: AtomicU64,
    upstream_failures_total: AtomicU64,
    extraction_failures_total: AtomicU64,
    venue_lookups_total: AtomicU64,
    total_latency_millis: AtomicU64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub upstream_failures_total: u64,
    pub extraction_failures_total: u64,
    pub venue_lookups_total: u64,
    pub avg_latency_millis: f64,
}

impl AppMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_upstream_failure(&self) {
        self.upstream_failures_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_extraction_failure(&self) {
        self.extraction_failures_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_venue_lookup(&self) {
        self.venue_lookups_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn observe_latency(&self, duration: Duration) {
        self.total_latency_millis
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let requests = self.requests_total.load(Ordering::Relaxed);
        let latency = self.total_latency_millis.load(Ordering::Relaxed);

        MetricsSnapshot {
            requests_total: requests,
            upstream_failures_total: self.upstream_failures_total.load(Ordering::Relaxed),
            extraction_failures_total: self.extraction_failures_total.load(Ordering::Relaxed),
            venue_lookups_total: self.venue_lookups_total.load(Ordering::Relaxed),
            avg_latency_millis: if requests == 0 {
                0.0
            } else {
                latency as f64 / requests as f64
            },
        }
    }
}

/// Crates whose events are shown at `info` unless `RUST_LOG` says otherwise.
const WANDER_CRATES: [&str; 3] = ["wander_core", "wander_agents", "wander_api"];

fn default_filter(service_name: &str) -> String {
    let mut directives = vec![format!("{service_name}=info")];
    directives.extend(
        WANDER_CRATES
            .iter()
            .filter(|krate| **krate != service_name)
            .map(|krate| format!("{krate}=info")),
    );
    directives.push("tower_http=warn".to_string());
    directives.join(",")
}

pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter(service_name)));

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_span_list(true)
            .init();
    });
}
