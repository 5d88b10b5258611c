//! Observability metrics for the cloud save client
//!
//! Records requests sent per endpoint, `429` responses, calls rejected locally
//! while rate limited, and classified failures by reason.
//!
//! ## Architecture
//!
//! - Uses `metrics` crate for low-overhead metric collection
//! - Prometheus exporter for scraping endpoint, installed by the binary on request
//! - Without an installed recorder every call below is a no-op

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::Lazy;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::CloudSaveErrorReason;

/// Global metrics registry initialization flag
static METRICS_INITIALIZED: Lazy<Arc<RwLock<bool>>> = Lazy::new(|| Arc::new(RwLock::new(false)));

/// Initialize metrics system with Prometheus exporter
///
/// Idempotent: later calls return `Ok(())` without reinstalling.
///
/// # Arguments
/// * `addr` - Socket address to bind Prometheus scrape endpoint (e.g., "0.0.0.0:9090")
pub async fn init_metrics(addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    let mut initialized = METRICS_INITIALIZED.write().await;
    if *initialized {
        debug!("Metrics already initialized, skipping");
        return Ok(());
    }

    info!("Initializing metrics system on {}", addr);

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    describe_counter!(
        "cloud_save_requests_total",
        Unit::Count,
        "Total number of HTTP requests sent to the cloud save service and storage"
    );

    describe_counter!(
        "cloud_save_429_responses_total",
        Unit::Count,
        "Total number of 429 responses received"
    );

    describe_counter!(
        "cloud_save_preempted_calls_total",
        Unit::Count,
        "Calls rejected locally while a rate-limit window was open"
    );

    describe_counter!(
        "cloud_save_failures_total",
        Unit::Count,
        "Classified failures returned to callers"
    );

    describe_histogram!(
        "cloud_save_request_duration_seconds",
        Unit::Seconds,
        "HTTP request duration in seconds"
    );

    *initialized = true;
    info!("Metrics system initialized successfully on {}", addr);
    Ok(())
}

/// Timing and outcome of one HTTP request
pub struct RequestMetrics {
    operation: &'static str,
    start_time: Instant,
}

impl RequestMetrics {
    /// Start timing a request for `operation`
    pub fn start(operation: &'static str) -> Self {
        Self {
            operation,
            start_time: Instant::now(),
        }
    }

    /// Record a response with `status_code`
    pub fn record_complete(&self, status_code: u16) {
        let duration = self.start_time.elapsed();

        counter!(
            "cloud_save_requests_total",
            "operation" => self.operation,
            "status" => status_code.to_string(),
        )
        .increment(1);

        histogram!(
            "cloud_save_request_duration_seconds",
            "operation" => self.operation,
        )
        .record(duration.as_secs_f64());

        if status_code == 429 {
            counter!("cloud_save_429_responses_total", "operation" => self.operation).increment(1);
            warn!(
                operation = self.operation,
                duration_ms = duration.as_millis(),
                "Rate limit response (429) recorded"
            );
        }

        debug!(
            operation = self.operation,
            status = status_code,
            duration_ms = duration.as_millis(),
            "HTTP request completed"
        );
    }

    /// Record a request that produced no response
    pub fn record_network_error(&self) {
        let duration = self.start_time.elapsed();

        counter!(
            "cloud_save_requests_total",
            "operation" => self.operation,
            "status" => "network_error",
        )
        .increment(1);

        warn!(
            operation = self.operation,
            duration_ms = duration.as_millis(),
            "Network error recorded"
        );
    }
}

/// Record a call rejected locally during a rate-limit window
pub fn record_preempted() {
    counter!("cloud_save_preempted_calls_total").increment(1);
}

/// Record a classified failure returned to a caller
pub fn record_failure(reason: CloudSaveErrorReason) {
    counter!("cloud_save_failures_total", "reason" => reason.as_str()).increment(1);
}

/// Check if metrics system is initialized
pub async fn is_initialized() -> bool {
    *METRICS_INITIALIZED.read().await
}
