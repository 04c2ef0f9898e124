use std::sync::{Arc, OnceLock};

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Prometheus-backed application metrics
#[derive(Clone)]
pub struct AppMetrics {
    prometheus_handle: Arc<PrometheusHandle>,
}

impl AppMetrics {
    pub fn new() -> Self {
        let handle = PROMETHEUS_HANDLE.get_or_init(|| {
            let builder = PrometheusBuilder::new()
                .set_buckets_for_metric(
                    Matcher::Full("db_queries_duration_seconds".to_string()),
                    &[0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0],
                )
                .expect("Failed to set buckets for db_queries_duration_seconds");

            // Describe all metrics
            Self::describe_metrics();

            builder
                .install_recorder()
                .expect("Failed to install Prometheus recorder")
        });

        Self {
            prometheus_handle: Arc::new(handle.clone()),
        }
    }

    fn describe_metrics() {
        // Pool metrics
        describe_gauge!(
            "db_pool_ready",
            "Whether the database pool is ready to serve queries (1) or not (0)"
        );
        describe_counter!(
            "db_connect_attempts_total",
            "Total number of pool connection attempts"
        );
        describe_counter!(
            "db_reconnects_total",
            "Total number of reconnect cycles triggered by fatal pool errors"
        );

        // Query metrics
        describe_counter!(
            "db_queries_total",
            "Total number of report queries executed"
        );
        describe_histogram!(
            "db_queries_duration_seconds",
            "Report query duration in seconds"
        );
    }

    /// Render metrics in Prometheus text format.
    pub fn render(&self) -> String {
        self.prometheus_handle.render()
    }

    /// Record one report query execution.
    pub fn record_query(&self, report: &str, ok: bool, duration_secs: f64) {
        counter!(
            "db_queries_total",
            "report" => report.to_string(),
            "status" => if ok { "ok" } else { "error" }.to_string()
        )
        .increment(1);

        histogram!(
            "db_queries_duration_seconds",
            "report" => report.to_string()
        )
        .record(duration_secs);
    }
}
