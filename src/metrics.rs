// src/metrics.rs
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("feed_polls_total", "Scheduled poll ticks per feed.");
        describe_counter!(
            "feed_poll_errors_total",
            "Polls that failed to fetch; baseline kept."
        );
        describe_counter!(
            "feed_poll_skipped_total",
            "Ticks skipped because the previous poll of the feed was still running."
        );
        describe_counter!("feed_new_items_total", "Items not present in the previous poll.");
        describe_counter!("feed_items_parsed_total", "Items parsed from fetched feeds.");
        describe_counter!("notifications_sent_total", "Pushes accepted by the endpoint.");
        describe_counter!(
            "notifications_suppressed_total",
            "New items classified as ignore/super_ignore."
        );
        describe_counter!("notifications_failed_total", "Pushes that failed; not retried.");
        describe_histogram!("feed_fetch_ms", "Feed fetch + parse time in milliseconds.");
    });
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Call once per process.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new().install_recorder()?;
        ensure_metrics_described();
        Ok(Self { handle })
    }
}
