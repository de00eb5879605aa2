use axum::{routing::get, Router};
use metrics::{counter, describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub const PAYLOADS_LOADED: &str = "insights_payloads_loaded_total";
pub const PAYLOADS_REJECTED: &str = "insights_payloads_rejected_total";
pub const VIEWS: &str = "insights_views_total";
pub const PRODUCTS_LOADED: &str = "insights_products_loaded";

/// The global recorder can be installed once per process; every router shares it.
static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

#[derive(Clone)]
pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install (or reuse) the Prometheus recorder and describe the series.
    pub fn init() -> anyhow::Result<Self> {
        let handle = HANDLE
            .get_or_try_init(|| {
                let handle = PrometheusBuilder::new().install_recorder()?;
                describe_counter!(PAYLOADS_LOADED, "Payloads accepted into the registry");
                describe_counter!(PAYLOADS_REJECTED, "Payloads failing validation");
                describe_counter!(VIEWS, "Derived views computed");
                describe_gauge!(PRODUCTS_LOADED, "Products currently held in memory");
                Ok::<_, anyhow::Error>(handle)
            })?
            .clone();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router<S>(&self) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

pub fn record_loaded() {
    counter!(PAYLOADS_LOADED).increment(1);
}

/// `reason` is a short label such as `malformed_payload`.
pub fn record_rejected(reason: &'static str) {
    counter!(PAYLOADS_REJECTED, "reason" => reason).increment(1);
}

pub fn record_view() {
    counter!(VIEWS).increment(1);
}
