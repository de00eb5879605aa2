// src/lib.rs
// Public library surface for the HTTP binary and integration tests.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod payload;
pub mod phrases;
pub mod registry;
pub mod session;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, router, AppState};
pub use crate::config::InsightsConfig;
pub use crate::engine::{apply, DerivedView};
pub use crate::error::{Error, Result};
pub use crate::filter::{FilterEvent, FilterState, RatingFilter, SentimentFilter};
pub use crate::payload::{FilePayloadProvider, Payload, PayloadProvider};
pub use crate::phrases::{KeyPhrase, KeyPhraseIndex, Polarity};
pub use crate::session::{InsightSession, Product};
pub use crate::store::{ProductSummary, RatingDistribution, Review, ReviewStore};

use tracing::{info, warn};

/// Validate a payload into its frozen review corpus.
pub fn build_store(payload: &Payload) -> Result<ReviewStore> {
    ReviewStore::load(payload)
}

/// Validate the payload's key phrases against an already built corpus.
pub fn build_index(payload: &Payload, store: &ReviewStore) -> Result<KeyPhraseIndex> {
    KeyPhraseIndex::build(payload, store)
}

/// Load every provider's payload into the registry. A payload that fails to
/// fetch or validate is logged and skipped; the rest still load.
pub async fn preload(state: &AppState, providers: &[Box<dyn PayloadProvider>]) -> usize {
    let mut loaded = 0;
    for p in providers {
        let payload = match p.fetch().await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(target: "insights", provider = p.name(), error = %e, "preload fetch failed");
                continue;
            }
        };
        if state.load_payload(&payload).is_ok() {
            loaded += 1;
        }
    }
    loaded
}

/// Full in-process app: config from env/file, preloaded products, router.
pub async fn app() -> anyhow::Result<axum::Router> {
    let cfg = InsightsConfig::load_default()?;
    let state = AppState::new(&cfg);

    let providers: Vec<Box<dyn PayloadProvider>> = cfg
        .preload
        .iter()
        .map(|p| Box::new(FilePayloadProvider::new(p)) as Box<dyn PayloadProvider>)
        .collect();
    let loaded = preload(&state, &providers).await;
    info!(
        target: "insights",
        loaded,
        requested = providers.len(),
        max_products = cfg.max_products,
        "insights app ready"
    );

    create_router(state, &cfg)
}
