//! # Insight Session
//! One user's interactive view over a loaded product.
//!
//! The product (store + phrase index) is shared read-only behind `Arc`; the
//! session exclusively owns its `FilterState`. Every selection event is
//! followed by exactly one synchronous recomputation.

use std::sync::Arc;

use tracing::info;

use crate::engine::{self, DerivedView};
use crate::error::Result;
use crate::filter::{FilterEvent, FilterState};
use crate::payload::Payload;
use crate::phrases::{KeyPhrase, KeyPhraseIndex, Polarity};
use crate::store::{ProductSummary, ReviewStore};

/// A validated product: its corpus, its phrase index and a stable id.
#[derive(Debug, Clone)]
pub struct Product {
    pub id: String,
    pub store: Arc<ReviewStore>,
    pub index: Arc<KeyPhraseIndex>,
}

impl Product {
    /// Validate the payload and build both read-only structures.
    pub fn from_payload(payload: &Payload) -> Result<Self> {
        let store = ReviewStore::load(payload)?;
        let index = KeyPhraseIndex::build(payload, &store)?;
        let id = payload.fingerprint()?;

        info!(
            target: "insights",
            %id,
            name = %store.summary().name,
            reviews = store.size(),
            phrases = index.len(),
            "product loaded"
        );

        Ok(Self {
            id,
            store: Arc::new(store),
            index: Arc::new(index),
        })
    }

    pub fn summary(&self) -> &ProductSummary {
        self.store.summary()
    }

    /// Stateless query: the view for an explicit filter state.
    pub fn view(&self, state: &FilterState) -> DerivedView<'_> {
        engine::apply(&self.store, &self.index, state)
    }

    pub fn session(&self) -> InsightSession {
        InsightSession::new(self)
    }
}

#[derive(Debug, Clone)]
pub struct InsightSession {
    store: Arc<ReviewStore>,
    index: Arc<KeyPhraseIndex>,
    state: FilterState,
}

impl InsightSession {
    pub fn new(product: &Product) -> Self {
        Self {
            store: Arc::clone(&product.store),
            index: Arc::clone(&product.index),
            state: FilterState::default(),
        }
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn summary(&self) -> &ProductSummary {
        self.store.summary()
    }

    pub fn phrases(&self, polarity: Polarity) -> &[KeyPhrase] {
        self.index.all_phrases(polarity)
    }

    /// Apply one selection event and recompute.
    pub fn select(&mut self, event: FilterEvent) -> DerivedView<'_> {
        self.state.apply_event(event);
        self.view()
    }

    /// View for the current state.
    pub fn view(&self) -> DerivedView<'_> {
        engine::apply(&self.store, &self.index, &self.state)
    }
}
