//! # Filter Engine
//! Pure, testable logic that maps `(store, index, state)` → `DerivedView`.
//! No I/O and no caching; every call recomputes from the full corpus.
//!
//! Policy: rating, phrase and sentiment restrictions compose with AND.
//! A phrase that cannot be resolved (unknown, or outside the selected
//! sentiment bucket) yields an empty view rather than being ignored. With no
//! phrase selected the sentiment filter has no effect: reviews carry no
//! polarity of their own.

use serde::Serialize;
use tracing::debug;

use crate::filter::FilterState;
use crate::phrases::{KeyPhrase, KeyPhraseIndex};
use crate::store::{RatingDistribution, Review, ReviewStore};

/// Visible subset of the corpus for exactly one `FilterState`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedView<'a> {
    /// Ascending corpus positions of the visible reviews.
    pub indices: Vec<usize>,
    pub reviews: Vec<&'a Review>,
    pub count: usize,
    /// Star counts over the visible reviews only.
    pub distribution: RatingDistribution,
    /// Verified-purchase reviews among the visible ones.
    pub verified: usize,
}

impl<'a> DerivedView<'a> {
    fn from_indices(store: &'a ReviewStore, indices: Vec<usize>) -> Self {
        let reviews: Vec<&Review> = indices
            .iter()
            .filter_map(|&i| store.review_at(i))
            .collect();
        let distribution = RatingDistribution::from_reviews(reviews.iter().copied());
        let verified = reviews.iter().filter(|r| r.is_verified).count();
        Self {
            count: indices.len(),
            indices,
            reviews,
            distribution,
            verified,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Resolve the selected phrase, scoped to the sentiment bucket when one is set.
/// `None` means the selection cannot be resolved; `Some(None)` means no phrase is selected.
fn resolve_phrase<'i>(
    index: &'i KeyPhraseIndex,
    state: &FilterState,
) -> Option<Option<&'i KeyPhrase>> {
    let text = match state.phrase.as_deref() {
        None => return Some(None),
        Some(t) => t,
    };
    let found = match state.sentiment.polarity() {
        Some(polarity) => index.lookup_in(text, polarity),
        None => index.lookup(text),
    };
    found.map(Some)
}

/// Recompute the visible reviews and their aggregates.
pub fn apply<'a>(
    store: &'a ReviewStore,
    index: &KeyPhraseIndex,
    state: &FilterState,
) -> DerivedView<'a> {
    // 1) Phrase restriction first: an unresolved phrase empties the view outright.
    let phrase = match resolve_phrase(index, state) {
        Some(p) => p,
        None => {
            debug!(
                target: "insights",
                phrase = ?state.phrase,
                sentiment = ?state.sentiment,
                "phrase filter unresolved; empty view"
            );
            return DerivedView::from_indices(store, Vec::new());
        }
    };

    // 2) Rating restriction over the phrase positions (already ascending) or
    //    the full range; corpus order is preserved either way.
    let keep = |i: &usize| {
        store
            .review_at(*i)
            .is_some_and(|r| state.rating.matches(r.rating))
    };
    let indices: Vec<usize> = match phrase {
        Some(p) => p.review_indices.iter().copied().filter(keep).collect(),
        None => (0..store.size()).filter(keep).collect(),
    };

    let view = DerivedView::from_indices(store, indices);
    debug!(target: "insights", count = view.count, ?state, "view recomputed");
    view
}
