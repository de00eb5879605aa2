//! # Review Store
//! Frozen, validated review corpus of one product plus its summary metadata.
//!
//! Built once from a [`Payload`]; there are no mutation operations after
//! [`ReviewStore::load`]. Reviews are identified by their position.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::payload::{Payload, RawDistribution, RawReview};

/// Star ratings run 1..=5.
pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// One submitted review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub rating: u8,
    pub author: String,
    pub header: String,
    pub text: String,
    pub helpful_count: u64,
    pub posted_date: String,
    pub country: String,
    pub is_verified: bool,
}

impl Review {
    fn from_raw(pos: usize, raw: &RawReview) -> Result<Self> {
        let rating = u8::try_from(raw.rating)
            .ok()
            .filter(|r| (MIN_RATING..=MAX_RATING).contains(r))
            .ok_or_else(|| {
                Error::MalformedPayload(format!(
                    "review {pos} has rating {} outside {MIN_RATING}..={MAX_RATING}",
                    raw.rating
                ))
            })?;

        Ok(Self {
            rating,
            author: raw.author_name.clone(),
            header: raw.review_header.clone(),
            text: raw.review_text.clone(),
            helpful_count: raw.helpful_count,
            posted_date: raw.review_posted_date.clone(),
            country: raw.review_country.clone(),
            is_verified: raw.is_verified,
        })
    }
}

/// Review counts per star value; index 0 holds one-star reviews.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawDistribution", into = "RawDistribution")]
pub struct RatingDistribution {
    counts: [usize; 5],
}

impl RatingDistribution {
    pub fn new(counts: [usize; 5]) -> Self {
        Self { counts }
    }

    /// Tally the ratings of the given reviews.
    pub fn from_reviews<'a>(reviews: impl IntoIterator<Item = &'a Review>) -> Self {
        let mut counts = [0usize; 5];
        for r in reviews {
            if (MIN_RATING..=MAX_RATING).contains(&r.rating) {
                counts[(r.rating - MIN_RATING) as usize] += 1;
            }
        }
        Self { counts }
    }

    /// Count for a star value; 0 for anything outside 1..=5.
    pub fn get(&self, star: u8) -> usize {
        if (MIN_RATING..=MAX_RATING).contains(&star) {
            self.counts[(star - MIN_RATING) as usize]
        } else {
            0
        }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Sum of the buckets, `None` if it does not fit in a `usize`.
    pub fn checked_total(&self) -> Option<usize> {
        self.counts.iter().try_fold(0usize, |acc, &n| acc.checked_add(n))
    }

    pub fn counts(&self) -> [usize; 5] {
        self.counts
    }
}

impl From<RawDistribution> for RatingDistribution {
    fn from(d: RawDistribution) -> Self {
        Self::new([
            d.one_star,
            d.two_star,
            d.three_star,
            d.four_star,
            d.five_star,
        ])
    }
}

impl From<RatingDistribution> for RawDistribution {
    fn from(d: RatingDistribution) -> Self {
        let [one_star, two_star, three_star, four_star, five_star] = d.counts;
        Self {
            one_star,
            two_star,
            three_star,
            four_star,
            five_star,
        }
    }
}

/// Product-level metadata. `overall_rating` is supplied by the provider and
/// treated as authoritative; it is never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub name: String,
    pub overall_rating: f32,
    pub total_reviews: usize,
    pub brand: String,
    pub rating_distribution: RatingDistribution,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Immutable review corpus.
#[derive(Debug, Clone)]
pub struct ReviewStore {
    summary: ProductSummary,
    reviews: Vec<Review>,
}

impl ReviewStore {
    /// Validate the payload and freeze its corpus.
    ///
    /// Fails with [`Error::MalformedPayload`] when the rating distribution does
    /// not sum to `total_reviews`, a bucket exceeds the total, the overall
    /// rating is outside 0..=5, or any review rating is outside 1..=5.
    pub fn load(payload: &Payload) -> Result<Self> {
        let info = &payload.product_info;
        let distribution = RatingDistribution::from(info.rating_distribution);

        for star in MIN_RATING..=MAX_RATING {
            let n = distribution.get(star);
            if n > info.total_reviews {
                return Err(Error::MalformedPayload(format!(
                    "{star}-star bucket ({n}) exceeds total_reviews ({})",
                    info.total_reviews
                )));
            }
        }
        let sum = distribution.checked_total().ok_or_else(|| {
            Error::MalformedPayload("rating distribution sum overflows".to_string())
        })?;
        if sum != info.total_reviews {
            return Err(Error::MalformedPayload(format!(
                "rating distribution sums to {sum} but total_reviews is {}",
                info.total_reviews
            )));
        }
        if !info.overall_rating.is_finite() || !(0.0..=5.0).contains(&info.overall_rating) {
            return Err(Error::MalformedPayload(format!(
                "overall_rating {} outside 0..=5",
                info.overall_rating
            )));
        }

        let reviews = payload
            .reviews
            .iter()
            .enumerate()
            .map(|(i, raw)| Review::from_raw(i, raw))
            .collect::<Result<Vec<_>>>()?;

        if reviews.len() != info.total_reviews {
            // Providers often ship a sample of the full review population.
            debug!(
                target: "insights",
                corpus = reviews.len(),
                total = info.total_reviews,
                "corpus is a partial sample"
            );
        }

        Ok(Self {
            summary: ProductSummary {
                name: info.name.clone(),
                overall_rating: info.overall_rating,
                total_reviews: info.total_reviews,
                brand: info.brand.clone(),
                rating_distribution: distribution,
                url: info.url.clone(),
            },
            reviews,
        })
    }

    pub fn review_at(&self, index: usize) -> Option<&Review> {
        self.reviews.get(index)
    }

    /// Number of reviews in the corpus.
    pub fn size(&self) -> usize {
        self.reviews.len()
    }

    pub fn summary(&self) -> &ProductSummary {
        &self.summary
    }

    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }
}
