//! # Key Phrase Index
//! Precomputed phrase → (polarity, frequency, review positions) mapping.
//!
//! Built once per payload, validated against the corpus it belongs to, and
//! read-only afterwards. Display order within a polarity bucket is the input
//! order; the index never re-sorts.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::payload::{Payload, RawKeyPhrase};
use crate::store::ReviewStore;

/// Sentiment bucket a key phrase belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    pub const ALL: [Polarity; 2] = [Polarity::Positive, Polarity::Negative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Polarity::Positive => "positive",
            Polarity::Negative => "negative",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyPhrase {
    pub text: String,
    pub polarity: Polarity,
    /// Number of reviews containing the phrase; always `review_indices.len()`.
    pub frequency: usize,
    /// Average upstream sentiment score, informational only.
    pub sentiment: f32,
    /// Ascending, de-duplicated corpus positions.
    pub review_indices: Vec<usize>,
}

impl KeyPhrase {
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.review_indices.binary_search(&index).is_ok()
    }

    fn from_raw(raw: &RawKeyPhrase, polarity: Polarity, corpus_size: usize) -> Result<Self> {
        if let Some(&bad) = raw.review_indices.iter().find(|&&i| i >= corpus_size) {
            return Err(Error::InvalidPhraseIndex(format!(
                "phrase '{}' references review {bad}, corpus has {corpus_size}",
                raw.phrase
            )));
        }

        let mut review_indices = raw.review_indices.clone();
        review_indices.sort_unstable();
        review_indices.dedup();

        if raw.frequency != review_indices.len() {
            return Err(Error::InvalidPhraseIndex(format!(
                "phrase '{}' has frequency {} but {} distinct reviews",
                raw.phrase,
                raw.frequency,
                review_indices.len()
            )));
        }

        Ok(Self {
            text: raw.phrase.clone(),
            polarity,
            frequency: raw.frequency,
            sentiment: raw.sentiment,
            review_indices,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeyPhraseIndex {
    positive: Vec<KeyPhrase>,
    negative: Vec<KeyPhrase>,
    by_text: HashMap<String, (Polarity, usize)>,
}

impl KeyPhraseIndex {
    /// Build the index in one pass over the positive then negative lists.
    ///
    /// Fails with [`Error::InvalidPhraseIndex`] on an out-of-range position, a
    /// frequency that disagrees with its positions, or a phrase text listed
    /// more than once. No partial index is ever returned.
    pub fn build(payload: &Payload, store: &ReviewStore) -> Result<Self> {
        let size = store.size();
        let mut index = Self::default();

        for polarity in Polarity::ALL {
            let raw_list = match polarity {
                Polarity::Positive => &payload.key_phrases.positive,
                Polarity::Negative => &payload.key_phrases.negative,
            };
            for raw in raw_list {
                let phrase = KeyPhrase::from_raw(raw, polarity, size)?;
                let slot = index.all_phrases(polarity).len();
                if let Some((prev, _)) = index
                    .by_text
                    .insert(phrase.text.clone(), (polarity, slot))
                {
                    return Err(Error::InvalidPhraseIndex(format!(
                        "phrase '{}' listed as {} and {}",
                        phrase.text,
                        prev.as_str(),
                        polarity.as_str()
                    )));
                }
                index.bucket_mut(polarity).push(phrase);
            }
        }

        Ok(index)
    }

    fn bucket_mut(&mut self, polarity: Polarity) -> &mut Vec<KeyPhrase> {
        match polarity {
            Polarity::Positive => &mut self.positive,
            Polarity::Negative => &mut self.negative,
        }
    }

    pub fn lookup(&self, text: &str) -> Option<&KeyPhrase> {
        let &(polarity, slot) = self.by_text.get(text)?;
        self.all_phrases(polarity).get(slot)
    }

    /// Lookup restricted to one polarity bucket.
    pub fn lookup_in(&self, text: &str, polarity: Polarity) -> Option<&KeyPhrase> {
        self.lookup(text).filter(|p| p.polarity == polarity)
    }

    /// Phrases of one polarity in input order.
    pub fn all_phrases(&self, polarity: Polarity) -> &[KeyPhrase] {
        match polarity {
            Polarity::Positive => &self.positive,
            Polarity::Negative => &self.negative,
        }
    }

    pub fn len(&self) -> usize {
        self.positive.len() + self.negative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{KeyPhraseLists, ProductInfo, RawDistribution, RawReview};

    fn raw_phrase(text: &str, freq: usize, idx: &[usize]) -> RawKeyPhrase {
        RawKeyPhrase {
            phrase: text.to_string(),
            frequency: freq,
            sentiment: 0.5,
            review_indices: idx.to_vec(),
        }
    }

    fn payload(positive: Vec<RawKeyPhrase>, negative: Vec<RawKeyPhrase>) -> Payload {
        let review = RawReview {
            rating: 5,
            author_name: String::new(),
            review_header: String::new(),
            review_text: String::new(),
            helpful_count: 0,
            review_posted_date: String::new(),
            review_country: String::new(),
            is_verified: true,
        };
        Payload {
            product_info: ProductInfo {
                name: "p".into(),
                overall_rating: 5.0,
                total_reviews: 4,
                rating_distribution: RawDistribution {
                    five_star: 4,
                    ..Default::default()
                },
                brand: String::new(),
                url: None,
            },
            key_phrases: KeyPhraseLists { positive, negative },
            reviews: vec![review; 4],
        }
    }

    fn build(p: &Payload) -> Result<KeyPhraseIndex> {
        let store = ReviewStore::load(p)?;
        KeyPhraseIndex::build(p, &store)
    }

    #[test]
    fn keeps_input_order_and_sorts_positions() {
        let p = payload(
            vec![
                raw_phrase("sound quality", 3, &[3, 0, 2]),
                raw_phrase("good fit", 1, &[1]),
            ],
            vec![raw_phrase("bad battery", 2, &[1, 2])],
        );
        let idx = build(&p).unwrap();
        let texts: Vec<_> = idx
            .all_phrases(Polarity::Positive)
            .iter()
            .map(|p| p.text.as_str())
            .collect();
        assert_eq!(texts, ["sound quality", "good fit"]);
        assert_eq!(idx.lookup("sound quality").unwrap().review_indices, [0, 2, 3]);
        assert_eq!(idx.lookup("bad battery").unwrap().polarity, Polarity::Negative);
        assert_eq!(idx.len(), 3);
    }

    #[test]
    fn lookup_in_respects_polarity() {
        let p = payload(vec![raw_phrase("good fit", 1, &[1])], vec![]);
        let idx = build(&p).unwrap();
        assert!(idx.lookup_in("good fit", Polarity::Positive).is_some());
        assert!(idx.lookup_in("good fit", Polarity::Negative).is_none());
        assert!(idx.lookup("unknown").is_none());
    }

    #[test]
    fn rejects_out_of_range_position() {
        let p = payload(vec![raw_phrase("good fit", 1, &[4])], vec![]);
        let err = build(&p).unwrap_err();
        assert!(matches!(err, Error::InvalidPhraseIndex(_)), "{err}");
    }

    #[test]
    fn rejects_frequency_mismatch() {
        let p = payload(vec![], vec![raw_phrase("bad battery", 3, &[0, 1])]);
        assert!(matches!(build(&p), Err(Error::InvalidPhraseIndex(_))));

        // duplicates collapse, so a frequency counting them is also rejected
        let p = payload(vec![], vec![raw_phrase("bad battery", 3, &[0, 1, 1])]);
        assert!(matches!(build(&p), Err(Error::InvalidPhraseIndex(_))));
    }

    #[test]
    fn rejects_phrase_in_both_buckets() {
        let p = payload(
            vec![raw_phrase("sound quality", 1, &[0])],
            vec![raw_phrase("sound quality", 1, &[1])],
        );
        let err = build(&p).unwrap_err();
        assert!(err.to_string().contains("positive and negative"), "{err}");
    }
}
