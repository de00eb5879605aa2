//! # Filter State
//! Current selection along three independent dimensions (rating, phrase,
//! sentiment bucket) and the rules for moving between selections.
//!
//! Policy: a selection event replaces only its own dimension. Re-selecting the
//! active phrase clears it (click-to-toggle); rating and sentiment selections
//! simply overwrite.

use serde::{Deserialize, Serialize};

use crate::phrases::Polarity;
use crate::store::{MAX_RATING, MIN_RATING};

/// Star rating restriction. Serialized as `null` (all) or the star value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Option<u8>", into = "Option<u8>")]
pub enum RatingFilter {
    #[default]
    All,
    Stars(u8),
}

impl RatingFilter {
    /// Restriction to one star value; `None` outside 1..=5.
    pub fn stars(star: u8) -> Option<Self> {
        (MIN_RATING..=MAX_RATING)
            .contains(&star)
            .then_some(RatingFilter::Stars(star))
    }

    #[inline]
    pub fn matches(&self, rating: u8) -> bool {
        match self {
            RatingFilter::All => true,
            RatingFilter::Stars(s) => *s == rating,
        }
    }
}

impl TryFrom<Option<u8>> for RatingFilter {
    type Error = String;

    fn try_from(v: Option<u8>) -> Result<Self, Self::Error> {
        match v {
            None => Ok(RatingFilter::All),
            Some(s) => RatingFilter::stars(s)
                .ok_or_else(|| format!("rating filter {s} outside {MIN_RATING}..={MAX_RATING}")),
        }
    }
}

impl From<RatingFilter> for Option<u8> {
    fn from(f: RatingFilter) -> Self {
        match f {
            RatingFilter::All => None,
            RatingFilter::Stars(s) => Some(s),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentFilter {
    #[default]
    All,
    Positive,
    Negative,
}

impl SentimentFilter {
    /// Polarity bucket phrase lookups are scoped to, if any.
    pub fn polarity(&self) -> Option<Polarity> {
        match self {
            SentimentFilter::All => None,
            SentimentFilter::Positive => Some(Polarity::Positive),
            SentimentFilter::Negative => Some(Polarity::Negative),
        }
    }
}

/// Full selection. The default value restricts nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    pub rating: RatingFilter,
    #[serde(default)]
    pub phrase: Option<String>,
    #[serde(default)]
    pub sentiment: SentimentFilter,
}

/// A discrete user selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FilterEvent {
    Rating(RatingFilter),
    Phrase(String),
    Sentiment(SentimentFilter),
    Reset,
}

impl FilterState {
    pub fn is_unrestricted(&self) -> bool {
        *self == FilterState::default()
    }

    pub fn select_rating(&mut self, rating: RatingFilter) {
        self.rating = rating;
    }

    /// Select `text`, or clear the phrase filter if `text` is already active.
    pub fn select_phrase(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.phrase.as_deref() == Some(text.as_str()) {
            self.phrase = None;
        } else {
            self.phrase = Some(text);
        }
    }

    pub fn select_sentiment(&mut self, sentiment: SentimentFilter) {
        self.sentiment = sentiment;
    }

    pub fn reset(&mut self) {
        *self = FilterState::default();
    }

    pub fn apply_event(&mut self, event: FilterEvent) {
        match event {
            FilterEvent::Rating(r) => self.select_rating(r),
            FilterEvent::Phrase(p) => self.select_phrase(p),
            FilterEvent::Sentiment(s) => self.select_sentiment(s),
            FilterEvent::Reset => self.reset(),
        }
    }

    /// Owned variant of [`apply_event`](Self::apply_event).
    pub fn with_event(mut self, event: FilterEvent) -> Self {
        self.apply_event(event);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_restricts_nothing() {
        let s = FilterState::default();
        assert_eq!(s.rating, RatingFilter::All);
        assert_eq!(s.phrase, None);
        assert_eq!(s.sentiment, SentimentFilter::All);
        assert!(s.is_unrestricted());
    }

    #[test]
    fn phrase_reselect_toggles_off() {
        let mut s = FilterState::default();
        s.select_phrase("battery life");
        assert_eq!(s.phrase.as_deref(), Some("battery life"));
        s.select_phrase("battery life");
        assert_eq!(s.phrase, None);
    }

    #[test]
    fn selecting_other_phrase_replaces() {
        let mut s = FilterState::default();
        s.select_phrase("battery life");
        s.select_phrase("sound quality");
        assert_eq!(s.phrase.as_deref(), Some("sound quality"));
    }

    #[test]
    fn each_event_touches_only_its_dimension() {
        let s = FilterState::default()
            .with_event(FilterEvent::Rating(RatingFilter::Stars(5)))
            .with_event(FilterEvent::Phrase("battery life".into()))
            .with_event(FilterEvent::Sentiment(SentimentFilter::Negative));
        assert_eq!(s.rating, RatingFilter::Stars(5));
        assert_eq!(s.phrase.as_deref(), Some("battery life"));
        assert_eq!(s.sentiment, SentimentFilter::Negative);

        let s = s.with_event(FilterEvent::Rating(RatingFilter::All));
        assert_eq!(s.rating, RatingFilter::All);
        assert_eq!(s.phrase.as_deref(), Some("battery life"));
        assert_eq!(s.sentiment, SentimentFilter::Negative);

        // rating re-selection does not toggle
        let s = s
            .with_event(FilterEvent::Rating(RatingFilter::Stars(3)))
            .with_event(FilterEvent::Rating(RatingFilter::Stars(3)));
        assert_eq!(s.rating, RatingFilter::Stars(3));

        assert!(s.with_event(FilterEvent::Reset).is_unrestricted());
    }

    #[test]
    fn rating_filter_rejects_out_of_range() {
        assert_eq!(RatingFilter::stars(0), None);
        assert_eq!(RatingFilter::stars(6), None);
        assert_eq!(RatingFilter::stars(4), Some(RatingFilter::Stars(4)));

        assert!(serde_json::from_str::<FilterState>(r#"{"rating": 7}"#).is_err());
    }

    #[test]
    fn wire_shape() {
        let s: FilterState =
            serde_json::from_str(r#"{"rating": 5, "phrase": "good fit", "sentiment": "positive"}"#)
                .unwrap();
        assert_eq!(s.rating, RatingFilter::Stars(5));
        assert_eq!(s.sentiment, SentimentFilter::Positive);

        let empty: FilterState = serde_json::from_str("{}").unwrap();
        assert!(empty.is_unrestricted());

        let ev: FilterEvent = serde_json::from_str(r#"{"kind": "phrase", "value": "x"}"#).unwrap();
        assert_eq!(ev, FilterEvent::Phrase("x".into()));
        let ev: FilterEvent = serde_json::from_str(r#"{"kind": "reset"}"#).unwrap();
        assert_eq!(ev, FilterEvent::Reset);
        let ev: FilterEvent = serde_json::from_str(r#"{"kind": "rating", "value": null}"#).unwrap();
        assert_eq!(ev, FilterEvent::Rating(RatingFilter::All));
    }
}
