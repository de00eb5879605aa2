//! # Product payload
//! Wire shape of the per-product dataset handed over by the data provider,
//! plus the provider seam used to obtain it.
//!
//! Nothing here validates invariants; that happens once in
//! [`ReviewStore::load`](crate::store::ReviewStore::load) and
//! [`KeyPhraseIndex::build`](crate::phrases::KeyPhraseIndex::build).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::Result;

/// Complete per-product payload: metadata, tagged key phrases and raw reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub product_info: ProductInfo,
    #[serde(default)]
    pub key_phrases: KeyPhraseLists,
    pub reviews: Vec<RawReview>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub name: String,
    pub overall_rating: f32,
    pub total_reviews: usize,
    pub rating_distribution: RawDistribution,
    #[serde(default)]
    pub brand: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Per-star counts as the provider spells them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDistribution {
    pub one_star: usize,
    pub two_star: usize,
    pub three_star: usize,
    pub four_star: usize,
    pub five_star: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyPhraseLists {
    #[serde(default)]
    pub positive: Vec<RawKeyPhrase>,
    #[serde(default)]
    pub negative: Vec<RawKeyPhrase>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawKeyPhrase {
    pub phrase: String,
    pub frequency: usize,
    /// Average tagger score in `[-1.0, 1.0]`; older payloads omit it.
    #[serde(default)]
    pub sentiment: f32,
    pub review_indices: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReview {
    /// Kept signed so an out-of-range value surfaces as a payload error, not a parse error.
    pub rating: i64,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub review_header: String,
    #[serde(default)]
    pub review_text: String,
    #[serde(default)]
    pub helpful_count: u64,
    #[serde(default)]
    pub review_posted_date: String,
    #[serde(default)]
    pub review_country: String,
    #[serde(default)]
    pub is_verified: bool,
}

impl Payload {
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Stable short id for this payload: first 8 bytes of SHA-256 over its
    /// canonical JSON encoding, hex encoded.
    pub fn fingerprint(&self) -> Result<String> {
        let canonical = serde_json::to_vec(self)?;
        let digest = Sha256::digest(&canonical);
        let mut out = String::with_capacity(16);
        for b in digest.iter().take(8) {
            use std::fmt::Write as _;
            let _ = write!(&mut out, "{:02x}", b);
        }
        Ok(out)
    }
}

/// Anything that can hand over a product payload (file, network fetch, fixture).
#[async_trait::async_trait]
pub trait PayloadProvider: Send + Sync {
    async fn fetch(&self) -> Result<Payload>;
    fn name(&self) -> &'static str;
}

/// Reads a payload from a JSON file on disk.
#[derive(Debug, Clone)]
pub struct FilePayloadProvider {
    path: PathBuf,
}

impl FilePayloadProvider {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl PayloadProvider for FilePayloadProvider {
    async fn fetch(&self) -> Result<Payload> {
        let bytes = tokio::fs::read(&self.path).await?;
        Payload::from_slice(&bytes)
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "product_info": {
            "name": "Widget",
            "overall_rating": 4.0,
            "total_reviews": 1,
            "rating_distribution": {"one_star":0,"two_star":0,"three_star":0,"four_star":1,"five_star":0}
        },
        "reviews": [{"rating": 4, "author_name": "a", "review_header": "h", "review_text": "t",
                     "helpful_count": 0, "review_posted_date": "2024-01-01",
                     "review_country": "US", "is_verified": true}]
    }"#;

    #[test]
    fn key_phrases_and_brand_are_optional() {
        let p = Payload::from_json_str(MINIMAL).unwrap();
        assert!(p.key_phrases.positive.is_empty());
        assert!(p.key_phrases.negative.is_empty());
        assert_eq!(p.product_info.brand, "");
        assert_eq!(p.reviews.len(), 1);
    }

    #[test]
    fn fingerprint_is_stable_and_content_sensitive() {
        let a = Payload::from_json_str(MINIMAL).unwrap();
        let mut b = a.clone();
        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
        assert_eq!(a.fingerprint().unwrap().len(), 16);

        b.reviews[0].review_text.push('!');
        assert_ne!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    }

    #[tokio::test]
    async fn file_provider_reads_json() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("payload.json");
        std::fs::write(&p, MINIMAL).unwrap();

        let provider = FilePayloadProvider::new(&p);
        let payload = provider.fetch().await.unwrap();
        assert_eq!(payload.product_info.name, "Widget");
        assert_eq!(provider.name(), "file");
    }

    #[tokio::test]
    async fn file_provider_missing_file_is_io_error() {
        let provider = FilePayloadProvider::new("does/not/exist.json");
        let err = provider.fetch().await.unwrap_err();
        assert!(matches!(err, crate::error::Error::Io(_)));
    }
}
