//! registry.rs — in-memory set of loaded products, bounded by capacity.
//!
//! Oldest product is evicted first once the cap is reached. Re-registering a
//! payload with the same fingerprint replaces nothing and keeps its slot.

use std::sync::RwLock;

use metrics::gauge;
use tracing::info;

use crate::session::Product;

/// Hard ceiling regardless of configuration.
pub const MAX_CAPACITY: usize = 1_000;

#[derive(Debug)]
pub struct ProductRegistry {
    inner: RwLock<Vec<Product>>,
    cap: usize,
}

impl ProductRegistry {
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.clamp(1, MAX_CAPACITY);
        Self {
            inner: RwLock::new(Vec::with_capacity(cap)),
            cap,
        }
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Insert a product; returns `false` if it was already present.
    pub fn insert(&self, product: Product) -> bool {
        let mut v = self.inner.write().expect("registry lock poisoned");
        if v.iter().any(|p| p.id == product.id) {
            return false;
        }
        v.push(product);
        if v.len() > self.cap {
            let excess = v.len() - self.cap;
            for evicted in v.drain(0..excess) {
                info!(target: "insights", id = %evicted.id, "product evicted");
            }
        }
        gauge!(crate::metrics::PRODUCTS_LOADED).set(v.len() as f64);
        true
    }

    pub fn get(&self, id: &str) -> Option<Product> {
        let v = self.inner.read().expect("registry lock poisoned");
        v.iter().find(|p| p.id == id).cloned()
    }

    /// `(id, name)` pairs, oldest first.
    pub fn list(&self) -> Vec<(String, String)> {
        let v = self.inner.read().expect("registry lock poisoned");
        v.iter()
            .map(|p| (p.id.clone(), p.summary().name.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
