// src/config.rs
//! Service configuration: registry size, payloads to preload, CORS policy.
//!
//! Resolution order:
//! 1) $INSIGHTS_CONFIG_PATH (must exist)
//! 2) config/insights.toml
//! 3) built-in defaults
//!
//! `INSIGHTS_MAX_PRODUCTS` overrides `max_products` after the file is read.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::registry::MAX_CAPACITY;

pub const DEFAULT_CONFIG_PATH: &str = "config/insights.toml";
pub const ENV_CONFIG_PATH: &str = "INSIGHTS_CONFIG_PATH";
pub const ENV_MAX_PRODUCTS: &str = "INSIGHTS_MAX_PRODUCTS";

fn default_max_products() -> usize {
    32
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsConfig {
    /// Loaded products kept in memory; oldest evicted first.
    #[serde(default = "default_max_products")]
    pub max_products: usize,
    /// Payload files loaded at startup.
    #[serde(default)]
    pub preload: Vec<PathBuf>,
    #[serde(default = "default_true")]
    pub cors_permissive: bool,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            max_products: default_max_products(),
            preload: Vec::new(),
            cors_permissive: true,
        }
    }
}

impl InsightsConfig {
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading insights config from {}", path.display()))?;
        let cfg: InsightsConfig = toml::from_str(&content)
            .with_context(|| format!("parsing insights config {}", path.display()))?;
        cfg.validated()
    }

    pub fn load_default() -> Result<Self> {
        let cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else {
            let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default_p.exists() {
                Self::load_from(&default_p)?
            } else {
                Self::default()
            }
        };
        cfg.with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(raw) = std::env::var(ENV_MAX_PRODUCTS) {
            self.max_products = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_MAX_PRODUCTS}={raw} is not a number"))?;
        }
        self.validated()
    }

    fn validated(self) -> Result<Self> {
        if self.max_products == 0 {
            anyhow::bail!("max_products must be at least 1");
        }
        if self.max_products > MAX_CAPACITY {
            anyhow::bail!(
                "max_products {} exceeds the registry ceiling of {MAX_CAPACITY}",
                self.max_products
            );
        }
        Ok(self)
    }
}
