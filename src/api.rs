//! HTTP surface for the presentation layer.
//!
//! Filter state travels with each request; the server only keeps the loaded
//! products. Every `/view` or `/select` call is one full recomputation.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::config::InsightsConfig;
use crate::engine::DerivedView;
use crate::error::Error;
use crate::filter::{FilterEvent, FilterState};
use crate::metrics::{self, Metrics};
use crate::payload::Payload;
use crate::phrases::{KeyPhrase, Polarity};
use crate::registry::ProductRegistry;
use crate::session::Product;
use crate::store::ProductSummary;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ProductRegistry>,
}

impl AppState {
    pub fn new(cfg: &InsightsConfig) -> Self {
        Self {
            registry: Arc::new(ProductRegistry::with_capacity(cfg.max_products)),
        }
    }

    /// Validate and register a payload. Returns the product and whether it was new.
    pub fn load_payload(&self, payload: &Payload) -> Result<(Product, bool), Error> {
        match Product::from_payload(payload) {
            Ok(product) => {
                let created = self.registry.insert(product.clone());
                if created {
                    metrics::record_loaded();
                }
                Ok((product, created))
            }
            Err(e) => {
                metrics::record_rejected(rejection_label(&e));
                warn!(target: "insights", error = %e, "payload rejected");
                Err(e)
            }
        }
    }

    fn product(&self, id: &str) -> Result<Product, Error> {
        self.registry
            .get(id)
            .ok_or_else(|| Error::NotFound(format!("product {id}")))
    }
}

fn rejection_label(e: &Error) -> &'static str {
    match e {
        Error::MalformedPayload(_) => "malformed_payload",
        Error::InvalidPhraseIndex(_) => "invalid_phrase_index",
        Error::Json(_) => "json",
        _ => "other",
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            e if e.is_validation() => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = serde_json::json!({
            "error": self.to_string(),
            "kind": rejection_label(&self),
        });
        (status, Json(body)).into_response()
    }
}

/// Build the router with the given state and CORS policy.
pub fn create_router(state: AppState, cfg: &InsightsConfig) -> anyhow::Result<Router> {
    let metrics = Metrics::init()?;

    let mut router = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/products", get(list_products).post(load_product))
        .route("/products/{id}", get(product_summary))
        .route("/products/{id}/phrases", get(product_phrases))
        .route("/products/{id}/view", post(product_view))
        .route("/products/{id}/select", post(product_select))
        .merge(metrics.router::<AppState>())
        .with_state(state);

    if cfg.cors_permissive {
        router = router.layer(CorsLayer::very_permissive());
    }
    Ok(router)
}

/// Router with default config, for tests and embedding.
pub fn router(state: AppState) -> anyhow::Result<Router> {
    create_router(state, &InsightsConfig::default())
}

#[derive(Serialize)]
struct LoadedOut {
    id: String,
    created: bool,
    summary: ProductSummary,
}

async fn load_product(State(state): State<AppState>, body: Bytes) -> Result<Response, Error> {
    let payload = Payload::from_slice(&body).inspect_err(|e| {
        metrics::record_rejected(rejection_label(e));
    })?;
    let (product, created) = state.load_payload(&payload)?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    let out = LoadedOut {
        id: product.id.clone(),
        created,
        summary: product.summary().clone(),
    };
    Ok((status, Json(out)).into_response())
}

#[derive(Serialize)]
struct ProductListItem {
    id: String,
    name: String,
}

async fn list_products(State(state): State<AppState>) -> Json<Vec<ProductListItem>> {
    let items = state
        .registry
        .list()
        .into_iter()
        .map(|(id, name)| ProductListItem { id, name })
        .collect();
    Json(items)
}

async fn product_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductSummary>, Error> {
    let product = state.product(&id)?;
    Ok(Json(product.summary().clone()))
}

#[derive(Deserialize)]
struct PhraseQuery {
    #[serde(default)]
    polarity: Option<Polarity>,
}

#[derive(Serialize)]
struct PhrasesOut<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    positive: Option<&'a [KeyPhrase]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    negative: Option<&'a [KeyPhrase]>,
}

async fn product_phrases(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<PhraseQuery>,
) -> Result<Response, Error> {
    let product = state.product(&id)?;
    let pick = |p: Polarity| {
        q.polarity
            .map_or(true, |only| only == p)
            .then(|| product.index.all_phrases(p))
    };
    let out = PhrasesOut {
        positive: pick(Polarity::Positive),
        negative: pick(Polarity::Negative),
    };
    Ok(Json(out).into_response())
}

async fn product_view(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(filter): Json<FilterState>,
) -> Result<Response, Error> {
    let product = state.product(&id)?;
    let view = product.view(&filter);
    metrics::record_view();
    Ok(Json(view).into_response())
}

#[derive(Serialize)]
struct SelectOut<'a> {
    state: &'a FilterState,
    view: DerivedView<'a>,
}

#[derive(Deserialize)]
struct SelectReq {
    #[serde(default)]
    state: FilterState,
    event: FilterEvent,
}

async fn product_select(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SelectReq>,
) -> Result<Response, Error> {
    let product = state.product(&id)?;
    let next = req.state.with_event(req.event);
    let view = product.view(&next);
    metrics::record_view();
    Ok(Json(SelectOut { state: &next, view }).into_response())
}
