mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;

use crate::config::MatchingConfig;

pub use handlers::{health_check, reconcile, ReconcileRequest, ReconcileResponse};

/// Routes served by `apparel-recon serve`; `defaults` apply to requests that
/// do not override threshold or strategy.
pub fn router(defaults: MatchingConfig) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/reconcile", post(reconcile))
        .with_state(defaults)
        .layer(ServiceBuilder::new())
}
