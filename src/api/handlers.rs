use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::config::{MatchStrategy, MatchingConfig};
use crate::models::{OrderInput, OrderOutcome, ReceiptSource, ReconciliationReport};
use crate::service::Reconciler;

/// Request body: register rows plus receipt files, already parsed.
#[derive(Debug, Deserialize)]
pub struct ReconcileRequest {
    pub orders: Vec<OrderInput>,
    #[serde(default)]
    pub receipts: Vec<ReceiptSource>,
    /// Overrides the configured threshold for this request.
    pub threshold: Option<f64>,
    pub strategy: Option<MatchStrategy>,
}

#[derive(Debug, Serialize)]
pub struct ReconcileResponse {
    pub success: bool,
    pub message: String,
    pub report: Option<ReconciliationReport>,
    pub orders: Vec<OrderOutcome>,
}

impl ReconcileResponse {
    fn failure(status: StatusCode, message: String) -> Response {
        let response = Self {
            success: false,
            message,
            report: None,
            orders: Vec::new(),
        };
        (status, Json(response)).into_response()
    }
}

/// Liveness probe.
pub async fn health_check() -> &'static str {
    "OK"
}

/// Reconcile the submitted orders against the submitted receipts.
pub async fn reconcile(
    State(defaults): State<MatchingConfig>,
    Json(req): Json<ReconcileRequest>,
) -> Response {
    let config = MatchingConfig {
        threshold: req.threshold.unwrap_or(defaults.threshold),
        strategy: req.strategy.unwrap_or(defaults.strategy),
        ..defaults
    };
    if let Err(e) = config.validate() {
        return ReconcileResponse::failure(StatusCode::BAD_REQUEST, format!("Error: {}", e));
    }

    let ReconcileRequest { orders, receipts, .. } = req;
    let task = tokio::task::spawn_blocking(move || {
        let orders = orders
            .into_iter()
            .enumerate()
            .map(|(row, input)| input.into_order_line(row))
            .collect();
        Reconciler::new(config).reconcile(orders, &receipts)
    });

    match task.await {
        Ok(reconciliation) => {
            let response = ReconcileResponse {
                success: true,
                message: reconciliation.report.summary_line(),
                orders: reconciliation.order_outcomes(),
                report: Some(reconciliation.report),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            tracing::error!("Reconciliation task failed: {}", e);
            ReconcileResponse::failure(StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e))
        }
    }
}
