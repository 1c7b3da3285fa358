use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::Order;
use tracing::{error, info};

use crate::state::AppState;

/// Get a single order by its UID, cache first
pub async fn get_order_handler(
    State(state): State<AppState>,
    Path(order_uid): Path<String>,
) -> Result<Json<Order>, (StatusCode, String)> {
    if order_uid.trim().is_empty() {
        return Err(missing_order_uid());
    }

    match state.reader.lookup(&order_uid).await {
        Ok(Some(order)) => Ok(Json(order)),
        Ok(None) => {
            info!(order_uid = %order_uid, "Order not found");
            Err((
                StatusCode::NOT_FOUND,
                format!("Order not found: {}", order_uid),
            ))
        }
        Err(e) => {
            error!(order_uid = %order_uid, error = %e, "Failed to fetch order");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch order".to_string(),
            ))
        }
    }
}

/// `GET /api/order/` with no UID segment
pub async fn missing_order_uid_handler() -> (StatusCode, String) {
    missing_order_uid()
}

fn missing_order_uid() -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, "order_uid is required".to_string())
}
