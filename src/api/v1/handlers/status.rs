/*
 * Responsibility
 * - GET /api/v1/status (gate を通過したことの確認用)
 */
use axum::Json;

use crate::api::v1::dto::status::StatusResponse;

pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        authenticated: true,
    })
}
