use std::collections::HashMap;

use axum::{
    extract::State,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use itinera_core::seat_key::parse_seat_key;
use itinera_core::LockEntry;
use itinera_domain::SeatStatus;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/admin/locks", get(list_locks))
        .route("/v1/admin/locks", delete(clear_locks))
        .route("/v1/admin/seats/release", post(release_seat))
}

async fn list_locks(
    State(state): State<AppState>,
) -> Result<Json<HashMap<String, LockEntry>>, AppError> {
    Ok(Json(state.locks.list_locked().await?))
}

async fn clear_locks(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    state.locks.clear_all().await?;
    info!("all seat locks cleared by operator");
    Ok(Json(serde_json::json!({ "cleared": true })))
}

#[derive(Debug, Deserialize)]
struct SeatReleaseRequest {
    /// Lock-key string, `{flight_id}:{seat_id}:{epoch_seconds}`.
    seat_key: String,
}

#[derive(Debug, Serialize)]
struct SeatReleaseResponse {
    seat_id: String,
    status: SeatStatus,
}

/// Operator escape hatch: force-unlock a seat key and reset the seat to
/// Available without running the booking workflow. Needed because locks
/// have no automatic expiry in the minimal contract.
async fn release_seat(
    State(state): State<AppState>,
    Json(request): Json<SeatReleaseRequest>,
) -> Result<Json<SeatReleaseResponse>, AppError> {
    let (flight_id, seat_id, _flight_time) = parse_seat_key(&request.seat_key)?;

    state.locks.unlock(&request.seat_key).await?;
    state
        .engine
        .update_seat_status(flight_id, &seat_id, SeatStatus::Available)
        .await?;

    info!(%flight_id, seat_id, "seat force-released by operator");
    Ok(Json(SeatReleaseResponse {
        seat_id,
        status: SeatStatus::Available,
    }))
}
