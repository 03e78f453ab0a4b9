use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use itinera_core::BookingError;
use itinera_domain::{BookingRequest, BookingType, Ticket};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", post(create_booking))
        .route("/v1/bookings/{id}", get(booking_details))
        .route("/v1/bookings/{id}/cancel", post(cancel_booking))
}

async fn create_booking(
    State(state): State<AppState>,
    Json(request): Json<BookingRequest>,
) -> Result<Json<Ticket>, AppError> {
    let ticket = state.coordinator.book(&request).await?;
    info!(ticket_id = %ticket.ticket_id, pnr = %ticket.pnr, "booking created");
    Ok(Json(ticket))
}

#[derive(Debug, Deserialize)]
struct BookingScope {
    user_id: String,
    booking_type: BookingType,
}

async fn booking_details(
    State(state): State<AppState>,
    Path(ticket_id): Path<Uuid>,
    Query(scope): Query<BookingScope>,
) -> Result<Json<Ticket>, AppError> {
    let ticket = state
        .coordinator
        .details(ticket_id, &scope.user_id, scope.booking_type)
        .await?
        .ok_or_else(|| BookingError::NotFound(format!("ticket {ticket_id} not found")))?;
    Ok(Json(ticket))
}

#[derive(Debug, Serialize)]
struct CancelResponse {
    cancelled: bool,
}

async fn cancel_booking(
    State(state): State<AppState>,
    Path(ticket_id): Path<Uuid>,
    Json(scope): Json<BookingScope>,
) -> Result<Json<CancelResponse>, AppError> {
    let cancelled = state
        .coordinator
        .cancel(ticket_id, &scope.user_id, scope.booking_type)
        .await?;
    if cancelled {
        info!(%ticket_id, "booking cancelled");
    }
    Ok(Json(CancelResponse { cancelled }))
}
