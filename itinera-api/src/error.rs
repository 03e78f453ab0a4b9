use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use itinera_core::BookingError;

#[derive(Debug)]
pub enum AppError {
    Booking(BookingError),
    Internal(anyhow::Error),
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        Self::Booking(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

/// User-visible mapping of the engine's error taxonomy: contention is a
/// conflict, sequencing errors are the client's fault, downstream and
/// unclassified failures stay opaque.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Booking(BookingError::SeatBookingInProgress) => (
                StatusCode::CONFLICT,
                "seat booking already in progress, retry another seat".to_string(),
            ),
            AppError::Booking(BookingError::NotFound(msg)) => (StatusCode::NOT_FOUND, msg),
            AppError::Booking(BookingError::InvalidState(msg)) => (StatusCode::BAD_REQUEST, msg),
            AppError::Booking(BookingError::Unsupported(msg)) => (StatusCode::BAD_REQUEST, msg),
            AppError::Booking(BookingError::Downstream(err)) => {
                tracing::error!("downstream failure: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::Internal(err) => {
                tracing::error!("Internal Server Error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: BookingError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn taxonomy_maps_to_expected_statuses() {
        assert_eq!(
            status_of(BookingError::SeatBookingInProgress),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(BookingError::NotFound("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(BookingError::InvalidState("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(BookingError::Unsupported("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(BookingError::downstream("x")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
