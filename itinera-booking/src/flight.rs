use std::sync::Arc;

use async_trait::async_trait;
use rand::Rng;
use tracing::{error, info};
use uuid::Uuid;

use itinera_core::{
    BookingError, BookingResult, PaymentGateway, PaymentOutcome, TicketStore,
};
use itinera_domain::{
    BookingDetails, BookingRequest, BookingStatus, BookingType, FlightDetails, PaymentStatus,
    SeatInfo, Ticket,
};

use crate::availability::SegmentAvailabilityEngine;
use crate::strategy::BookingStrategy;

/// Flight booking saga: validate segment → reserve → create ticket →
/// pay → confirm. Steps after the reservation span three independently
/// persisted stores with no shared transaction, so any failure there
/// triggers one compensating seat rollback before the error is
/// re-raised unchanged.
pub struct FlightBookingWorkflow {
    engine: Arc<SegmentAvailabilityEngine>,
    tickets: Arc<dyn TicketStore>,
    payments: Arc<dyn PaymentGateway>,
}

impl FlightBookingWorkflow {
    pub fn new(
        engine: Arc<SegmentAvailabilityEngine>,
        tickets: Arc<dyn TicketStore>,
        payments: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            engine,
            tickets,
            payments,
        }
    }

    /// Ticket creation, payment and confirmation. Runs only after the
    /// seat was blocked; the caller compensates on error.
    async fn complete_booking(
        &self,
        request: &BookingRequest,
        details: &FlightDetails,
        seat: &SeatInfo,
    ) -> BookingResult<Ticket> {
        let segment_details = serde_json::json!({
            "source": details.source,
            "destination": details.destination,
            "travel_date": details.travel_date,
            "flight_time": details.flight_time,
            "seat_number": seat.seat_number,
            "seat_class": seat.seat_class,
            "base_fare": seat.price,
            // No fare rules yet; recorded so downstream consumers see
            // the full fare breakdown shape from day one.
            "discounts": 0,
        });

        let ticket = Ticket::new(
            request.user_id.clone(),
            BookingType::Flight,
            details.flight_id,
            details.seat_id.clone(),
            seat.price,
            generate_pnr(),
            segment_details,
        );
        let mut ticket = self.tickets.save(ticket).await?;

        let receipt = self.payments.initiate_payment(&ticket).await?;
        match receipt.status {
            PaymentOutcome::Completed => {
                ticket.update_status(BookingStatus::Confirmed, PaymentStatus::PaymentCompleted);
            }
            PaymentOutcome::Pending => {
                // Payment still settling; the ticket stays Pending.
            }
            PaymentOutcome::Failed => {
                ticket.update_status(BookingStatus::Failed, PaymentStatus::PaymentFailed);
            }
        }
        let ticket = self.tickets.save(ticket).await?;

        self.engine
            .confirm_blocked_seat(details.flight_id, &details.seat_id)
            .await?;

        info!(
            ticket_id = %ticket.ticket_id,
            pnr = %ticket.pnr,
            status = ?ticket.booking_status,
            "flight booking completed"
        );
        Ok(ticket)
    }
}

#[async_trait]
impl BookingStrategy for FlightBookingWorkflow {
    async fn book_ticket(&self, request: &BookingRequest) -> BookingResult<Ticket> {
        let BookingDetails::Flight(details) = &request.details else {
            return Err(BookingError::Unsupported(
                "flight workflow received a non-flight request".to_string(),
            ));
        };

        let open_seats = self.engine.available_seats(details.flight_id).await?;
        if open_seats.is_empty() {
            return Err(BookingError::NotFound("no available seats".to_string()));
        }

        let seat = open_seats
            .iter()
            .find(|s| s.seat_id == details.seat_id)
            .cloned()
            .ok_or_else(|| {
                BookingError::NotFound("requested seat is not available".to_string())
            })?;

        let reserved = self
            .engine
            .book_seat_for_segment(
                details.flight_id,
                details.travel_date,
                &details.seat_id,
                &details.source,
                &details.destination,
            )
            .await?;
        if !reserved {
            return Err(BookingError::InvalidState(
                "failed to book seat for segment".to_string(),
            ));
        }

        match self.complete_booking(request, details, &seat).await {
            Ok(ticket) => Ok(ticket),
            Err(err) => {
                // Compensating action. Best effort: its own failure is
                // logged and never masks the original error.
                if let Err(rollback_err) = self
                    .engine
                    .release_blocked_seat(details.flight_id, &details.seat_id)
                    .await
                {
                    error!(
                        flight_id = %details.flight_id,
                        seat_id = %details.seat_id,
                        "seat rollback failed: {rollback_err}"
                    );
                }
                Err(err)
            }
        }
    }

    async fn cancel_booking(&self, ticket_id: Uuid, user_id: &str) -> BookingResult<bool> {
        let Some(mut ticket) = self.tickets.find_by_id_and_user(ticket_id, user_id).await? else {
            return Ok(false);
        };

        ticket.cancel();
        self.tickets.save(ticket).await?;
        // The seat is not released here; operators use the admin
        // release path when a cancelled seat should go back on sale.
        Ok(true)
    }

    async fn booking_details(
        &self,
        ticket_id: Uuid,
        user_id: &str,
    ) -> BookingResult<Option<Ticket>> {
        self.tickets.find_by_id_and_user(ticket_id, user_id).await
    }
}

/// Human-facing booking reference: six uppercase alphanumerics.
fn generate_pnr() -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
    let mut rng = rand::thread_rng();
    (0..6)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pnr_is_six_uppercase_alphanumerics() {
        let pnr = generate_pnr();
        assert_eq!(pnr.len(), 6);
        assert!(pnr.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }
}
