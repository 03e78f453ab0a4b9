use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Closed set of booking variants. Only Flight has a real workflow today;
/// the others are registered stubs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingType {
    Flight,
    Bus,
    Train,
    Car,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    PaymentPending,
    PaymentCompleted,
    PaymentFailed,
    RefundInitiated,
    RefundCompleted,
}

/// A traveler's booking record. Created Pending at reservation time,
/// moved to Confirmed/Failed after payment, Cancelled on explicit
/// cancellation. Owned exclusively by the flight booking workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_id: Uuid,
    pub user_id: String,
    pub pnr: String,
    pub booking_type: BookingType,
    pub booking_status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub flight_id: Uuid,
    pub seat_id: String,
    pub total_amount: i64,
    pub segment_details: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: String,
        booking_type: BookingType,
        flight_id: Uuid,
        seat_id: String,
        total_amount: i64,
        pnr: String,
        segment_details: serde_json::Value,
    ) -> Self {
        let now = Utc::now();
        Self {
            ticket_id: Uuid::new_v4(),
            user_id,
            pnr,
            booking_type,
            booking_status: BookingStatus::Pending,
            payment_status: PaymentStatus::PaymentPending,
            flight_id,
            seat_id,
            total_amount,
            segment_details,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn update_status(&mut self, booking: BookingStatus, payment: PaymentStatus) {
        self.booking_status = booking;
        self.payment_status = payment;
        self.updated_at = Utc::now();
    }

    pub fn cancel(&mut self) {
        self.booking_status = BookingStatus::Cancelled;
        self.updated_at = Utc::now();
    }
}
