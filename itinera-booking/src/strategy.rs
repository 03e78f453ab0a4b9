use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use itinera_core::{BookingError, BookingResult};
use itinera_domain::{BookingRequest, BookingType, Ticket};

/// Per-mode booking behavior invoked by the coordinator once the seat
/// lock (where the mode uses one) is held.
#[async_trait]
pub trait BookingStrategy: Send + Sync {
    async fn book_ticket(&self, request: &BookingRequest) -> BookingResult<Ticket>;

    /// Returns false when the ticket does not exist for that user:
    /// cancelling an unknown booking is an idempotent no-op.
    async fn cancel_booking(&self, ticket_id: Uuid, user_id: &str) -> BookingResult<bool>;

    async fn booking_details(
        &self,
        ticket_id: Uuid,
        user_id: &str,
    ) -> BookingResult<Option<Ticket>>;
}

/// Closed map from booking type to strategy. The variant set is fixed;
/// registration happens once at startup.
pub struct StrategyRegistry {
    strategies: HashMap<BookingType, Arc<dyn BookingStrategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    pub fn with_strategy(
        mut self,
        booking_type: BookingType,
        strategy: Arc<dyn BookingStrategy>,
    ) -> Self {
        self.strategies.insert(booking_type, strategy);
        self
    }

    pub fn get(&self, booking_type: BookingType) -> BookingResult<&Arc<dyn BookingStrategy>> {
        self.strategies.get(&booking_type).ok_or_else(|| {
            BookingError::Unsupported(format!("no strategy registered for {booking_type:?}"))
        })
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Stand-in for the unimplemented ground-transport modes.
pub struct StubBookingStrategy {
    mode: &'static str,
}

impl StubBookingStrategy {
    pub fn new(mode: &'static str) -> Self {
        Self { mode }
    }
}

#[async_trait]
impl BookingStrategy for StubBookingStrategy {
    async fn book_ticket(&self, _request: &BookingRequest) -> BookingResult<Ticket> {
        Err(BookingError::Unsupported(format!(
            "{} booking is not implemented yet",
            self.mode
        )))
    }

    async fn cancel_booking(&self, _ticket_id: Uuid, _user_id: &str) -> BookingResult<bool> {
        Err(BookingError::Unsupported(format!(
            "{} booking is not implemented yet",
            self.mode
        )))
    }

    async fn booking_details(
        &self,
        _ticket_id: Uuid,
        _user_id: &str,
    ) -> BookingResult<Option<Ticket>> {
        Err(BookingError::Unsupported(format!(
            "{} booking is not implemented yet",
            self.mode
        )))
    }
}
