pub mod lock;
pub mod notify;
pub mod payment;
pub mod repository;
pub mod seat_key;

pub use lock::{InMemorySeatLockTable, LockEntry, SeatLockTable};
pub use notify::ScheduleNotifier;
pub use payment::{PaymentGateway, PaymentOutcome, PaymentReceipt};
pub use repository::{ScheduleStore, TicketStore};

/// Error taxonomy of the booking engine. Contention, not-found and
/// invalid-state raise immediately with no internal retry; downstream
/// failures trigger exactly one compensating rollback before being
/// re-raised.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    /// Another caller holds (or won the race for) the seat lock. The
    /// remedy is to retry a different seat.
    #[error("seat booking already in progress")]
    SeatBookingInProgress,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("unsupported booking type: {0}")]
    Unsupported(String),

    /// Payment or store failure from a collaborator.
    #[error("downstream failure: {0}")]
    Downstream(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl BookingError {
    pub fn downstream(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Downstream(err.into())
    }
}

pub type BookingResult<T> = Result<T, BookingError>;
