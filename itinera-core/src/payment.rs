use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use itinera_domain::Ticket;

use crate::BookingResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentOutcome {
    Completed,
    Pending,
    Failed,
}

/// Provider response for an initiated payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub transaction_id: String,
    pub status: PaymentOutcome,
    pub amount: i64,
    pub currency: String,
    pub payment_url: Option<String>,
}

/// External payment collaborator. A returned `Failed` outcome is a
/// normal business result; an `Err` is a downstream failure and triggers
/// the workflow's compensating rollback.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn initiate_payment(&self, ticket: &Ticket) -> BookingResult<PaymentReceipt>;
}
