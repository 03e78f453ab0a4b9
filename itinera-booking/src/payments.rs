use std::time::Duration;

use async_trait::async_trait;

use itinera_core::{BookingError, BookingResult, PaymentGateway, PaymentOutcome, PaymentReceipt};
use itinera_domain::Ticket;

/// Simulated payment provider. Approves everything except three magic
/// user ids used by tests and demos: `fail-payment` raises a gateway
/// error, `decline-payment` returns a failed receipt, and
/// `pending-payment` settles asynchronously.
pub struct MockPaymentGateway {
    latency: Duration,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self {
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for MockPaymentGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn initiate_payment(&self, ticket: &Ticket) -> BookingResult<PaymentReceipt> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if ticket.user_id == "fail-payment" {
            return Err(BookingError::downstream("simulated payment gateway failure"));
        }

        let status = match ticket.user_id.as_str() {
            "decline-payment" => PaymentOutcome::Failed,
            "pending-payment" => PaymentOutcome::Pending,
            _ => PaymentOutcome::Completed,
        };

        Ok(PaymentReceipt {
            transaction_id: format!("mock_txn_{}", ticket.ticket_id.simple()),
            status,
            amount: ticket.total_amount,
            currency: "INR".to_string(),
            payment_url: Some(format!(
                "https://payments.example.test/checkout/{}",
                ticket.ticket_id.simple()
            )),
        })
    }
}
