//! Payment gateway seam.
//!
//! Checkout charges through the [`PaymentGateway`] trait. The storefront
//! ships with [`SimulatedGateway`], which waits a configured delay and
//! approves every charge.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

/// Error from a payment attempt.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("declined: {0}")]
    Declined(String),
    #[error("gateway unavailable: {0}")]
    Unavailable(String),
}

/// A single charge.
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub order_id: String,
    pub payment_method: String,
    pub amount_cents: i64,
}

/// Proof of an approved charge.
#[derive(Debug, Clone)]
pub struct PaymentReceipt {
    pub reference: String,
    pub processing_time: Duration,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, request: &PaymentRequest) -> Result<PaymentReceipt, PaymentError>;
}

/// Approves every charge after a fixed delay.
pub struct SimulatedGateway {
    delay: Duration,
}

impl SimulatedGateway {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn charge(&self, request: &PaymentRequest) -> Result<PaymentReceipt, PaymentError> {
        let started = Instant::now();
        debug!(
            order_id = %request.order_id,
            payment_method = %request.payment_method,
            amount_cents = request.amount_cents,
            "Simulating payment"
        );

        tokio::time::sleep(self.delay).await;

        Ok(PaymentReceipt {
            reference: format!("SIM-{}", hex::encode_upper(&Uuid::new_v4().as_bytes()[..6])),
            processing_time: started.elapsed(),
        })
    }
}
