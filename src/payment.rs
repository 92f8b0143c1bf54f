//! Simulated checkout
//!
//! No money moves. Each attempt succeeds with a configured probability and
//! is appended to a ledger kept in the local store.

use chrono::{DateTime, Utc};
use rand::RngExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::cache::{LocalStore, PERSISTENT};
use crate::{Result, TripSyncError};

pub const PAYMENT_LEDGER_KEY: &str = "tripsync_payments";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PaymentRecord {
    pub id: u64,
    pub item: String,
    pub amount: u64,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug)]
pub struct PaymentSimulator {
    store: Arc<LocalStore>,
    success_rate: f64,
}

impl PaymentSimulator {
    pub fn new(store: Arc<LocalStore>, success_rate: f64) -> Self {
        Self {
            store,
            success_rate: success_rate.clamp(0.0, 1.0),
        }
    }

    /// Attempt a payment for `item` and record the outcome
    pub async fn pay(&self, item: &str, amount: u64) -> Result<PaymentRecord> {
        let item = item.trim();
        if item.is_empty() {
            return Err(TripSyncError::validation("Please choose an item to pay for."));
        }
        if amount == 0 {
            return Err(TripSyncError::validation("Payment amount must be positive."));
        }

        let roll: f64 = rand::rng().random_range(0.0..1.0);
        let success = roll < self.success_rate;
        let item = item.to_string();

        let ledger: Vec<PaymentRecord> = self
            .store
            .update(PAYMENT_LEDGER_KEY, PERSISTENT, move |ledger: &mut Vec<PaymentRecord>| {
                let id = ledger.last().map_or(1, |last| last.id + 1);
                ledger.push(PaymentRecord {
                    id,
                    item,
                    amount,
                    success,
                    timestamp: Utc::now(),
                });
            })
            .await?;

        let record = ledger
            .last()
            .cloned()
            .ok_or_else(|| TripSyncError::storage("payment ledger is empty after append"))?;
        info!(
            "Payment #{} for '{}' ({} KRW): {}",
            record.id,
            record.item,
            record.amount,
            if record.success { "succeeded" } else { "declined" }
        );
        Ok(record)
    }

    /// Every recorded attempt, oldest first
    pub async fn history(&self) -> Result<Vec<PaymentRecord>> {
        Ok(self
            .store
            .get::<Vec<PaymentRecord>>(PAYMENT_LEDGER_KEY)
            .await?
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn simulator(dir: &TempDir, success_rate: f64) -> PaymentSimulator {
        let store = Arc::new(LocalStore::open(dir.path()).unwrap());
        PaymentSimulator::new(store, success_rate)
    }

    #[tokio::test]
    async fn test_payments_are_recorded_in_order() {
        let dir = TempDir::new().unwrap();
        let payments = simulator(&dir, 1.0);

        let first = payments.pay("Hotel", 120_000).await.unwrap();
        let second = payments.pay("  Museum  ", 15_000).await.unwrap();
        assert!(first.success);
        assert_eq!(second.item, "Museum");

        let history = payments.history().await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, 1);
        assert_eq!(history[1].id, 2);
        assert_eq!(history[1].amount, 15_000);
    }

    #[tokio::test]
    async fn test_declined_payment_is_still_recorded() {
        let dir = TempDir::new().unwrap();
        let payments = simulator(&dir, 0.0);

        let record = payments.pay("Train", 50_000).await.unwrap();
        assert!(!record.success);
        assert_eq!(payments.history().await.unwrap(), vec![record]);
    }

    #[tokio::test]
    async fn test_invalid_payments_are_rejected() {
        let dir = TempDir::new().unwrap();
        let payments = simulator(&dir, 1.0);

        assert!(matches!(
            payments.pay("   ", 1_000).await,
            Err(TripSyncError::Validation { .. })
        ));
        assert!(matches!(
            payments.pay("Hotel", 0).await,
            Err(TripSyncError::Validation { .. })
        ));
        assert!(payments.history().await.unwrap().is_empty());
    }
}
