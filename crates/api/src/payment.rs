//! Payment trigger backed by the event bus.
//!
//! Completing a session records a `payment_releases` row in the same
//! transaction as the status change; [`EventBusPaymentTrigger`] then
//! announces the release on the bus so the payout processor (or any other
//! subscriber) can act on it.
//!
//! Delivery is stamped on the ledger row (`delivered_at`). A release whose
//! trigger failed, or whose process stopped before the trigger ran, is
//! re-announced by [`redeliver_pending`] at startup. Consumers key on
//! `work_session_id`, so a release announced twice is paid once.

use std::sync::Arc;

use async_trait::async_trait;
use kazi_core::error::CoreError;
use kazi_core::payment::{PaymentRelease, PaymentTrigger};
use kazi_db::models::payment_release::PaymentReleaseRecord;
use kazi_db::repositories::PaymentReleaseRepo;
use kazi_events::bus::PlatformEvent;
use kazi_events::event_types::{ENTITY_WORK_SESSION, WORK_SESSION_PAYMENT_RELEASED};
use kazi_events::EventBus;
use sqlx::PgPool;
use tokio::sync::broadcast;

use crate::error::AppResult;

/// Upper bound on releases re-announced by one startup sweep.
const REDELIVERY_BATCH: i64 = 500;

/// Publishes a `work_session.payment_released` event for every release.
pub struct EventBusPaymentTrigger {
    bus: Arc<EventBus>,
}

impl EventBusPaymentTrigger {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl PaymentTrigger for EventBusPaymentTrigger {
    async fn release(&self, release: &PaymentRelease) -> Result<(), CoreError> {
        let payload = serde_json::to_value(release)
            .map_err(|e| CoreError::Internal(format!("Failed to encode payment release: {e}")))?;

        let event = PlatformEvent::new(WORK_SESSION_PAYMENT_RELEASED)
            .with_source(ENTITY_WORK_SESSION, release.work_session_id)
            .with_actor(release.employer_id)
            .with_payload(payload);

        let receivers = self.bus.publish(event);
        if receivers == 0 {
            tracing::warn!(
                work_session_id = release.work_session_id,
                amount = release.amount,
                "Payment release published with no subscribers; the ledger row remains the record"
            );
        }
        Ok(())
    }
}

/// Hand a recorded release to `trigger` and stamp it delivered.
///
/// Returns the record as stored after stamping. A trigger error is returned
/// and leaves the row undelivered. A failure to stamp is only logged: the
/// release already went out, and a later sweep re-announcing it is harmless.
pub async fn deliver(
    pool: &PgPool,
    trigger: &dyn PaymentTrigger,
    record: PaymentReleaseRecord,
) -> AppResult<PaymentReleaseRecord> {
    trigger.release(&record.release()).await?;

    match PaymentReleaseRepo::mark_delivered(pool, record.id).await {
        Ok(Some(stamped)) => Ok(stamped),
        Ok(None) => Ok(record),
        Err(err) => {
            tracing::warn!(
                payment_release_id = record.id,
                work_session_id = record.work_session_id,
                error = %err,
                "Payment delivered but could not be stamped"
            );
            Ok(record)
        }
    }
}

/// Re-announce releases that were recorded but never delivered.
///
/// Failures are logged per release and do not stop the sweep. Returns the
/// number delivered.
pub async fn redeliver_pending(pool: &PgPool, trigger: &dyn PaymentTrigger) -> AppResult<usize> {
    let pending = PaymentReleaseRepo::list_undelivered(pool, REDELIVERY_BATCH).await?;
    if pending.is_empty() {
        return Ok(0);
    }

    let total = pending.len();
    let mut delivered = 0;
    for record in pending {
        let (id, work_session_id) = (record.id, record.work_session_id);
        match deliver(pool, trigger, record).await {
            Ok(_) => delivered += 1,
            Err(err) => tracing::error!(
                payment_release_id = id,
                work_session_id,
                error = %err,
                "Payment redelivery failed"
            ),
        }
    }

    tracing::info!(delivered, total, "Re-announced undelivered payment releases");
    Ok(delivered)
}

/// Log every payment release seen on the bus until the bus is dropped.
///
/// Stands in for the payout processor in deployments that do not run one.
pub async fn log_payment_releases(mut rx: broadcast::Receiver<PlatformEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) if event.event_type == WORK_SESSION_PAYMENT_RELEASED => {
                tracing::info!(
                    work_session_id = ?event.source_entity_id,
                    employer_id = ?event.actor_user_id,
                    user_id = %event.payload["user_id"],
                    amount = %event.payload["amount"],
                    "Payment released"
                );
            }
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Payment listener lagged behind the event bus");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    tracing::info!("Payment listener stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release() -> PaymentRelease {
        PaymentRelease {
            work_session_id: 9,
            employer_id: 3,
            user_id: 4,
            amount: 5000,
        }
    }

    #[tokio::test]
    async fn release_publishes_payment_event() {
        let bus = Arc::new(EventBus::default());
        let mut rx = bus.subscribe();
        let trigger = EventBusPaymentTrigger::new(Arc::clone(&bus));

        trigger.release(&release()).await.unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type, WORK_SESSION_PAYMENT_RELEASED);
        assert_eq!(event.source_entity_id, Some(9));
        assert_eq!(event.actor_user_id, Some(3));
        assert_eq!(event.payload["amount"], 5000);
        assert_eq!(event.payload["user_id"], 4);
    }

    #[tokio::test]
    async fn release_without_subscribers_still_succeeds() {
        let trigger = EventBusPaymentTrigger::new(Arc::new(EventBus::default()));
        assert!(trigger.release(&release()).await.is_ok());
    }

    #[tokio::test]
    async fn listener_stops_when_bus_is_dropped() {
        let bus = EventBus::default();
        let handle = tokio::spawn(log_payment_releases(bus.subscribe()));
        bus.publish(PlatformEvent::new(WORK_SESSION_PAYMENT_RELEASED));
        drop(bus);
        tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .expect("listener should exit")
            .unwrap();
    }
}
