//! Durable activity-event persistence service.
//!
//! [`EventPersistence`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! broadcast channel and writes every received [`ActivityEvent`] to the
//! `activity_events` table. It runs as a long-lived background task and
//! shuts down gracefully when the bus sender is dropped.

use domus_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::ActivityEvent;

/// Background service that persists activity events to the database.
pub struct EventPersistence;

impl EventPersistence {
    /// Run the persistence loop.
    ///
    /// Subscribes to the event bus via the provided `receiver` and persists
    /// every event it receives. The loop exits when the channel is closed
    /// (i.e. the [`EventBus`](crate::bus::EventBus) is dropped).
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<ActivityEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = Self::persist(&pool, &event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to persist activity event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Activity persistence lagged, some events were not persisted"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, activity persistence shutting down");
                    break;
                }
            }
        }
    }

    /// Write a single event to the `activity_events` table.
    async fn persist(pool: &DbPool, event: &ActivityEvent) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO activity_events
                (event_type, source_entity_type, source_entity_id, actor, payload, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&event.event_type)
        .bind(&event.source_entity_type)
        .bind(event.source_entity_id)
        .bind(&event.actor)
        .bind(&event.payload)
        .bind(event.timestamp)
        .execute(pool)
        .await
        .map(|_| ())
    }
}
