//! Domus activity event infrastructure.
//!
//! The secondary, best-effort audit channel: the executor publishes an
//! [`ActivityEvent`] for every branch it takes, and a background persistence
//! task writes them to the `activity_events` table for general activity
//! history. Losing one of these events never fails an engine operation;
//! the primary `automation_audit` ledger is written synchronously elsewhere.

pub mod bus;
pub mod persistence;

pub use bus::{ActivityEvent, EventBus};
pub use persistence::EventPersistence;
