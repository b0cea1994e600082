//! The automation decision & execution engine.
//!
//! The pipeline: candidate feeds → proposal generator → policy evaluator →
//! approval ledger → executor → audit trail. [`autorun`] drives the
//! automatic path once per invocation; [`manual`] drives the human decide /
//! execute / preview paths through the same ledger and executor; [`metrics`]
//! is the read-only health view over the audit trail.

pub mod autorun;
pub mod dispatch;
pub mod executor;
pub mod manual;
pub mod metrics;

pub use autorun::{AutoRunItem, AutoRunReport};
pub use dispatch::{ActionDispatcher, PgActionDispatcher};
pub use executor::{Executor, ExecutorFlags};
