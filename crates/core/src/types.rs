//! Shared primitive type aliases.

/// Database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Derived proposal identities are composite strings, not database keys;
/// see `proposal::proposal_id` for the composition rule.
pub type ProposalId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
