use async_trait::async_trait;
use thiserror::Error;

use crate::models::{DashboardStats, Registration};

mod memory;
mod postgres;

pub use memory::MemoryCheckinStore;
pub use postgres::PgCheckinStore;

/// Identifiers shorter than this never reach the substring fallback; a real
/// ticket id is at least nine characters, and a too-short fragment would
/// match half the table.
pub const MIN_PARTIAL_LEN: usize = 4;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Distinct from other failures so callers can regenerate and retry.
    #[error("ticket id '{0}' already exists")]
    DuplicateTicket(String),

    #[error("storage error")]
    Backend(#[from] sqlx::Error),
}

/// What a check-in attempt resolved to. The two negative outcomes are
/// deliberately distinct: staff need to see who an already-used ticket
/// belongs to.
#[derive(Debug, Clone)]
pub enum CheckinOutcome {
    CheckedIn(Registration),
    AlreadyCheckedIn(Registration),
    NotFound,
}

/// Registration storage plus the authoritative check-in transition.
///
/// Handlers receive this as a trait object so the HTTP surface can run
/// against Postgres in production and the in-memory store in tests.
#[async_trait]
pub trait CheckinStore: Send + Sync {
    /// Insert a new registration. Fails with [`StoreError::DuplicateTicket`]
    /// when the ticket id is already taken; the existing row is untouched.
    async fn insert_registration(
        &self,
        registration: Registration,
    ) -> Result<Registration, StoreError>;

    /// Attempt the `registered` -> `checked_in` transition.
    ///
    /// Exact ticket-id match wins; when no exact row exists, a single
    /// unambiguous "contains" match is accepted to tolerate partial scans
    /// and typos. Zero or multiple partial candidates resolve to
    /// [`CheckinOutcome::NotFound`] rather than guessing. The transition
    /// itself is one atomic conditional update, so concurrent attempts on
    /// the same ticket yield exactly one `CheckedIn`.
    async fn attempt_checkin(&self, identifier: &str) -> Result<CheckinOutcome, StoreError>;

    async fn dashboard_stats(&self) -> Result<DashboardStats, StoreError>;

    /// Newest registrations first.
    async fn recent_registrations(&self, limit: i64) -> Result<Vec<Registration>, StoreError>;

    /// Case-insensitive contains-match over name, email and ticket id.
    async fn search_registrations(&self, term: &str) -> Result<Vec<Registration>, StoreError>;
}
