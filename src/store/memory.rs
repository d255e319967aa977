use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::models::{DashboardStats, Registration, STATUS_CHECKED_IN};

use super::{CheckinOutcome, CheckinStore, StoreError, MIN_PARTIAL_LEN};

const SEARCH_LIMIT: usize = 50;

/// In-memory store used by the test suite. Holding the mutex across the
/// whole check-in attempt gives the same lookup-then-conditional-update
/// atomicity the Postgres store gets from a single UPDATE.
#[derive(Default)]
pub struct MemoryCheckinStore {
    rows: Mutex<Vec<Registration>>,
}

impl MemoryCheckinStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckinStore for MemoryCheckinStore {
    async fn insert_registration(
        &self,
        registration: Registration,
    ) -> Result<Registration, StoreError> {
        let mut rows = self.rows.lock().await;
        if rows.iter().any(|r| r.ticket_id == registration.ticket_id) {
            return Err(StoreError::DuplicateTicket(registration.ticket_id));
        }
        rows.push(registration.clone());
        Ok(registration)
    }

    async fn attempt_checkin(&self, identifier: &str) -> Result<CheckinOutcome, StoreError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Ok(CheckinOutcome::NotFound);
        }

        let mut rows = self.rows.lock().await;

        let index = if let Some(i) = rows.iter().position(|r| r.ticket_id == identifier) {
            Some(i)
        } else if identifier.len() >= MIN_PARTIAL_LEN {
            let matches: Vec<usize> = rows
                .iter()
                .enumerate()
                .filter(|(_, r)| r.ticket_id.contains(identifier))
                .map(|(i, _)| i)
                .collect();
            match matches.as_slice() {
                [only] => Some(*only),
                _ => None,
            }
        } else {
            None
        };

        let Some(index) = index else {
            return Ok(CheckinOutcome::NotFound);
        };

        let row = &mut rows[index];
        if row.is_checked_in() {
            return Ok(CheckinOutcome::AlreadyCheckedIn(row.clone()));
        }
        row.status = STATUS_CHECKED_IN.to_string();
        row.checkin_time = Some(Utc::now());
        Ok(CheckinOutcome::CheckedIn(row.clone()))
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, StoreError> {
        let rows = self.rows.lock().await;
        let total = rows.len() as i64;
        let checked_in = rows.iter().filter(|r| r.is_checked_in()).count() as i64;

        let mut stats = DashboardStats {
            total,
            checked_in,
            pending: total - checked_in,
            checkin_rate: DashboardStats::rate(checked_in, total),
            ..DashboardStats::default()
        };
        for row in rows.iter() {
            *stats.by_category.entry(row.category.clone()).or_insert(0) += 1;
        }
        let today = Utc::now().date_naive();
        for row in rows.iter() {
            if let Some(at) = row.checkin_time.filter(|at| at.date_naive() == today) {
                let hour = at.format("%H").to_string();
                *stats.hourly_checkins.entry(hour).or_insert(0) += 1;
            }
        }
        Ok(stats)
    }

    async fn recent_registrations(&self, limit: i64) -> Result<Vec<Registration>, StoreError> {
        let rows = self.rows.lock().await;
        let mut sorted: Vec<Registration> = rows.clone();
        sorted.sort_by(|a, b| b.registration_time.cmp(&a.registration_time));
        sorted.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(sorted)
    }

    async fn search_registrations(&self, term: &str) -> Result<Vec<Registration>, StoreError> {
        let needle = term.trim().to_lowercase();
        let rows = self.rows.lock().await;
        let mut found: Vec<Registration> = rows
            .iter()
            .filter(|r| {
                r.first_name.to_lowercase().contains(&needle)
                    || r.last_name.to_lowercase().contains(&needle)
                    || r.email.to_lowercase().contains(&needle)
                    || r.ticket_id.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| b.registration_time.cmp(&a.registration_time));
        found.truncate(SEARCH_LIMIT);
        Ok(found)
    }
}
