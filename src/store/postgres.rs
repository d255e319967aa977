use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::{DashboardStats, Registration, STATUS_CHECKED_IN, STATUS_REGISTERED};

use super::{CheckinOutcome, CheckinStore, StoreError, MIN_PARTIAL_LEN};

const SEARCH_LIMIT: i64 = 50;

/// Production store backed by the `registrations` table.
pub struct PgCheckinStore {
    pool: PgPool,
}

impl PgCheckinStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Conditional transition on one exact ticket id. Returns the updated
    /// row, or `None` when the row is missing or no longer `registered` —
    /// the affected-row check is what makes concurrent scans safe.
    async fn transition(&self, ticket_id: &str) -> Result<Option<Registration>, sqlx::Error> {
        sqlx::query_as::<_, Registration>(
            "UPDATE registrations
             SET status = $1, checkin_time = NOW()
             WHERE ticket_id = $2 AND status = $3
             RETURNING *",
        )
        .bind(STATUS_CHECKED_IN)
        .bind(ticket_id)
        .bind(STATUS_REGISTERED)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_exact(&self, ticket_id: &str) -> Result<Option<Registration>, sqlx::Error> {
        sqlx::query_as::<_, Registration>("SELECT * FROM registrations WHERE ticket_id = $1")
            .bind(ticket_id)
            .fetch_optional(&self.pool)
            .await
    }
}

#[async_trait]
impl CheckinStore for PgCheckinStore {
    async fn insert_registration(
        &self,
        registration: Registration,
    ) -> Result<Registration, StoreError> {
        sqlx::query_as::<_, Registration>(
            "INSERT INTO registrations
                 (id, ticket_id, first_name, last_name, email, phone,
                  emergency_contact, medical_notes, category, status,
                  registration_time, checkin_time)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING *",
        )
        .bind(registration.id)
        .bind(&registration.ticket_id)
        .bind(&registration.first_name)
        .bind(&registration.last_name)
        .bind(&registration.email)
        .bind(&registration.phone)
        .bind(&registration.emergency_contact)
        .bind(&registration.medical_notes)
        .bind(&registration.category)
        .bind(&registration.status)
        .bind(registration.registration_time)
        .bind(registration.checkin_time)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::DuplicateTicket(registration.ticket_id.clone())
            }
            _ => StoreError::Backend(err),
        })
    }

    async fn attempt_checkin(&self, identifier: &str) -> Result<CheckinOutcome, StoreError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Ok(CheckinOutcome::NotFound);
        }

        if let Some(row) = self.transition(identifier).await? {
            return Ok(CheckinOutcome::CheckedIn(row));
        }
        if let Some(row) = self.find_exact(identifier).await? {
            // Exact row exists but the conditional update moved nothing:
            // it is already checked in.
            return Ok(CheckinOutcome::AlreadyCheckedIn(row));
        }

        if identifier.len() < MIN_PARTIAL_LEN {
            return Ok(CheckinOutcome::NotFound);
        }

        let pattern = format!("%{}%", escape_like(identifier));
        let candidates = sqlx::query_as::<_, Registration>(
            "SELECT * FROM registrations WHERE ticket_id LIKE $1 LIMIT 2",
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        match candidates.as_slice() {
            [] => Ok(CheckinOutcome::NotFound),
            [row] => {
                if row.is_checked_in() {
                    return Ok(CheckinOutcome::AlreadyCheckedIn(row.clone()));
                }
                match self.transition(&row.ticket_id).await? {
                    Some(updated) => Ok(CheckinOutcome::CheckedIn(updated)),
                    // Lost the race between the select and the update.
                    None => match self.find_exact(&row.ticket_id).await? {
                        Some(current) => Ok(CheckinOutcome::AlreadyCheckedIn(current)),
                        None => Ok(CheckinOutcome::NotFound),
                    },
                }
            }
            _ => {
                tracing::warn!(identifier, "partial ticket id matches multiple registrations");
                Ok(CheckinOutcome::NotFound)
            }
        }
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, StoreError> {
        let (total, checked_in): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*),
                    COUNT(*) FILTER (WHERE status = $1)
             FROM registrations",
        )
        .bind(STATUS_CHECKED_IN)
        .fetch_one(&self.pool)
        .await?;

        let by_category: Vec<(String, i64)> =
            sqlx::query_as("SELECT category, COUNT(*) FROM registrations GROUP BY category")
                .fetch_all(&self.pool)
                .await?;

        let hourly: Vec<(String, i64)> = sqlx::query_as(
            "SELECT TO_CHAR(checkin_time, 'HH24'), COUNT(*)
             FROM registrations
             WHERE status = $1
               AND checkin_time IS NOT NULL
               AND checkin_time::date = CURRENT_DATE
             GROUP BY 1
             ORDER BY 1",
        )
        .bind(STATUS_CHECKED_IN)
        .fetch_all(&self.pool)
        .await?;

        Ok(DashboardStats {
            total,
            checked_in,
            pending: total - checked_in,
            checkin_rate: DashboardStats::rate(checked_in, total),
            by_category: by_category.into_iter().collect(),
            hourly_checkins: hourly.into_iter().collect(),
        })
    }

    async fn recent_registrations(&self, limit: i64) -> Result<Vec<Registration>, StoreError> {
        let rows = sqlx::query_as::<_, Registration>(
            "SELECT * FROM registrations ORDER BY registration_time DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn search_registrations(&self, term: &str) -> Result<Vec<Registration>, StoreError> {
        let pattern = format!("%{}%", escape_like(term.trim()));
        let rows = sqlx::query_as::<_, Registration>(
            "SELECT * FROM registrations
             WHERE first_name ILIKE $1
                OR last_name ILIKE $1
                OR email ILIKE $1
                OR ticket_id ILIKE $1
             ORDER BY registration_time DESC
             LIMIT $2",
        )
        .bind(&pattern)
        .bind(SEARCH_LIMIT)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

/// Escape LIKE metacharacters so user input matches literally.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn escape_like_neutralizes_wildcards() {
        assert_eq!(escape_like("RWT-AB12"), "RWT-AB12");
        assert_eq!(escape_like("100%_\\"), "100\\%\\_\\\\");
    }
}
