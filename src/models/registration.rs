use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::ticket::TicketCategory;

pub const STATUS_REGISTERED: &str = "registered";
pub const STATUS_CHECKED_IN: &str = "checked_in";

/// One attendee's signup. Created once, transitioned at most once from
/// `registered` to `checked_in`, never mutated otherwise.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Registration {
    pub id: Uuid,
    pub ticket_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub emergency_contact: Option<String>,
    pub medical_notes: Option<String>,
    pub category: String,
    pub status: String,
    pub registration_time: DateTime<Utc>,
    pub checkin_time: Option<DateTime<Utc>>,
}

impl Registration {
    pub fn create(new: &NewRegistration, ticket_id: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            ticket_id,
            first_name: new.first_name.trim().to_string(),
            last_name: new.last_name.trim().to_string(),
            email: new.email.trim().to_string(),
            phone: clean_optional(new.phone.as_deref()),
            emergency_contact: clean_optional(new.emergency_contact.as_deref()),
            medical_notes: clean_optional(new.medical_notes.as_deref()),
            category: new.category.as_str().to_string(),
            status: STATUS_REGISTERED.to_string(),
            registration_time: Utc::now(),
            checkin_time: None,
        }
    }

    /// Name shown to staff at the check-in station.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_checked_in(&self) -> bool {
        self.status == STATUS_CHECKED_IN
    }
}

/// Registration intake payload.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRegistration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub emergency_contact: Option<String>,
    #[serde(default)]
    pub medical_notes: Option<String>,
    #[serde(default)]
    pub category: TicketCategory,
    /// Explicit identifier (e.g. re-imported ticket); generated from the
    /// category prefix when absent.
    #[serde(default)]
    pub ticket_id: Option<String>,
}

fn clean_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intake() -> NewRegistration {
        NewRegistration {
            first_name: "  Ada ".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: Some("   ".to_string()),
            emergency_contact: None,
            medical_notes: Some(" none ".to_string()),
            category: TicketCategory::Vip,
            ticket_id: None,
        }
    }

    #[test]
    fn create_starts_registered_with_no_checkin_time() {
        let registration = Registration::create(&intake(), "VIP-00AA11BB".to_string());
        assert_eq!(registration.status, STATUS_REGISTERED);
        assert!(registration.checkin_time.is_none());
        assert!(!registration.is_checked_in());
        assert_eq!(registration.category, "vip");
    }

    #[test]
    fn create_trims_fields_and_drops_blank_optionals() {
        let registration = Registration::create(&intake(), "VIP-00AA11BB".to_string());
        assert_eq!(registration.first_name, "Ada");
        assert_eq!(registration.phone, None);
        assert_eq!(registration.medical_notes.as_deref(), Some("none"));
        assert_eq!(registration.display_name(), "Ada Lovelace");
    }
}
