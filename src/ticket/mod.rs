use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::form_urlencoded;
use url::Url;
use uuid::Uuid;

/// Ticket categories with their identifier prefixes. Prefixes stay between
/// two and four uppercase letters so scanned-text extraction can rely on a
/// fixed `PREFIX-SUFFIX` shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketCategory {
    #[default]
    General,
    Vip,
    Team,
    Volunteer,
    Staff,
}

impl TicketCategory {
    pub const ALL: [TicketCategory; 5] = [
        TicketCategory::General,
        TicketCategory::Vip,
        TicketCategory::Team,
        TicketCategory::Volunteer,
        TicketCategory::Staff,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            TicketCategory::General => "RWT",
            TicketCategory::Vip => "VIP",
            TicketCategory::Team => "TEAM",
            TicketCategory::Volunteer => "VOL",
            TicketCategory::Staff => "STF",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TicketCategory::General => "general",
            TicketCategory::Vip => "vip",
            TicketCategory::Team => "team",
            TicketCategory::Volunteer => "volunteer",
            TicketCategory::Staff => "staff",
        }
    }
}

/// Generate a ticket identifier of the form `PREFIX-XXXXXXXX`.
///
/// The suffix is the first eight hex characters of a v4 UUID, uppercased.
/// Uniqueness is not verified here; the registration store's unique
/// constraint rejects the (vanishingly rare) collision at insert time.
pub fn generate_ticket_id(prefix: &str) -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(8)
        .collect::<String>()
        .to_uppercase();
    format!("{prefix}-{suffix}")
}

/// Build the check-in URL embedded in a ticket's QR code.
///
/// The shape `<base>/?ticket=<id>&action=checkin` is an external contract:
/// tickets already printed or downloaded must keep scanning correctly.
/// Generated identifiers never contain reserved characters, but the value is
/// escaped anyway so arbitrary identifiers survive the round trip.
pub fn encode_checkin_payload(base_url: &str, ticket_id: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let escaped: String = form_urlencoded::byte_serialize(ticket_id.as_bytes()).collect();
    format!("{base}/?ticket={escaped}&action=checkin")
}

static BARE_TICKET: LazyLock<Regex> = LazyLock::new(|| {
    let prefixes: Vec<&str> = TicketCategory::ALL.iter().map(|c| c.prefix()).collect();
    let pattern = format!("^(?:{})-[A-Za-z0-9]+$", prefixes.join("|"));
    Regex::new(&pattern).unwrap()
});

static EMBEDDED_TICKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z]{2,4}-[A-Z0-9]{6,12}").unwrap());

/// Recover a ticket identifier from whatever text a scan or manual entry
/// produced. Tried in order:
///
/// 1. a URL carrying a `ticket` query parameter (the payload contract);
/// 2. the whole input is a bare identifier with a known category prefix;
/// 3. the first identifier-shaped substring anywhere in the text.
///
/// `None` is the normal outcome for unusable input, not an error; callers
/// fall back to manual entry.
pub fn extract_ticket_id(input: &str) -> Option<String> {
    let text = input.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(parsed) = Url::parse(text) {
        if let Some((_, value)) = parsed.query_pairs().find(|(key, _)| key == "ticket") {
            if !value.is_empty() {
                return Some(value.into_owned());
            }
        }
    }

    if BARE_TICKET.is_match(text) {
        return Some(text.to_owned());
    }

    EMBEDDED_TICKET.find(text).map(|m| m.as_str().to_owned())
}

/// Check-in payload encoder bound to the deployment's public base URL.
///
/// Passed around explicitly (app state) rather than living in a global.
#[derive(Debug, Clone)]
pub struct TicketEncoder {
    base_url: String,
}

impl TicketEncoder {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    pub fn checkin_payload(&self, ticket_id: &str) -> String {
        encode_checkin_payload(&self.base_url, ticket_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_id_has_prefix_and_eight_char_suffix() {
        for category in TicketCategory::ALL {
            let id = generate_ticket_id(category.prefix());
            let (prefix, suffix) = id.split_once('-').expect("id should contain a dash");
            assert_eq!(prefix, category.prefix());
            assert_eq!(suffix.len(), 8);
            assert!(suffix
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn payload_matches_printed_ticket_contract() {
        let payload = encode_checkin_payload("https://tickets.example.com", "RWT-AB12CD34");
        assert_eq!(
            payload,
            "https://tickets.example.com/?ticket=RWT-AB12CD34&action=checkin"
        );
    }

    #[test]
    fn trailing_slash_on_base_url_does_not_double_up() {
        let payload = encode_checkin_payload("https://tickets.example.com/", "RWT-AB12CD34");
        assert_eq!(
            payload,
            "https://tickets.example.com/?ticket=RWT-AB12CD34&action=checkin"
        );
    }

    #[test]
    fn encode_extract_round_trips_generated_ids() {
        let encoder = TicketEncoder::new("https://x.test");
        for category in TicketCategory::ALL {
            let id = generate_ticket_id(category.prefix());
            let payload = encoder.checkin_payload(&id);
            assert_eq!(extract_ticket_id(&payload).as_deref(), Some(id.as_str()));
        }
    }

    #[test]
    fn reserved_characters_survive_the_round_trip() {
        let odd_id = "AB CD&x=1";
        let payload = encode_checkin_payload("https://x.test", odd_id);
        assert_eq!(extract_ticket_id(&payload).as_deref(), Some(odd_id));
    }

    #[test]
    fn extracts_from_checkin_url() {
        let input = "https://x.test/?ticket=RWT-AB12CD34&action=checkin";
        assert_eq!(extract_ticket_id(input).as_deref(), Some("RWT-AB12CD34"));
    }

    #[test]
    fn extracts_bare_identifier_verbatim() {
        assert_eq!(
            extract_ticket_id("RWT-AB12CD34").as_deref(),
            Some("RWT-AB12CD34")
        );
    }

    #[test]
    fn extracts_identifier_embedded_in_noise() {
        let input = "noise text with VIP-99ZZ11 embedded";
        assert_eq!(extract_ticket_id(input).as_deref(), Some("VIP-99ZZ11"));
    }

    #[test]
    fn garbage_yields_no_match() {
        assert_eq!(extract_ticket_id("garbage"), None);
        assert_eq!(extract_ticket_id(""), None);
        assert_eq!(extract_ticket_id("   "), None);
    }

    #[test]
    fn url_without_ticket_param_falls_back_to_substring_search() {
        let input = "https://x.test/?page=Register";
        assert_eq!(extract_ticket_id(input), None);

        let input = "https://x.test/path#RWT-AB12CD34";
        assert_eq!(extract_ticket_id(input).as_deref(), Some("RWT-AB12CD34"));
    }
}
