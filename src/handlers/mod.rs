use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::models::{NewRegistration, Registration};
use crate::state::AppState;
use crate::store::CheckinOutcome;
use crate::ticket::{extract_ticket_id, generate_ticket_id, TicketCategory};
use crate::utils::error::AppError;
use crate::utils::response::success;

const MAX_BULK_TICKETS: u32 = 500;
const DEFAULT_RECENT_LIMIT: i64 = 20;
const MAX_RECENT_LIMIT: i64 = 100;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "turnstile-api",
    };

    success(payload, "Health check successful").into_response()
}

#[derive(Serialize)]
pub struct RegistrationCreated {
    pub registration: Registration,
    /// URL to render as the attendee's check-in QR code.
    pub checkin_payload: String,
}

pub async fn create_registration(
    State(state): State<AppState>,
    Json(body): Json<NewRegistration>,
) -> Result<Response, AppError> {
    for (field, value) in [
        ("first_name", &body.first_name),
        ("last_name", &body.last_name),
        ("email", &body.email),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::ValidationError(format!("'{field}' is required")));
        }
    }

    let ticket_id = match body.ticket_id.as_deref().map(str::trim) {
        Some(explicit) if !explicit.is_empty() => explicit.to_string(),
        _ => generate_ticket_id(body.category.prefix()),
    };

    let registration = state
        .store
        .insert_registration(Registration::create(&body, ticket_id))
        .await?;
    let checkin_payload = state.encoder.checkin_payload(&registration.ticket_id);

    info!(
        ticket_id = %registration.ticket_id,
        category = %registration.category,
        "Registration created"
    );
    Ok(success(
        RegistrationCreated {
            registration,
            checkin_payload,
        },
        "Registration successful",
    )
    .into_response())
}

#[derive(Deserialize)]
pub struct CheckinRequest {
    /// Raw scanned or typed text; the ticket identifier is extracted from it.
    pub code: String,
}

#[derive(Serialize)]
pub struct CheckinResult {
    pub outcome: &'static str,
    pub ticket_id: String,
    pub attendee: String,
    pub checkin_time: Option<DateTime<Utc>>,
}

pub async fn checkin(
    State(state): State<AppState>,
    Json(body): Json<CheckinRequest>,
) -> Result<Response, AppError> {
    let Some(ticket_id) = extract_ticket_id(&body.code) else {
        // Normal negative outcome; the operator falls back to manual entry.
        return Err(AppError::NotFound(
            "No ticket identifier found in scanned input".to_string(),
        ));
    };

    match state.store.attempt_checkin(&ticket_id).await? {
        CheckinOutcome::CheckedIn(registration) => {
            info!(ticket_id = %registration.ticket_id, attendee = %registration.display_name(), "Checked in");
            Ok(success(
                CheckinResult {
                    outcome: "checked_in",
                    ticket_id: registration.ticket_id.clone(),
                    attendee: registration.display_name(),
                    checkin_time: registration.checkin_time,
                },
                "Check-in successful",
            )
            .into_response())
        }
        CheckinOutcome::AlreadyCheckedIn(registration) => {
            warn!(ticket_id = %registration.ticket_id, "Repeat check-in attempt");
            Ok(success(
                CheckinResult {
                    outcome: "already_checked_in",
                    ticket_id: registration.ticket_id.clone(),
                    attendee: registration.display_name(),
                    checkin_time: registration.checkin_time,
                },
                "Ticket already checked in",
            )
            .into_response())
        }
        CheckinOutcome::NotFound => Err(AppError::NotFound(format!(
            "No registration matches ticket '{ticket_id}'"
        ))),
    }
}

#[derive(Deserialize)]
pub struct BulkTicketRequest {
    pub count: u32,
    #[serde(default)]
    pub category: TicketCategory,
}

#[derive(Serialize)]
pub struct IssuedTicket {
    pub ticket_id: String,
    pub payload: String,
}

/// Pre-generate identifiers and payloads for print runs. Nothing is stored;
/// the ids only become registrations when someone registers with them.
pub async fn bulk_tickets(
    State(state): State<AppState>,
    Json(body): Json<BulkTicketRequest>,
) -> Result<Response, AppError> {
    if body.count == 0 || body.count > MAX_BULK_TICKETS {
        return Err(AppError::ValidationError(format!(
            "'count' must be between 1 and {MAX_BULK_TICKETS}"
        )));
    }

    let tickets: Vec<IssuedTicket> = (0..body.count)
        .map(|_| {
            let ticket_id = generate_ticket_id(body.category.prefix());
            let payload = state.encoder.checkin_payload(&ticket_id);
            IssuedTicket { ticket_id, payload }
        })
        .collect();

    info!(count = body.count, category = body.category.as_str(), "Bulk tickets generated");
    Ok(success(tickets, "Tickets generated").into_response())
}

pub async fn dashboard_stats(State(state): State<AppState>) -> Result<Response, AppError> {
    let stats = state.store.dashboard_stats().await?;
    Ok(success(stats, "Dashboard statistics").into_response())
}

#[derive(Deserialize)]
pub struct RecentParams {
    pub limit: Option<i64>,
}

pub async fn recent_registrations(
    State(state): State<AppState>,
    Query(params): Query<RecentParams>,
) -> Result<Response, AppError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_RECENT_LIMIT)
        .clamp(1, MAX_RECENT_LIMIT);
    let rows = state.store.recent_registrations(limit).await?;
    Ok(success(rows, "Recent registrations").into_response())
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
}

pub async fn search_registrations(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Response, AppError> {
    if params.q.trim().is_empty() {
        return Err(AppError::ValidationError(
            "'q' must not be empty".to_string(),
        ));
    }
    let rows = state.store.search_registrations(&params.q).await?;
    Ok(success(rows, "Search results").into_response())
}
