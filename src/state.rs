use std::sync::Arc;

use crate::store::CheckinStore;
use crate::ticket::TicketEncoder;

/// Dependencies handed to every handler: the check-in store and the payload
/// encoder, injected explicitly instead of living in process-wide globals.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CheckinStore>,
    pub encoder: TicketEncoder,
}

impl AppState {
    pub fn new(store: Arc<dyn CheckinStore>, encoder: TicketEncoder) -> Self {
        Self { store, encoder }
    }
}
