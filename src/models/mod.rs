pub mod registration;
pub mod stats;

pub use registration::{NewRegistration, Registration, STATUS_CHECKED_IN, STATUS_REGISTERED};
pub use stats::DashboardStats;
