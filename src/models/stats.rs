use std::collections::BTreeMap;

use serde::Serialize;

/// Live counts backing the staff dashboard. Numbers only; rendering is the
/// frontend's problem.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardStats {
    pub total: i64,
    pub checked_in: i64,
    pub pending: i64,
    /// Percentage of registrations checked in, one decimal place.
    pub checkin_rate: f64,
    pub by_category: BTreeMap<String, i64>,
    /// Today's check-ins bucketed by two-digit hour ("08", "19", ...).
    pub hourly_checkins: BTreeMap<String, i64>,
}

impl DashboardStats {
    pub fn rate(checked_in: i64, total: i64) -> f64 {
        if total == 0 {
            return 0.0;
        }
        let raw = checked_in as f64 / total as f64 * 100.0;
        (raw * 10.0).round() / 10.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_handles_empty_and_rounds_to_one_decimal() {
        assert_eq!(DashboardStats::rate(0, 0), 0.0);
        assert_eq!(DashboardStats::rate(1, 3), 33.3);
        assert_eq!(DashboardStats::rate(3, 3), 100.0);
    }
}
