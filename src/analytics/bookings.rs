// src/analytics/bookings.rs

use std::collections::HashMap;

use crate::models::Booking;

/// Running totals for one salesperson.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsultantTally {
    pub revenue: i64,
    pub booking_achieved: i64,
    pub margin_achieved: i64,
}

impl ConsultantTally {
    pub fn add(&mut self, b: &Booking) {
        self.revenue = self.revenue.saturating_add(b.booking_value);
        self.margin_achieved = self.margin_achieved.saturating_add(b.final_margin);
        self.booking_achieved = self.booking_achieved.saturating_add(1);
    }
}

/// Group bookings by the raw `salesHandleName`; no case or whitespace folding.
pub fn aggregate_by_consultant(bookings: &[Booking]) -> HashMap<String, ConsultantTally> {
    let mut out: HashMap<String, ConsultantTally> = HashMap::new();
    for b in bookings {
        out.entry(b.sales_handle_name.clone()).or_default().add(b);
    }
    out
}
