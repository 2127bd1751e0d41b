// src/analytics/mod.rs

pub mod bookings;
pub mod countries;
pub mod targets;

pub use bookings::{aggregate_by_consultant, ConsultantTally};
pub use countries::summarize_countries;
pub use targets::find_target;

use crate::models::{ConsultantMetric, Target};

/// `round(achieved / (target || 1) * 100)`.
///
/// A missing or zero target counts as 1, so an untracked consultant with two
/// bookings reads as 200%.
pub fn percentage(achieved: i64, target: f64) -> i64 {
    let ratio = achieved as f64 / effective_target(target) * 100.0;
    // half-up, as Math.round does for negative margins too
    (ratio + 0.5).floor() as i64
}

pub fn is_exceeded(achieved: i64, target: f64) -> bool {
    achieved as f64 >= effective_target(target)
}

fn effective_target(target: f64) -> f64 {
    if target == 0.0 || !target.is_finite() {
        1.0
    } else {
        target
    }
}

/// Join one consultant's achievements with their (optional) target.
pub fn score_consultant(name: &str, tally: &ConsultantTally, target: Option<&Target>) -> ConsultantMetric {
    let booking_target = target.map_or(0.0, |t| t.total_bookings);
    let margin_target = target.map_or(0.0, |t| t.margin);
    ConsultantMetric {
        name: name.to_string(),
        revenue: tally.revenue,
        booking_achieved: tally.booking_achieved,
        margin_achieved: tally.margin_achieved,
        booking_target,
        margin_target,
        booking_percentage: percentage(tally.booking_achieved, booking_target),
        margin_percentage: percentage(tally.margin_achieved, margin_target),
        is_booking_exceeded: is_exceeded(tally.booking_achieved, booking_target),
        is_margin_exceeded: is_exceeded(tally.margin_achieved, margin_target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_target_counts_as_one() {
        assert_eq!(percentage(2, 0.0), 200);
        assert!(is_exceeded(2, 0.0));
        assert_eq!(percentage(0, 0.0), 0);
        assert!(!is_exceeded(0, 0.0));
    }

    #[test]
    fn rounds_half_up() {
        assert_eq!(percentage(1, 8.0), 13); // 12.5
        assert_eq!(percentage(2, 3.0), 67);
        assert_eq!(percentage(12, 10.0), 120);
        assert_eq!(percentage(-1, 8.0), -12); // -12.5
    }

    #[test]
    fn scores_against_target() {
        let tally = ConsultantTally { revenue: 5000, booking_achieved: 12, margin_achieved: 1200 };
        let target = Target { year: "2024".into(), quarter: "Q4".into(), total_bookings: 10.0, margin: 1500.0 };
        let m = score_consultant("Asha", &tally, Some(&target));
        assert_eq!(m.booking_percentage, 120);
        assert_eq!(m.margin_percentage, 80);
        assert!(m.is_booking_exceeded);
        assert!(!m.is_margin_exceeded);
        assert_eq!(m.booking_target, 10.0);
    }
}
