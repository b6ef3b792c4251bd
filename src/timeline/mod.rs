//! Geometry and interaction core of the timeline view: date/pixel mapping,
//! step-lane packing, row layout, grouping, and the pointer state machine.
//! Everything here is pure with respect to the UI so it can be exercised
//! without a window.

pub mod gesture;
pub mod grid;
pub mod grouping;
pub mod lanes;
pub mod rows;

use chrono::NaiveDate;

/// Derived completion percentage of a date range as of `today`. Recomputed on
/// every render from wall-clock time; never persisted.
pub fn derived_progress(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> u8 {
    if today < start {
        return 0;
    }
    if today > end {
        return 100;
    }
    let total = (end - start).num_days() + 1;
    let elapsed = (today - start).num_days() + 1;
    if total <= 0 {
        return 100;
    }
    let pct = ((elapsed as f64 / total as f64) * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn single_day_task_today_is_complete() {
        let d = day("2025-05-05");
        assert_eq!(derived_progress(d, d, d), 100);
    }

    #[test]
    fn future_task_has_not_started() {
        assert_eq!(
            derived_progress(day("2025-06-01"), day("2025-06-10"), day("2025-05-05")),
            0
        );
    }

    #[test]
    fn past_task_is_complete() {
        assert_eq!(
            derived_progress(day("2025-01-01"), day("2025-01-10"), day("2025-05-05")),
            100
        );
    }

    #[test]
    fn ten_day_task_at_day_five_is_half_done() {
        // 2025-03-01..=2025-03-10 spans exactly 10 inclusive days.
        assert_eq!(
            derived_progress(day("2025-03-01"), day("2025-03-10"), day("2025-03-05")),
            50
        );
    }
}
