use chrono::{Datelike, Duration, NaiveDate};

use crate::model::{Sprint, Task};

/// Pixels per day at each zoom level.
pub const ZOOM_LEVELS: [f32; 7] = [2.0, 4.0, 6.0, 12.0, 24.0, 48.0, 96.0];

/// Default zoom level index.
pub const DEFAULT_ZOOM_LEVEL: usize = 2;

/// Bars narrower than this are widened so degenerate ranges stay visible and
/// clickable.
pub const MIN_BAR_WIDTH_PX: f32 = 4.0;

/// Padding applied on both sides of the computed date window.
pub const WINDOW_MARGIN_DAYS: i64 = 7;

pub fn day_width(zoom_level: usize) -> f32 {
    ZOOM_LEVELS[zoom_level.min(ZOOM_LEVELS.len() - 1)]
}

/// The day row only exists from this zoom level up.
pub fn show_day_row(zoom_level: usize) -> bool {
    zoom_level >= 2
}

/// Which day numbers get a label. A step function of the zoom level, not a
/// continuous formula: every day above level 3, every other column at 3,
/// multiples of five at 2, nothing below.
pub fn show_day_label(zoom_level: usize, column_index: usize, day_of_month: u32) -> bool {
    if zoom_level > 3 {
        true
    } else if zoom_level == 3 {
        column_index % 2 == 0
    } else if zoom_level == 2 {
        day_of_month % 5 == 0
    } else {
        false
    }
}

/// The displayed date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Union of all task dates, sprint dates and today, padded by a fixed
    /// margin. With nothing to show, collapses to a single-day window on
    /// today. A fully-specified valid override wins over the computed window.
    pub fn fit(
        tasks: &[&Task],
        sprints: &[Sprint],
        today: NaiveDate,
        override_range: Option<(NaiveDate, NaiveDate)>,
    ) -> Self {
        if let Some((start, end)) = override_range {
            if start <= end {
                return Self { start, end };
            }
        }

        let mut dates: Vec<NaiveDate> = vec![today];
        dates.extend(tasks.iter().flat_map(|t| [t.start_date, t.end_date]));
        dates.extend(sprints.iter().flat_map(|s| [s.start_date, s.end_date]));

        let min = dates.iter().copied().min().unwrap_or(today);
        let max = dates.iter().copied().max().unwrap_or(today);
        Self {
            start: min - Duration::days(WINDOW_MARGIN_DAYS),
            end: max + Duration::days(WINDOW_MARGIN_DAYS),
        }
    }

    /// Inclusive day count.
    pub fn total_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Converts between calendar dates and horizontal pixel coordinates at one
/// zoom level. The geometric foundation of the whole timeline.
#[derive(Debug, Clone, Copy)]
pub struct DateGrid {
    pub window: DateWindow,
    pub day_width: f32,
}

impl DateGrid {
    pub fn new(window: DateWindow, zoom_level: usize) -> Self {
        Self {
            window,
            day_width: day_width(zoom_level),
        }
    }

    /// Left edge of a date's cell, in pixels from the window start.
    pub fn x_of(&self, date: NaiveDate) -> f32 {
        (date - self.window.start).num_days() as f32 * self.day_width
    }

    /// Horizontal center of a date's cell.
    pub fn center_x_of(&self, date: NaiveDate) -> f32 {
        self.x_of(date) + self.day_width / 2.0
    }

    /// Width of an inclusive date range, floored at the minimum bar width so
    /// zero- and negative-duration ranges remain visible.
    pub fn width_of(&self, start: NaiveDate, end: NaiveDate) -> f32 {
        let days = (end - start).num_days() + 1;
        (days as f32 * self.day_width).max(MIN_BAR_WIDTH_PX)
    }

    pub fn total_width(&self) -> f32 {
        self.window.total_days() as f32 * self.day_width
    }

    /// All days of the window, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        let total = self.window.total_days();
        (0..total).map(move |i| self.window.start + Duration::days(i))
    }

    /// Month segments intersecting the window, each clipped to it.
    pub fn months(&self) -> Vec<MonthSpan> {
        let mut spans = Vec::new();
        let mut first = NaiveDate::from_ymd_opt(
            self.window.start.year(),
            self.window.start.month(),
            1,
        )
        .unwrap_or(self.window.start);

        while first <= self.window.end {
            let last = end_of_month(first);
            spans.push(MonthSpan {
                month: first,
                start: first.max(self.window.start),
                end: last.min(self.window.end),
            });
            first = last + Duration::days(1);
        }
        spans
    }
}

/// One month's slice of the header, clipped to the visible window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthSpan {
    /// First of the month (may lie before the window).
    pub month: NaiveDate,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

fn end_of_month(first: NaiveDate) -> NaiveDate {
    let (y, m) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1)
        .map(|d| d - Duration::days(1))
        .unwrap_or(first)
}

pub fn is_weekend(date: NaiveDate) -> bool {
    date.weekday().num_days_from_monday() >= 5
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn task(start: &str, end: &str) -> Task {
        Task::new("t", Uuid::new_v4(), day(start), day(end))
    }

    fn grid(start: &str, end: &str, zoom: usize) -> DateGrid {
        DateGrid::new(
            DateWindow {
                start: day(start),
                end: day(end),
            },
            zoom,
        )
    }

    #[test]
    fn x_of_window_start_is_zero() {
        let g = grid("2025-01-01", "2025-03-01", 4);
        assert_eq!(g.x_of(day("2025-01-01")), 0.0);
        assert_eq!(g.x_of(day("2025-01-02")), 24.0);
        // Dates before the window map to negative x, by the same formula.
        assert_eq!(g.x_of(day("2024-12-31")), -24.0);
    }

    #[test]
    fn width_is_inclusive_and_floored() {
        let g = grid("2025-01-01", "2025-03-01", 2);
        assert_eq!(g.width_of(day("2025-01-10"), day("2025-01-10")), 6.0);
        assert_eq!(g.width_of(day("2025-01-10"), day("2025-01-12")), 18.0);
        // Degenerate end < start never collapses below the floor.
        assert_eq!(g.width_of(day("2025-01-12"), day("2025-01-10")), MIN_BAR_WIDTH_PX);
    }

    #[test]
    fn window_unions_tasks_sprints_and_today_with_margin() {
        let tasks = [task("2025-02-01", "2025-02-10")];
        let refs: Vec<&Task> = tasks.iter().collect();
        let sprints = vec![Sprint::new("S1", 1, day("2025-01-20"), day("2025-02-02"))];
        let today = day("2025-03-01");
        let w = DateWindow::fit(&refs, &sprints, today, None);
        assert_eq!(w.start, day("2025-01-13"));
        assert_eq!(w.end, day("2025-03-08"));
    }

    #[test]
    fn empty_window_collapses_to_today() {
        let today = day("2025-06-15");
        let w = DateWindow::fit(&[], &[], today, None);
        // Only "today" contributes, so the window is today ± margin.
        assert_eq!(w.start, day("2025-06-08"));
        assert_eq!(w.end, day("2025-06-22"));
        assert!(w.contains(today));
    }

    #[test]
    fn valid_override_wins_invalid_override_is_ignored() {
        let today = day("2025-06-15");
        let w = DateWindow::fit(&[], &[], today, Some((day("2025-01-01"), day("2025-02-01"))));
        assert_eq!(w.start, day("2025-01-01"));
        assert_eq!(w.end, day("2025-02-01"));

        let w = DateWindow::fit(&[], &[], today, Some((day("2025-02-01"), day("2025-01-01"))));
        assert_eq!(w.start, day("2025-06-08"));
    }

    #[test]
    fn day_label_stride_is_a_step_function() {
        assert!(!show_day_row(1));
        assert!(show_day_row(2));

        // level 2: multiples of five only
        assert!(show_day_label(2, 7, 5));
        assert!(show_day_label(2, 7, 10));
        assert!(!show_day_label(2, 7, 11));
        // level 3: every other column
        assert!(show_day_label(3, 0, 11));
        assert!(!show_day_label(3, 1, 11));
        // above 3: everything
        assert!(show_day_label(4, 1, 11));
        assert!(show_day_label(6, 13, 31));
    }

    #[test]
    fn months_are_clipped_to_window() {
        let g = grid("2025-01-20", "2025-03-10", 2);
        let months = g.months();
        assert_eq!(months.len(), 3);
        assert_eq!(months[0].start, day("2025-01-20"));
        assert_eq!(months[0].end, day("2025-01-31"));
        assert_eq!(months[1].start, day("2025-02-01"));
        assert_eq!(months[1].end, day("2025-02-28"));
        assert_eq!(months[2].end, day("2025-03-10"));
    }

    #[test]
    fn weekend_detection() {
        assert!(is_weekend(day("2025-01-04"))); // Saturday
        assert!(is_weekend(day("2025-01-05"))); // Sunday
        assert!(!is_weekend(day("2025-01-06"))); // Monday
    }
}
