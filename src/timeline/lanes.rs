use std::collections::HashMap;

use uuid::Uuid;

use crate::model::TaskStep;

use super::grid::DateGrid;

// Expanded step panel geometry.
pub const STEP_LINE_HEIGHT: f32 = 22.0;
pub const STEP_LINE_GAP: f32 = 8.0;
pub const STEP_ROW_PITCH: f32 = STEP_LINE_HEIGHT + STEP_LINE_GAP;
pub const STEP_TOP_PADDING: f32 = 8.0;
pub const STEP_BOTTOM_PADDING: f32 = 10.0;

pub const STEP_ICON_SIZE: f32 = 14.0;
pub const STEP_ICON_GAP: f32 = 6.0;
pub const STEP_LABEL_MIN_W: f32 = 90.0;
pub const STEP_LABEL_MAX_W: f32 = 200.0;
pub const STEP_MIN_GAP_PX: f32 = 10.0;

/// Estimated pixel width of a step label. A deterministic function of the
/// character count so lane packing is computable without measuring rendered
/// text.
pub fn estimate_label_width(text: &str) -> f32 {
    let w = 60.0 + text.chars().count() as f32 * 6.0;
    w.clamp(STEP_LABEL_MIN_W, STEP_LABEL_MAX_W)
}

/// Lane assignment for one task's steps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepLaneLayout {
    pub lane_by_step: HashMap<Uuid, usize>,
    pub lanes: usize,
}

/// The horizontal interval a step's label occupies, used both for packing and
/// for overlap checks in tests.
pub fn label_interval(step: &TaskStep, grid: &DateGrid) -> (f32, f32) {
    let anchor_x = grid.center_x_of(step.date);
    let start = anchor_x + STEP_ICON_SIZE / 2.0 + STEP_ICON_GAP;
    (start, start + estimate_label_width(&step.text))
}

/// Assign each step to the lowest lane whose previous label ends at least
/// `STEP_MIN_GAP_PX` before this one starts; open a new lane otherwise.
///
/// First-fit over steps sorted by label start (stable, so ties keep input
/// order). Not optimal packing, but deterministic: the lane count feeds row
/// heights, so the exact assignment matters.
pub fn compute_step_lanes(steps: &[TaskStep], grid: &DateGrid) -> StepLaneLayout {
    if steps.is_empty() {
        return StepLaneLayout::default();
    }

    let mut items: Vec<(Uuid, f32, f32)> = steps
        .iter()
        .map(|s| {
            let (start, end) = label_interval(s, grid);
            (s.id, start, end)
        })
        .collect();
    items.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut lane_ends: Vec<f32> = Vec::new();
    let mut lane_by_step = HashMap::with_capacity(items.len());

    for (id, start, end) in items {
        let mut lane = 0;
        while lane < lane_ends.len() {
            if start >= lane_ends[lane] + STEP_MIN_GAP_PX {
                break;
            }
            lane += 1;
        }
        if lane == lane_ends.len() {
            lane_ends.push(end);
        } else {
            lane_ends[lane] = end;
        }
        lane_by_step.insert(id, lane);
    }

    StepLaneLayout {
        lanes: lane_ends.len(),
        lane_by_step,
    }
}

/// Extra row height consumed by an expanded task with `lanes` occupied lanes.
pub fn expanded_extra_height(lanes: usize) -> f32 {
    STEP_TOP_PADDING + lanes.max(1) as f32 * STEP_ROW_PITCH - STEP_LINE_GAP + STEP_BOTTOM_PADDING
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::grid::{DateGrid, DateWindow};
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn grid() -> DateGrid {
        DateGrid::new(
            DateWindow {
                start: day("2025-01-01"),
                end: day("2025-12-31"),
            },
            3,
        )
    }

    fn step(icon: &str, text: &str, date: &str) -> TaskStep {
        TaskStep::new(icon, text, day(date))
    }

    #[test]
    fn label_width_is_clamped() {
        assert_eq!(estimate_label_width(""), 90.0);
        assert_eq!(estimate_label_width("abcdef"), 96.0);
        assert_eq!(estimate_label_width(&"x".repeat(100)), 200.0);
    }

    #[test]
    fn far_apart_steps_share_lane_zero() {
        let steps = vec![
            step("Flag", "a", "2025-01-10"),
            step("Flag", "b", "2025-06-10"),
        ];
        let layout = compute_step_lanes(&steps, &grid());
        assert_eq!(layout.lanes, 1);
        assert!(layout.lane_by_step.values().all(|&l| l == 0));
    }

    #[test]
    fn colliding_steps_stack_and_ties_keep_input_order() {
        let first = step("Flag", "même jour", "2025-03-01");
        let second = step("Star", "même jour", "2025-03-01");
        let steps = vec![first.clone(), second.clone()];
        let layout = compute_step_lanes(&steps, &grid());
        assert_eq!(layout.lanes, 2);
        assert_eq!(layout.lane_by_step[&first.id], 0);
        assert_eq!(layout.lane_by_step[&second.id], 1);
    }

    #[test]
    fn packing_is_deterministic() {
        let steps = vec![
            step("Flag", "préparation", "2025-02-03"),
            step("Zap", "go", "2025-02-01"),
            step("Clock", "revue intermédiaire", "2025-02-02"),
            step("Info", "bilan", "2025-02-04"),
        ];
        let a = compute_step_lanes(&steps, &grid());
        let b = compute_step_lanes(&steps, &grid());
        assert_eq!(a, b);
    }

    #[test]
    fn freed_lane_is_reused() {
        // Three clustered steps then a far one: the far one fits back in lane 0.
        let steps = vec![
            step("Flag", "a", "2025-02-01"),
            step("Flag", "b", "2025-02-02"),
            step("Flag", "c", "2025-02-03"),
            step("Flag", "d", "2025-08-01"),
        ];
        let layout = compute_step_lanes(&steps, &grid());
        assert_eq!(layout.lane_by_step[&steps[3].id], 0);
    }

    #[test]
    fn extra_height_formula() {
        // one lane: 8 + 30 - 8 + 10
        assert_eq!(expanded_extra_height(0), 40.0);
        assert_eq!(expanded_extra_height(1), 40.0);
        assert_eq!(expanded_extra_height(3), 100.0);
    }

    proptest! {
        #[test]
        fn same_lane_labels_never_overlap(
            offsets in proptest::collection::vec(0i64..300, 1..20),
            lens in proptest::collection::vec(0usize..40, 1..20),
        ) {
            let g = grid();
            let steps: Vec<TaskStep> = offsets
                .iter()
                .zip(lens.iter().cycle())
                .map(|(&off, &len)| {
                    step("Flag", &"x".repeat(len), "2025-01-01")
                        .date_shifted(off)
                })
                .collect();
            let layout = compute_step_lanes(&steps, &g);

            for a in &steps {
                for b in &steps {
                    if a.id == b.id || layout.lane_by_step[&a.id] != layout.lane_by_step[&b.id] {
                        continue;
                    }
                    let (a_start, a_end) = label_interval(a, &g);
                    let (b_start, b_end) = label_interval(b, &g);
                    // Intervals in the same lane are separated by the minimum gap.
                    prop_assert!(
                        a_end + STEP_MIN_GAP_PX <= b_start || b_end + STEP_MIN_GAP_PX <= a_start
                    );
                }
            }
        }
    }

    impl TaskStep {
        fn date_shifted(mut self, days: i64) -> Self {
            self.date += chrono::Duration::days(days);
            self
        }
    }
}
