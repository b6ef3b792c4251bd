use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use super::grid::DateGrid;
use super::grouping::GroupedRow;
use super::lanes::{compute_step_lanes, expanded_extra_height, StepLaneLayout};

pub const ROW_HEIGHT: f32 = 36.0;
pub const GROUP_HEADER_HEIGHT: f32 = 32.0;

/// Per-task lane layouts and extra heights for the currently expanded tasks.
/// Only expanded tasks with at least one step get an entry; everything else
/// keeps the base row height.
#[derive(Debug, Clone, Default)]
pub struct ExpandedMetrics {
    pub lanes_by_task: HashMap<Uuid, StepLaneLayout>,
    pub extra_by_task: HashMap<Uuid, f32>,
}

impl ExpandedMetrics {
    pub fn extra_for(&self, task_id: Uuid) -> f32 {
        self.extra_by_task.get(&task_id).copied().unwrap_or(0.0)
    }
}

pub fn compute_expanded_metrics(
    rows: &[GroupedRow<'_>],
    expanded: &HashSet<Uuid>,
    grid: &DateGrid,
) -> ExpandedMetrics {
    let mut metrics = ExpandedMetrics::default();
    for row in rows {
        let GroupedRow::Task { task, .. } = row else {
            continue;
        };
        if !expanded.contains(&task.id) || task.steps.is_empty() {
            continue;
        }
        let layout = compute_step_lanes(&task.steps, grid);
        metrics
            .extra_by_task
            .insert(task.id, expanded_extra_height(layout.lanes));
        metrics.lanes_by_task.insert(task.id, layout);
    }
    metrics
}

/// Vertical slot of one row, aligned by index with the input row sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowSlot {
    pub y: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Default)]
pub struct RowLayout {
    pub slots: Vec<RowSlot>,
    pub total_height: f32,
}

/// Single forward pass accumulating a running y. Each row's offset is the sum
/// of the heights of all rows before it; the final y sizes the scrollable
/// canvas and every full-height guide line.
pub fn layout_rows(rows: &[GroupedRow<'_>], metrics: &ExpandedMetrics) -> RowLayout {
    let mut slots = Vec::with_capacity(rows.len());
    let mut y = 0.0f32;
    for row in rows {
        let height = match row {
            GroupedRow::Header(_) => GROUP_HEADER_HEIGHT,
            GroupedRow::Task { task, .. } => ROW_HEIGHT + metrics.extra_for(task.id),
        };
        slots.push(RowSlot { y, height });
        y += height;
    }
    RowLayout {
        slots,
        total_height: y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Task, TaskStep};
    use crate::timeline::grid::{DateGrid, DateWindow};
    use crate::timeline::grouping::{group_tasks, GroupBy};
    use chrono::NaiveDate;

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

    fn task_with_steps(n: usize) -> Task {
        let mut t = Task::new("t", uuid::Uuid::new_v4(), day("2025-02-01"), day("2025-02-20"));
        for _ in 0..n {
            // Same-day steps all collide, forcing one lane each.
            t.steps.push(TaskStep::new("Flag", "étape", day("2025-02-05")));
        }
        t
    }

    #[test]
    fn offsets_are_cumulative_and_total_matches_sum() {
        let a = task_with_steps(0);
        let b = task_with_steps(2);
        let c = task_with_steps(0);
        let refs = vec![&a, &b, &c];
        let rows = group_tasks(&refs, &[GroupBy::Month], &[]);

        let mut expanded = HashSet::new();
        expanded.insert(b.id);
        let g = grid();
        let metrics = compute_expanded_metrics(&rows, &expanded, &g);
        let layout = layout_rows(&rows, &metrics);

        let mut running = 0.0;
        for slot in &layout.slots {
            assert_eq!(slot.y, running);
            running += slot.height;
        }
        assert_eq!(layout.total_height, running);
    }

    #[test]
    fn expanded_task_with_steps_gains_lane_height() {
        let t = task_with_steps(3);
        let refs = vec![&t];
        let rows = group_tasks(&refs, &[], &[]);
        let g = grid();

        let mut expanded = HashSet::new();
        expanded.insert(t.id);
        let metrics = compute_expanded_metrics(&rows, &expanded, &g);
        let layout = layout_rows(&rows, &metrics);

        // Three colliding steps stack into three lanes.
        assert_eq!(metrics.lanes_by_task[&t.id].lanes, 3);
        assert_eq!(layout.slots[0].height, ROW_HEIGHT + expanded_extra_height(3));
    }

    #[test]
    fn collapsed_or_stepless_tasks_keep_base_height() {
        let with_steps = task_with_steps(2);
        let stepless = task_with_steps(0);
        let refs = vec![&with_steps, &stepless];
        let rows = group_tasks(&refs, &[], &[]);
        let g = grid();

        // Both expanded, but only the one with steps grows.
        let expanded: HashSet<_> = [with_steps.id, stepless.id].into_iter().collect();
        let metrics = compute_expanded_metrics(&rows, &expanded, &g);
        let layout = layout_rows(&rows, &metrics);
        assert!(layout.slots[0].height > ROW_HEIGHT);
        assert_eq!(layout.slots[1].height, ROW_HEIGHT);

        // Collapsed: base height even with steps.
        let metrics = compute_expanded_metrics(&rows, &HashSet::new(), &g);
        let layout = layout_rows(&rows, &metrics);
        assert_eq!(layout.slots[0].height, ROW_HEIGHT);
    }

    #[test]
    fn header_rows_use_header_height() {
        let t = task_with_steps(0);
        let refs = vec![&t];
        let rows = group_tasks(&refs, &[GroupBy::Month], &[]);
        let layout = layout_rows(&rows, &ExpandedMetrics::default());
        assert_eq!(layout.slots[0].height, GROUP_HEADER_HEIGHT);
        assert_eq!(layout.slots[1].y, GROUP_HEADER_HEIGHT);
        assert_eq!(layout.total_height, GROUP_HEADER_HEIGHT + ROW_HEIGHT);
    }
}
