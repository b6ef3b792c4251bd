use chrono::NaiveDate;
use egui::{Pos2, Vec2};
use uuid::Uuid;

/// Displacement below this resolves a bar press as a click, not a drag.
pub const CLICK_THRESHOLD_PX: f32 = 5.0;

/// Live bar-drag session. Mutated imperatively on every pointer move; the
/// reactive side only sees the committed outcome on release.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub task_id: Uuid,
    pub press_x: f32,
    pub current_x: f32,
    pub original_start: NaiveDate,
    pub original_end: NaiveDate,
}

impl DragSession {
    pub fn delta_x(&self) -> f32 {
        self.current_x - self.press_x
    }
}

/// Live canvas-pan session (secondary or middle button on the background).
#[derive(Debug, Clone, PartialEq)]
pub struct PanSession {
    pub press: Pos2,
    pub origin_scroll: Vec2,
}

/// What a released bar-drag resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    /// Displacement under the click threshold: open the task detail view,
    /// change no dates.
    OpenTask(Uuid),
    /// Shift both dates by this many whole days, preserving duration.
    Reschedule { task_id: Uuid, delta_days: i64 },
    /// Past the click threshold but under one day of movement: no change.
    Nothing,
}

/// Convert a pixel displacement into a whole-day delta.
pub fn day_delta(delta_px: f32, day_width: f32) -> i64 {
    (delta_px / day_width).round() as i64
}

/// One state machine over the pointer stream, disambiguating bar-drag from
/// canvas-pan. Only one channel can be active at a time; releasing the
/// pointer anywhere always resolves the open session (there is no cancel
/// path).
#[derive(Debug, Default)]
pub struct GestureController {
    drag: Option<DragSession>,
    pan: Option<PanSession>,
}

impl GestureController {
    /// Start a bar-drag. Refused while any session is open.
    pub fn begin_drag(
        &mut self,
        task_id: Uuid,
        pointer_x: f32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> bool {
        if self.drag.is_some() || self.pan.is_some() {
            return false;
        }
        self.drag = Some(DragSession {
            task_id,
            press_x: pointer_x,
            current_x: pointer_x,
            original_start: start,
            original_end: end,
        });
        true
    }

    /// Start a background pan. Refused while any session is open.
    pub fn begin_pan(&mut self, pointer: Pos2, scroll: Vec2) -> bool {
        if self.drag.is_some() || self.pan.is_some() {
            return false;
        }
        self.pan = Some(PanSession {
            press: pointer,
            origin_scroll: scroll,
        });
        true
    }

    /// Feed the current pointer position. For a pan this returns the scroll
    /// offset to apply right away, bypassing the reactive layer.
    pub fn pointer_moved(&mut self, pointer: Pos2) -> Option<Vec2> {
        if let Some(drag) = &mut self.drag {
            drag.current_x = pointer.x;
        }
        self.pan.as_ref().map(|pan| {
            let delta = pointer - pan.press;
            pan.origin_scroll - delta
        })
    }

    /// Visual translation of the dragged bar this frame, if any.
    pub fn drag_preview(&self) -> Option<(Uuid, f32)> {
        self.drag.as_ref().map(|d| (d.task_id, d.delta_x()))
    }

    pub fn is_dragging(&self, task_id: Uuid) -> bool {
        self.drag.as_ref().is_some_and(|d| d.task_id == task_id)
    }

    pub fn is_active(&self) -> bool {
        self.drag.is_some() || self.pan.is_some()
    }

    pub fn is_panning(&self) -> bool {
        self.pan.is_some()
    }

    /// Resolve on pointer release. A drag commits-or-clicks; a pan just ends.
    pub fn released(&mut self, day_width: f32) -> Option<DragOutcome> {
        self.pan = None;
        let drag = self.drag.take()?;
        let delta_px = drag.delta_x();
        if delta_px.abs() < CLICK_THRESHOLD_PX {
            return Some(DragOutcome::OpenTask(drag.task_id));
        }
        let delta_days = day_delta(delta_px, day_width);
        if delta_days == 0 {
            return Some(DragOutcome::Nothing);
        }
        Some(DragOutcome::Reschedule {
            task_id: drag.task_id,
            delta_days,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn pressed(x: f32) -> GestureController {
        let mut ctl = GestureController::default();
        assert!(ctl.begin_drag(Uuid::nil(), x, day("2025-01-10"), day("2025-01-12")));
        ctl
    }

    #[test]
    fn sub_threshold_release_is_a_click() {
        let mut ctl = pressed(100.0);
        ctl.pointer_moved(Pos2::new(103.9, 50.0));
        assert_eq!(ctl.released(6.0), Some(DragOutcome::OpenTask(Uuid::nil())));
        assert!(!ctl.is_active());
    }

    #[test]
    fn three_day_drag_commits_three_days() {
        // pixels_per_day = 6, displacement = 3 days + 1 px
        let mut ctl = pressed(100.0);
        ctl.pointer_moved(Pos2::new(100.0 + 6.0 * 3.0 + 1.0, 50.0));
        assert_eq!(
            ctl.released(6.0),
            Some(DragOutcome::Reschedule {
                task_id: Uuid::nil(),
                delta_days: 3
            })
        );
    }

    #[test]
    fn leftward_drag_commits_negative_days() {
        let mut ctl = pressed(100.0);
        ctl.pointer_moved(Pos2::new(100.0 - 13.0, 50.0));
        assert_eq!(
            ctl.released(6.0),
            Some(DragOutcome::Reschedule {
                task_id: Uuid::nil(),
                delta_days: -2
            })
        );
    }

    #[test]
    fn past_threshold_but_sub_day_commits_nothing() {
        // 10 px is past the click threshold but rounds to zero days at 24 px/day.
        let mut ctl = pressed(100.0);
        ctl.pointer_moved(Pos2::new(110.0, 50.0));
        assert_eq!(ctl.released(24.0), Some(DragOutcome::Nothing));
    }

    #[test]
    fn channels_are_mutually_exclusive() {
        let mut ctl = pressed(100.0);
        assert!(!ctl.begin_pan(Pos2::new(0.0, 0.0), Vec2::ZERO));
        assert!(!ctl.begin_drag(Uuid::new_v4(), 0.0, day("2025-01-01"), day("2025-01-02")));
        ctl.released(6.0);

        assert!(ctl.begin_pan(Pos2::new(0.0, 0.0), Vec2::ZERO));
        assert!(!ctl.begin_drag(Uuid::new_v4(), 0.0, day("2025-01-01"), day("2025-01-02")));
    }

    #[test]
    fn pan_moves_scroll_against_pointer() {
        let mut ctl = GestureController::default();
        assert!(ctl.begin_pan(Pos2::new(200.0, 100.0), Vec2::new(500.0, 40.0)));
        // Dragging the pointer right/down pulls the content with it.
        let scroll = ctl.pointer_moved(Pos2::new(230.0, 110.0)).unwrap();
        assert_eq!(scroll, Vec2::new(470.0, 30.0));
        assert_eq!(ctl.released(6.0), None);
        assert!(!ctl.is_active());
    }

    #[test]
    fn drag_preview_tracks_pointer() {
        let mut ctl = pressed(10.0);
        ctl.pointer_moved(Pos2::new(25.0, 0.0));
        assert_eq!(ctl.drag_preview(), Some((Uuid::nil(), 15.0)));
    }
}
