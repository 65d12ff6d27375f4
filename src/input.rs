//! Drag and touch input
//!
//! The piece "in flight" between pick-up and drop lives here, not in the
//! session. The core only ever sees the resulting `Intent::Place`.
//!
//! Coordinates are client (viewport) pixels, y down.

use glam::Vec2;

use crate::sim::{Intent, TemplateKey};

/// Screen rectangle of one lever cell's drop zone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellHitbox {
    pub cell: i32,
    pub min: Vec2,
    pub max: Vec2,
}

impl CellHitbox {
    /// From a bounding client rect (left, top, right, bottom)
    pub fn from_client_rect(cell: i32, left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            cell,
            min: Vec2::new(left.min(right), top.min(bottom)),
            max: Vec2::new(left.max(right), top.max(bottom)),
        }
    }

    /// Edges count as inside
    pub fn contains(&self, point: Vec2) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

/// First cell whose drop zone contains `point`
pub fn hit_test(point: Vec2, hitboxes: &[CellHitbox]) -> Option<i32> {
    hitboxes.iter().find(|h| h.contains(point)).map(|h| h.cell)
}

/// The current drag gesture, if any
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// HTML5 drag-and-drop; the browser reports the target cell
    Pointer { template: TemplateKey },
    /// Touch drag; we track the finger and hit-test on release
    Touch { template: TemplateKey, position: Vec2 },
}

impl DragState {
    /// Start a mouse drag. Exhausted templates cannot be picked up.
    pub fn begin_pointer(&mut self, template: TemplateKey, remaining: u32) -> bool {
        if remaining == 0 {
            return false;
        }
        *self = DragState::Pointer { template };
        true
    }

    /// Start a touch drag at the finger position
    pub fn begin_touch(&mut self, template: TemplateKey, position: Vec2, remaining: u32) -> bool {
        if remaining == 0 {
            return false;
        }
        *self = DragState::Touch { template, position };
        true
    }

    /// Track the finger. Returns false when no touch drag is active
    /// (the page should scroll normally then).
    pub fn touch_move(&mut self, to: Vec2) -> bool {
        match self {
            DragState::Touch { position, .. } => {
                *position = to;
                true
            }
            _ => false,
        }
    }

    /// Pointer drop onto a cell. Touch drags are not affected.
    pub fn drop_on(&mut self, cell: i32) -> Option<Intent> {
        if !matches!(self, DragState::Pointer { .. }) {
            return None;
        }
        match std::mem::take(self) {
            DragState::Pointer { template } => Some(Intent::Place { cell, template }),
            _ => None,
        }
    }

    /// Finger lifted: place on the cell under the last position, if any
    pub fn touch_end(&mut self, hitboxes: &[CellHitbox]) -> Option<Intent> {
        if !matches!(self, DragState::Touch { .. }) {
            return None;
        }
        match std::mem::take(self) {
            DragState::Touch { template, position } => {
                let cell = hit_test(position, hitboxes)?;
                Some(Intent::Place { cell, template })
            }
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        *self = DragState::Idle;
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, DragState::Idle)
    }

    /// A touch drag is in flight, so the tray item under the finger must stay
    /// in the page until the touch ends
    pub fn holds_tray(&self) -> bool {
        matches!(self, DragState::Touch { .. })
    }

    /// Where to draw the touch ghost
    pub fn ghost_position(&self) -> Option<Vec2> {
        match self {
            DragState::Touch { position, .. } => Some(*position),
            _ => None,
        }
    }

    pub fn payload(&self) -> Option<&TemplateKey> {
        match self {
            DragState::Idle => None,
            DragState::Pointer { template } | DragState::Touch { template, .. } => Some(template),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c1() -> TemplateKey {
        TemplateKey::Id("c1".to_string())
    }

    fn boxes() -> Vec<CellHitbox> {
        vec![
            CellHitbox::from_client_rect(-1, 0.0, 0.0, 50.0, 80.0),
            CellHitbox::from_client_rect(1, 100.0, 0.0, 150.0, 80.0),
        ]
    }

    #[test]
    fn test_hit_test_inclusive_edges() {
        let b = boxes();
        assert_eq!(hit_test(Vec2::new(0.0, 0.0), &b), Some(-1));
        assert_eq!(hit_test(Vec2::new(50.0, 80.0), &b), Some(-1));
        assert_eq!(hit_test(Vec2::new(125.0, 40.0), &b), Some(1));
        assert_eq!(hit_test(Vec2::new(75.0, 40.0), &b), None);
        assert_eq!(hit_test(Vec2::new(125.0, 81.0), &b), None);
    }

    #[test]
    fn test_from_client_rect_normalizes() {
        let h = CellHitbox::from_client_rect(2, 10.0, 20.0, 0.0, 0.0);
        assert!(h.contains(Vec2::new(5.0, 10.0)));
    }

    #[test]
    fn test_pointer_drop_yields_place() {
        let mut drag = DragState::default();
        assert!(drag.begin_pointer(c1(), 3));
        assert_eq!(
            drag.drop_on(-2),
            Some(Intent::Place {
                cell: -2,
                template: c1()
            })
        );
        assert_eq!(drag, DragState::Idle);
        // Second drop with nothing in flight
        assert_eq!(drag.drop_on(-2), None);
    }

    #[test]
    fn test_exhausted_template_cannot_be_dragged() {
        let mut drag = DragState::default();
        assert!(!drag.begin_pointer(c1(), 0));
        assert!(!drag.begin_touch(c1(), Vec2::ZERO, 0));
        assert!(!drag.is_active());
    }

    #[test]
    fn test_touch_drag_hit_tests_last_position() {
        let mut drag = DragState::default();
        assert!(drag.begin_touch(c1(), Vec2::new(300.0, 300.0), 1));
        assert!(drag.touch_move(Vec2::new(120.0, 30.0)));
        assert_eq!(drag.ghost_position(), Some(Vec2::new(120.0, 30.0)));
        assert_eq!(
            drag.touch_end(&boxes()),
            Some(Intent::Place {
                cell: 1,
                template: c1()
            })
        );
        assert!(!drag.is_active());
    }

    #[test]
    fn test_touch_released_off_board_clears_drag() {
        let mut drag = DragState::default();
        drag.begin_touch(c1(), Vec2::new(300.0, 300.0), 1);
        assert_eq!(drag.touch_end(&boxes()), None);
        assert_eq!(drag, DragState::Idle);
    }

    #[test]
    fn test_touch_move_without_drag() {
        let mut drag = DragState::default();
        assert!(!drag.touch_move(Vec2::ONE));
        drag.begin_pointer(c1(), 1);
        assert!(!drag.touch_move(Vec2::ONE));
        assert_eq!(drag.touch_end(&boxes()), None);
        assert!(drag.is_active());
    }

    #[test]
    fn test_tray_held_for_whole_touch_drag() {
        let mut drag = DragState::default();
        assert!(!drag.holds_tray());

        drag.begin_touch(c1(), Vec2::new(300.0, 300.0), 2);
        assert!(drag.holds_tray());
        drag.touch_move(Vec2::new(120.0, 30.0));
        assert!(drag.holds_tray());

        assert!(drag.touch_end(&boxes()).is_some());
        assert!(!drag.holds_tray());

        drag.begin_touch(c1(), Vec2::ZERO, 2);
        drag.cancel();
        assert!(!drag.holds_tray());
    }

    #[test]
    fn test_pointer_drag_does_not_hold_tray() {
        let mut drag = DragState::default();
        drag.begin_pointer(c1(), 1);
        assert!(drag.is_active());
        assert!(!drag.holds_tray());
    }

    #[test]
    fn test_new_drag_supersedes_old() {
        let mut drag = DragState::default();
        drag.begin_touch(c1(), Vec2::ZERO, 1);
        let c2 = TemplateKey::Id("c2".to_string());
        drag.begin_pointer(c2.clone(), 1);
        assert_eq!(drag.payload(), Some(&c2));
        assert_eq!(drag.ghost_position(), None);
    }
}
