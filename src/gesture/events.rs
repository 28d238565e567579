//! Gesture input and output types
//!
//! Mouse, pen and touch streams are unified into one [`InputEvent`] shape;
//! touches carry their identifier as `pointer_id`.

use serde::{Deserialize, Serialize};

use crate::coords::Point;
use crate::types::DaySchedule;

/// Device that produced a pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerSource {
    #[default]
    Mouse,
    Pen,
    Touch,
}

/// A pointer or touch sample in viewport pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    #[serde(default)]
    pub pointer_id: u32,
    #[serde(default)]
    pub source: PointerSource,
    pub position: Point,
}

impl PointerEvent {
    pub fn mouse(x: f64, y: f64) -> Self {
        Self {
            pointer_id: 0,
            source: PointerSource::Mouse,
            position: Point::new(x, y),
        }
    }

    pub fn touch(identifier: u32, x: f64, y: f64) -> Self {
        Self {
            pointer_id: identifier,
            source: PointerSource::Touch,
            position: Point::new(x, y),
        }
    }
}

/// Raw input delivered by the host rendering surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    /// mousedown / pointerdown / touchstart
    PointerDown(PointerEvent),
    /// mousemove / pointermove / touchmove
    PointerMove(PointerEvent),
    /// mouseup / pointerup / touchend
    PointerUp(PointerEvent),
    /// pointercancel / touchcancel
    PointerCancel(PointerEvent),
    /// dblclick / double tap; removes the transition under the pointer
    DoubleActivate(PointerEvent),
}

impl InputEvent {
    pub fn pointer(&self) -> &PointerEvent {
        match self {
            InputEvent::PointerDown(p)
            | InputEvent::PointerMove(p)
            | InputEvent::PointerUp(p)
            | InputEvent::PointerCancel(p)
            | InputEvent::DoubleActivate(p) => p,
        }
    }
}

/// What the drag machine asks of its host
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutput {
    /// Attach move/up/cancel listeners to the global input surface
    InstallListeners,
    /// Detach them again
    RemoveListeners,
    /// Live, uncommitted state of the dragged day
    Preview(DaySchedule),
    /// Final normalized day of a completed drag
    Commit(DaySchedule),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_input_event_json() {
        let json = r#"{"type": "pointer_down", "pointer_id": 3, "source": "touch", "position": {"x": 10.0, "y": 20.5}}"#;
        let event: InputEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event, InputEvent::PointerDown(PointerEvent::touch(3, 10.0, 20.5)));
    }

    #[test]
    fn test_pointer_defaults_to_mouse() {
        let json = r#"{"type": "pointer_move", "position": {"x": 1.0, "y": 2.0}}"#;
        let event: InputEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.pointer(), &PointerEvent::mouse(1.0, 2.0));
    }
}
