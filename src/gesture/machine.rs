//! Drag state machine
//!
//! ```text
//!   Idle ──press on marker──▶ Armed ──moved > threshold──▶ Dragging
//!    ▲                          │                             │
//!    └────── release/cancel ────┴──── release (commit) ───────┘
//!                                     cancel (discard)
//! ```
//!
//! Only one gesture is tracked at a time; presses from any pointer while a
//! gesture is active are ignored until it ends. The dragged transition is
//! addressed by its [`TransitionId`] because the preview is not re-sorted
//! until release.

use log::{debug, info};

use super::events::GestureOutput;
use crate::config::GestureConfig;
use crate::coords::{CoordinateMapper, Point};
use crate::normalizer::Normalizer;
use crate::types::{DaySchedule, TimeOfDay, TransitionId, MINUTES_PER_DAY};

/// A press that has grabbed a transition marker
#[derive(Debug, Clone, PartialEq)]
pub struct Grab {
    pub pointer_id: u32,
    pub target: TransitionId,
    /// The grabbed transition is the 00:00 anchor; its time never moves
    pub anchor: bool,
    /// Press position in screen pixels
    pub start: Point,
    /// Day as it was when the press landed
    pub origin: DaySchedule,
    /// Mapping frozen for the duration of the gesture
    pub mapper: CoordinateMapper,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Armed(Grab),
    Dragging { grab: Grab, preview: DaySchedule },
}

/// Pointer/touch drag gesture tracker
#[derive(Debug, Clone)]
pub struct DragMachine {
    state: DragState,
    threshold_px: f64,
    snap_minutes: u32,
}

impl DragMachine {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            state: DragState::Idle,
            threshold_px: config.drag_threshold_px,
            snap_minutes: config.snap_minutes.clamp(1, 60),
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, DragState::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    fn grab(&self) -> Option<&Grab> {
        match &self.state {
            DragState::Idle => None,
            DragState::Armed(grab) | DragState::Dragging { grab, .. } => Some(grab),
        }
    }

    /// Mapping in force for the active gesture
    pub fn frozen_mapper(&self) -> Option<&CoordinateMapper> {
        self.grab().map(|g| &g.mapper)
    }

    pub fn active_target(&self) -> Option<TransitionId> {
        self.grab().map(|g| g.target)
    }

    /// Press over the marker of `target` in `day`.
    pub fn press(
        &mut self,
        pointer_id: u32,
        screen: Point,
        target: TransitionId,
        day: &DaySchedule,
        mapper: CoordinateMapper,
    ) -> Vec<GestureOutput> {
        if !self.is_idle() {
            debug!("Ignoring press from pointer {} during active gesture", pointer_id);
            return Vec::new();
        }
        let Some(transition) = day.get(target) else {
            return Vec::new();
        };

        debug!("Armed on transition {} at {}", target, transition.time);
        self.state = DragState::Armed(Grab {
            pointer_id,
            target,
            anchor: transition.time.is_midnight(),
            start: screen,
            origin: day.clone(),
            mapper,
        });
        vec![GestureOutput::InstallListeners]
    }

    /// Pointer moved to `screen` (viewport pixels) / `logical` (plane units).
    pub fn motion(&mut self, pointer_id: u32, screen: Point, logical: Point) -> Vec<GestureOutput> {
        let state = std::mem::take(&mut self.state);
        let (next, outputs) = match state {
            DragState::Armed(grab) if grab.pointer_id == pointer_id => {
                if screen.distance(grab.start) <= self.threshold_px {
                    (DragState::Armed(grab), Vec::new())
                } else {
                    debug!("Drag threshold exceeded for transition {}", grab.target);
                    let preview = self.drag_to(&grab, &grab.origin, logical);
                    let outputs = vec![GestureOutput::Preview(preview.clone())];
                    (DragState::Dragging { grab, preview }, outputs)
                }
            }
            DragState::Dragging { grab, preview } if grab.pointer_id == pointer_id => {
                let preview = self.drag_to(&grab, &preview, logical);
                let outputs = vec![GestureOutput::Preview(preview.clone())];
                (DragState::Dragging { grab, preview }, outputs)
            }
            other => (other, Vec::new()),
        };
        self.state = next;
        outputs
    }

    /// Pointer released. Commits only if the gesture became a drag.
    pub fn release(&mut self, pointer_id: u32) -> Vec<GestureOutput> {
        if self.grab().is_some_and(|g| g.pointer_id != pointer_id) {
            return Vec::new();
        }
        match std::mem::take(&mut self.state) {
            DragState::Idle => Vec::new(),
            DragState::Armed(grab) => {
                debug!("Released below threshold on {}; no edit", grab.target);
                vec![GestureOutput::RemoveListeners]
            }
            DragState::Dragging { grab, preview } => {
                let committed = Normalizer::normalize(&preview);
                info!("Committed drag of transition {}", grab.target);
                vec![
                    GestureOutput::RemoveListeners,
                    GestureOutput::Commit(committed),
                ]
            }
        }
    }

    /// Abort the gesture without committing. `None` aborts whatever pointer
    /// owns it (host-level interrupts such as a day switch).
    pub fn cancel(&mut self, pointer_id: Option<u32>) -> Vec<GestureOutput> {
        let Some(grab) = self.grab() else {
            return Vec::new();
        };
        if pointer_id.is_some_and(|id| id != grab.pointer_id) {
            return Vec::new();
        }
        debug!("Gesture on {} cancelled; preview discarded", grab.target);
        self.state = DragState::Idle;
        vec![GestureOutput::RemoveListeners]
    }

    fn drag_to(&self, grab: &Grab, preview: &DaySchedule, logical: Point) -> DaySchedule {
        let temperature = grab.mapper.y_to_temp(logical.y);
        let time = if grab.anchor {
            TimeOfDay::MIDNIGHT
        } else {
            snap_time(grab.mapper.x_to_hour(logical.x), self.snap_minutes)
        };
        preview
            .with_updated(grab.target, time, temperature)
            .unwrap_or_else(|| preview.clone())
    }
}

/// Snap an hour of day to the `step_minutes` grid, keeping clear of the
/// 00:00 anchor slot and of midnight at the end of the day.
pub fn snap_time(hour: f64, step_minutes: u32) -> TimeOfDay {
    let step = step_minutes.max(1);
    let last_slot = (u32::from(MINUTES_PER_DAY) - 1) / step * step;
    let slot = ((hour * 60.0 / f64::from(step)).round().max(0.0) as u32) * step;
    TimeOfDay::from_minutes_clamped(slot.clamp(step, last_slot))
}
