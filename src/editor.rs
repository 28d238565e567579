//! Editing session
//!
//! [`ScheduleEditor`] is the host-facing API. It owns the working weekly
//! schedule, the selected day, the rendering surface geometry and the drag
//! machine, and answers every action with the boundary events the host
//! should act on.

use log::{debug, info, warn};
use serde::Serialize;

use crate::codec::{parse_weekly, serialize_weekly, WeeklyTransport};
use crate::config::EditorConfig;
use crate::coords::{compute_range, CoordinateMapper, Plane, SurfaceGeometry, SurfaceTransform};
use crate::error::ScheduleError;
use crate::gesture::{hit_test, DragMachine, GestureOutput, InputEvent};
use crate::normalizer::Normalizer;
use crate::types::{
    clamp_temperature, quantize_temperature, DayKey, DaySchedule, TimeOfDay, Transition,
    TransitionId, WeeklySchedule,
};
use crate::validator::{ValidationReport, Validator};

/// Boundary events emitted to the host
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EditorEvent {
    /// Live drag state; never persisted
    Preview { day: DayKey, schedule: DaySchedule },
    /// Normalized result of a completed edit, ready for transport
    Committed { day: DayKey, schedule: DaySchedule },
    /// Attach move/up/cancel listeners to the global input surface
    SubscribeGlobal,
    /// Detach them
    UnsubscribeGlobal,
}

/// Stateful editing session over one weekly schedule
pub struct ScheduleEditor {
    week: WeeklySchedule,
    selected: DayKey,
    config: EditorConfig,
    plane: Plane,
    surface: SurfaceGeometry,
    drag: DragMachine,
}

impl ScheduleEditor {
    /// Start a session on `week`, with Monday selected.
    pub fn new(week: WeeklySchedule, config: EditorConfig) -> Self {
        let plane = Plane::from(&config.plane);
        Self {
            week,
            selected: DayKey::Monday,
            surface: SurfaceGeometry::identity(&plane),
            drag: DragMachine::new(&config.gesture),
            plane,
            config,
        }
    }

    /// Start a session from the device's weekly transport strings.
    pub fn from_transport(transport: &WeeklyTransport, config: EditorConfig) -> Self {
        Self::new(parse_weekly(transport), config)
    }

    pub fn week(&self) -> &WeeklySchedule {
        &self.week
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn selected_day(&self) -> DayKey {
        self.selected
    }

    pub fn selected_schedule(&self) -> &DaySchedule {
        self.week.day(self.selected)
    }

    pub fn to_transport(&self) -> WeeklyTransport {
        serialize_weekly(&self.week)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Switch the edited day. Any gesture in progress is cancelled.
    pub fn select_day(&mut self, day: DayKey) -> Vec<EditorEvent> {
        let events = self.cancel_gesture();
        self.selected = day;
        debug!("Selected {}", day);
        events
    }

    /// Record where the rendering surface currently sits on screen.
    pub fn set_surface(&mut self, surface: SurfaceGeometry) {
        self.surface = surface;
    }

    /// Mapping for the selected day. Frozen while a gesture is active so the
    /// axis does not rescale under the pointer.
    pub fn mapper(&self) -> CoordinateMapper {
        if let Some(mapper) = self.drag.frozen_mapper() {
            return *mapper;
        }
        CoordinateMapper::new(
            self.plane,
            compute_range(&self.config.axis, self.selected_schedule()),
        )
    }

    // --- Form actions ---

    /// Add a transition to the selected day.
    ///
    /// Refused without an event when the day already holds six transitions
    /// or the time is taken.
    pub fn add_transition(&mut self, time: TimeOfDay, temperature: f64) -> Vec<EditorEvent> {
        if !self.form_allowed() {
            return Vec::new();
        }
        let day = self.selected_schedule();
        if day.at(time).is_some() {
            warn!("Refusing add at {}: slot already used on {}", time, self.selected);
            return Vec::new();
        }
        let transition = Transition::new(time, clamp_temperature(quantize_temperature(temperature)));
        match day.with_added(transition) {
            Some(added) => self.commit(Normalizer::normalize(&added)),
            None => {
                warn!("Refusing add at {}: {} is full", time, self.selected);
                Vec::new()
            }
        }
    }

    /// Edit time and temperature of an existing transition. The anchor keeps
    /// its 00:00 time; moving onto an occupied slot is refused.
    pub fn update_transition(
        &mut self,
        id: TransitionId,
        time: TimeOfDay,
        temperature: f64,
    ) -> Result<Vec<EditorEvent>, ScheduleError> {
        let day = self.selected_schedule();
        let current = day
            .get(id)
            .ok_or_else(|| ScheduleError::UnknownTransition(id.to_string()))?;
        if !self.form_allowed() {
            return Ok(Vec::new());
        }

        let time = if current.time.is_midnight() {
            TimeOfDay::MIDNIGHT
        } else {
            time
        };
        if day.at(time).is_some_and(|other| other.id != id) {
            warn!("Refusing move of {} to occupied slot {}", id, time);
            return Ok(Vec::new());
        }

        let temperature = clamp_temperature(quantize_temperature(temperature));
        let updated = match day.with_updated(id, time, temperature) {
            Some(updated) => Normalizer::normalize(&updated),
            None => return Ok(Vec::new()),
        };
        if updated.same_values(day) {
            return Ok(Vec::new());
        }
        Ok(self.commit(updated))
    }

    /// Delete a transition from the selected day. The anchor is never removed.
    pub fn remove_transition(&mut self, id: TransitionId) -> Vec<EditorEvent> {
        if !self.form_allowed() {
            return Vec::new();
        }
        let day = self.selected_schedule();
        let removed = match day.get(id) {
            None => return Vec::new(),
            Some(t) if t.time.is_midnight() => {
                debug!("Anchor transition cannot be removed");
                return Vec::new();
            }
            Some(_) => Normalizer::normalize(&day.without(id)),
        };
        self.commit(removed)
    }

    /// Duplicate `from` onto each of `targets` (identifiers are kept).
    pub fn copy_day(&mut self, from: DayKey, targets: &[DayKey]) -> Vec<EditorEvent> {
        if !self.form_allowed() {
            return Vec::new();
        }
        let source = Normalizer::normalize(self.week.day(from));
        targets
            .iter()
            .filter(|&&target| target != from)
            .flat_map(|&target| self.commit_day(target, source.clone()))
            .collect()
    }

    // --- Pointer input ---

    /// Feed one pointer/touch event from the host surface.
    pub fn handle_input(&mut self, event: InputEvent) -> Vec<EditorEvent> {
        let pointer = *event.pointer();
        let logical = self.surface.to_logical(pointer.position, &self.plane);

        let outputs = match event {
            InputEvent::PointerDown(_) => {
                if !self.drag.is_idle() {
                    debug!("Ignoring press from pointer {}", pointer.pointer_id);
                    return Vec::new();
                }
                let mapper = self.mapper();
                let day = self.week.day(self.selected);
                let Some(target) = hit_test(day, &mapper, logical, self.config.gesture.hit_radius)
                else {
                    return Vec::new();
                };
                self.drag
                    .press(pointer.pointer_id, pointer.position, target, day, mapper)
            }
            InputEvent::PointerMove(_) => {
                self.drag
                    .motion(pointer.pointer_id, pointer.position, logical)
            }
            InputEvent::PointerUp(_) => self.drag.release(pointer.pointer_id),
            InputEvent::PointerCancel(_) => self.drag.cancel(Some(pointer.pointer_id)),
            InputEvent::DoubleActivate(_) => {
                if !self.drag.is_idle() {
                    return Vec::new();
                }
                let mapper = self.mapper();
                return match hit_test(
                    self.selected_schedule(),
                    &mapper,
                    logical,
                    self.config.gesture.hit_radius,
                ) {
                    Some(id) => self.remove_transition(id),
                    None => Vec::new(),
                };
            }
        };

        self.translate(outputs)
    }

    /// Abort the active gesture (window blur, day switch, host teardown).
    pub fn cancel_gesture(&mut self) -> Vec<EditorEvent> {
        let outputs = self.drag.cancel(None);
        self.translate(outputs)
    }

    // --- Validation ---

    pub fn validate_selected(&self) -> ValidationReport {
        Validator::validate(self.selected_schedule())
    }

    pub fn validate_day(&self, day: DayKey) -> ValidationReport {
        Validator::validate(self.week.day(day))
    }

    fn form_allowed(&self) -> bool {
        if self.drag.is_idle() {
            true
        } else {
            debug!("Form action ignored during an active gesture");
            false
        }
    }

    fn commit(&mut self, schedule: DaySchedule) -> Vec<EditorEvent> {
        self.commit_day(self.selected, schedule)
    }

    fn commit_day(&mut self, day: DayKey, schedule: DaySchedule) -> Vec<EditorEvent> {
        info!("Committed {} ({} transitions)", day, schedule.len());
        self.week.set_day(day, schedule.clone());
        vec![EditorEvent::Committed { day, schedule }]
    }

    fn translate(&mut self, outputs: Vec<GestureOutput>) -> Vec<EditorEvent> {
        let day = self.selected;
        outputs
            .into_iter()
            .flat_map(|output| match output {
                GestureOutput::InstallListeners => vec![EditorEvent::SubscribeGlobal],
                GestureOutput::RemoveListeners => vec![EditorEvent::UnsubscribeGlobal],
                GestureOutput::Preview(schedule) => vec![EditorEvent::Preview { day, schedule }],
                GestureOutput::Commit(schedule) => self.commit_day(day, schedule),
            })
            .collect()
    }
}
