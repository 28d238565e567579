//! Core types for the heating schedule model
//!
//! A [`WeeklySchedule`] owns seven [`DaySchedule`]s, each of which owns its
//! [`Transition`]s by value. Edits never mutate a day in place; every
//! operation hands back a new `DaySchedule`.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ScheduleError;

/// Lowest settable target temperature (°C)
pub const MIN_TEMPERATURE: f64 = 4.0;

/// Highest settable target temperature (°C)
pub const MAX_TEMPERATURE: f64 = 35.0;

/// Temperature quantization step (°C)
pub const TEMPERATURE_STEP: f64 = 0.5;

/// Temperature of an inserted anchor and of the canonical default day (°C)
pub const DEFAULT_TEMPERATURE: f64 = 20.0;

/// Maximum number of transitions a single day may hold
pub const MAX_TRANSITIONS: usize = 6;

/// Minutes in a day; valid times are `0..MINUTES_PER_DAY`
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Snap a temperature to the nearest 0.5 °C step.
pub fn quantize_temperature(temperature: f64) -> f64 {
    (temperature / TEMPERATURE_STEP).round() * TEMPERATURE_STEP
}

/// Clamp a temperature into the settable range.
pub fn clamp_temperature(temperature: f64) -> f64 {
    temperature.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE)
}

/// A time of day with minute resolution, always within 00:00..=23:59.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// 00:00, the anchor slot
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);

    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(TimeOfDay((hour * 60 + minute) as u16))
        } else {
            None
        }
    }

    pub fn from_minutes(minutes: u32) -> Option<Self> {
        if minutes < MINUTES_PER_DAY as u32 {
            Some(TimeOfDay(minutes as u16))
        } else {
            None
        }
    }

    /// Saturating variant of [`TimeOfDay::from_minutes`]; caps at 23:59.
    pub fn from_minutes_clamped(minutes: u32) -> Self {
        TimeOfDay(minutes.min(MINUTES_PER_DAY as u32 - 1) as u16)
    }

    /// Parse a strict 24-hour `HH:MM` string (two digits each side).
    pub fn parse(text: &str) -> Option<Self> {
        let bytes = text.as_bytes();
        let shape_ok = bytes.len() == 5
            && bytes[2] == b':'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 2 || b.is_ascii_digit());
        if !shape_ok {
            return None;
        }
        NaiveTime::parse_from_str(text, "%H:%M")
            .ok()
            .and_then(|t| TimeOfDay::new(t.hour(), t.minute()))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u32 {
        u32::from(self.0) / 60
    }

    pub fn minute(self) -> u32 {
        u32::from(self.0) % 60
    }

    /// Fractional hour of day in [0, 24)
    pub fn as_hours(self) -> f64 {
        f64::from(self.0) / 60.0
    }

    pub fn is_midnight(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeOfDay::parse(s).ok_or_else(|| ScheduleError::InvalidTime(s.to_string()))
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ScheduleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

/// Stable surface identifier of a transition.
///
/// Survives re-sorts and re-renders so a gesture can keep targeting the same
/// transition while its array position changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransitionId(Uuid);

impl TransitionId {
    pub fn new() -> Self {
        TransitionId(Uuid::new_v4())
    }
}

impl Default for TransitionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for TransitionId {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(TransitionId)
            .map_err(|_| ScheduleError::UnknownTransition(s.to_string()))
    }
}

/// A point in the day at which the target temperature changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Generated when absent from the input
    #[serde(default)]
    pub id: TransitionId,
    pub time: TimeOfDay,
    /// Target temperature (°C)
    pub temperature: f64,
}

impl Transition {
    pub fn new(time: TimeOfDay, temperature: f64) -> Self {
        Self {
            id: TransitionId::new(),
            time,
            temperature,
        }
    }

    pub fn anchor(temperature: f64) -> Self {
        Self::new(TimeOfDay::MIDNIGHT, temperature)
    }

    /// Two transitions occupy the same slot iff they share a time of day.
    pub fn same_slot(&self, other: &Transition) -> bool {
        self.time == other.time
    }
}

/// One day's list of transitions.
///
/// Canonical order is chronological, but a `DaySchedule` built from raw
/// input or mid-gesture may be unsorted; run it through
/// [`crate::normalizer::Normalizer::normalize`] before treating it as
/// authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DaySchedule {
    transitions: Vec<Transition>,
}

impl Default for DaySchedule {
    /// The canonical default day: a single 00:00 transition at 20 °C.
    fn default() -> Self {
        Self {
            transitions: vec![Transition::anchor(DEFAULT_TEMPERATURE)],
        }
    }
}

impl DaySchedule {
    /// Wrap transitions as given, without normalizing.
    pub fn from_transitions(transitions: Vec<Transition>) -> Self {
        Self { transitions }
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn into_transitions(self) -> Vec<Transition> {
        self.transitions
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.transitions.len() >= MAX_TRANSITIONS
    }

    pub fn get(&self, id: TransitionId) -> Option<&Transition> {
        self.transitions.iter().find(|t| t.id == id)
    }

    pub fn at(&self, time: TimeOfDay) -> Option<&Transition> {
        self.transitions.iter().find(|t| t.time == time)
    }

    pub fn anchor(&self) -> Option<&Transition> {
        self.at(TimeOfDay::MIDNIGHT)
    }

    /// Lowest and highest temperature present, if any
    pub fn temperature_bounds(&self) -> Option<(f64, f64)> {
        self.transitions.iter().fold(None, |acc, t| match acc {
            None => Some((t.temperature, t.temperature)),
            Some((lo, hi)) => Some((lo.min(t.temperature), hi.max(t.temperature))),
        })
    }

    /// `(HH:MM, temperature)` pairs in stored order
    pub fn pairs(&self) -> Vec<(String, f64)> {
        self.transitions
            .iter()
            .map(|t| (t.time.to_string(), t.temperature))
            .collect()
    }

    /// Append a transition; refused (`None`) when the day is already full.
    pub fn with_added(&self, transition: Transition) -> Option<DaySchedule> {
        if self.is_full() {
            return None;
        }
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Some(DaySchedule { transitions })
    }

    /// Replace time and temperature of the transition with `id`, keeping its
    /// position in the list.
    pub fn with_updated(
        &self,
        id: TransitionId,
        time: TimeOfDay,
        temperature: f64,
    ) -> Option<DaySchedule> {
        let index = self.transitions.iter().position(|t| t.id == id)?;
        let mut transitions = self.transitions.clone();
        transitions[index].time = time;
        transitions[index].temperature = temperature;
        Some(DaySchedule { transitions })
    }

    pub fn without(&self, id: TransitionId) -> DaySchedule {
        DaySchedule {
            transitions: self
                .transitions
                .iter()
                .filter(|t| t.id != id)
                .cloned()
                .collect(),
        }
    }

    /// Same `(time, temperature)` sequence, ignoring identifiers
    pub fn same_values(&self, other: &DaySchedule) -> bool {
        self.transitions.len() == other.transitions.len()
            && self
                .transitions
                .iter()
                .zip(&other.transitions)
                .all(|(a, b)| a.time == b.time && a.temperature == b.temperature)
    }
}

/// The seven fixed day keys of a weekly schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayKey {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayKey {
    pub const ALL: [DayKey; 7] = [
        DayKey::Monday,
        DayKey::Tuesday,
        DayKey::Wednesday,
        DayKey::Thursday,
        DayKey::Friday,
        DayKey::Saturday,
        DayKey::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayKey::Monday => "monday",
            DayKey::Tuesday => "tuesday",
            DayKey::Wednesday => "wednesday",
            DayKey::Thursday => "thursday",
            DayKey::Friday => "friday",
            DayKey::Saturday => "saturday",
            DayKey::Sunday => "sunday",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayKey {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        DayKey::ALL
            .into_iter()
            .find(|d| d.as_str() == lower || d.as_str()[..3] == lower)
            .ok_or_else(|| ScheduleError::UnknownDay(s.to_string()))
    }
}

impl From<chrono::Weekday> for DayKey {
    fn from(value: chrono::Weekday) -> Self {
        DayKey::ALL[value.num_days_from_monday() as usize]
    }
}

/// A full week; every day key is always present.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WeeklySchedule {
    days: [DaySchedule; 7],
}

impl WeeklySchedule {
    pub fn day(&self, key: DayKey) -> &DaySchedule {
        &self.days[key.index()]
    }

    /// Replace one day with a newer value.
    pub fn set_day(&mut self, key: DayKey, schedule: DaySchedule) {
        self.days[key.index()] = schedule;
    }

    pub fn iter(&self) -> impl Iterator<Item = (DayKey, &DaySchedule)> {
        DayKey::ALL.into_iter().zip(self.days.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_time_parse_strict() {
        assert_eq!(TimeOfDay::parse("06:30"), TimeOfDay::new(6, 30));
        assert_eq!(TimeOfDay::parse("23:59"), TimeOfDay::new(23, 59));
        assert_eq!(TimeOfDay::parse("6:30"), None);
        assert_eq!(TimeOfDay::parse("24:00"), None);
        assert_eq!(TimeOfDay::parse("12:60"), None);
        assert_eq!(TimeOfDay::parse("1a:00"), None);
    }

    #[test]
    fn test_time_display_and_hours() {
        let t = TimeOfDay::new(7, 5).unwrap();
        assert_eq!(t.to_string(), "07:05");
        assert!((t.as_hours() - (7.0 + 5.0 / 60.0)).abs() < 1e-9);
        assert!(TimeOfDay::MIDNIGHT.is_midnight());
    }

    #[test]
    fn test_quantize_temperature() {
        assert_eq!(quantize_temperature(20.2), 20.0);
        assert_eq!(quantize_temperature(20.3), 20.5);
        assert_eq!(quantize_temperature(20.75), 21.0);
        assert_eq!(clamp_temperature(50.0), MAX_TEMPERATURE);
        assert_eq!(clamp_temperature(-3.0), MIN_TEMPERATURE);
    }

    #[test]
    fn test_default_day_is_single_anchor() {
        let day = DaySchedule::default();
        assert_eq!(day.pairs(), vec![("00:00".to_string(), DEFAULT_TEMPERATURE)]);
    }

    #[test]
    fn test_add_refused_when_full() {
        let transitions = (0..MAX_TRANSITIONS as u32)
            .map(|h| Transition::new(TimeOfDay::new(h, 0).unwrap(), 20.0))
            .collect();
        let day = DaySchedule::from_transitions(transitions);
        assert!(day.is_full());
        assert!(day
            .with_added(Transition::new(TimeOfDay::new(12, 0).unwrap(), 18.0))
            .is_none());
    }

    #[test]
    fn test_updated_keeps_position_and_id() {
        let first = Transition::anchor(20.0);
        let second = Transition::new(TimeOfDay::new(8, 0).unwrap(), 18.0);
        let id = second.id;
        let day = DaySchedule::from_transitions(vec![first, second]);

        let moved = day
            .with_updated(id, TimeOfDay::new(9, 15).unwrap(), 21.5)
            .unwrap();
        assert_eq!(moved.transitions()[1].id, id);
        assert_eq!(moved.pairs()[1], ("09:15".to_string(), 21.5));
        // original untouched
        assert_eq!(day.pairs()[1], ("08:00".to_string(), 18.0));
    }

    #[test]
    fn test_transition_id_generated_when_missing() {
        let json = r#"{"time": "06:00", "temperature": 21.5}"#;
        let t: Transition = serde_json::from_str(json).unwrap();
        assert_eq!(t.time, TimeOfDay::new(6, 0).unwrap());

        let other: Transition = serde_json::from_str(json).unwrap();
        assert_ne!(t.id, other.id);
    }

    #[test]
    fn test_day_key_parse() {
        assert_eq!("Monday".parse::<DayKey>().unwrap(), DayKey::Monday);
        assert_eq!("sun".parse::<DayKey>().unwrap(), DayKey::Sunday);
        assert!("funday".parse::<DayKey>().is_err());
        assert_eq!(DayKey::from(chrono::Weekday::Wed), DayKey::Wednesday);
    }

    #[test]
    fn test_weekly_always_has_seven_days() {
        let mut week = WeeklySchedule::default();
        assert_eq!(week.iter().count(), 7);

        let day = DaySchedule::from_transitions(vec![Transition::anchor(17.0)]);
        week.set_day(DayKey::Friday, day.clone());
        assert_eq!(week.day(DayKey::Friday), &day);
        assert!(week
            .day(DayKey::Thursday)
            .same_values(&DaySchedule::default()));
    }
}
