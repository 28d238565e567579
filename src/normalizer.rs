//! Schedule normalization
//!
//! Pure auto-fix passes that turn any list of transitions into a canonical
//! day:
//! - `dedup` keeps the first occurrence of each time, in input order
//! - `ensure_anchor` inserts a 00:00 transition at 20 °C when missing
//! - `sort` orders transitions chronologically (stable)
//!
//! The six-transition cap is not enforced here. Adding past the cap is
//! refused at the call site instead, so normalization never discards a
//! transition the user authored at a distinct time.

use std::collections::HashSet;

use crate::types::{DaySchedule, Transition, DEFAULT_TEMPERATURE};

/// Normalizer for schedule transitions
pub struct Normalizer;

impl Normalizer {
    /// Full normalization: dedup on input order, then sort, then anchor.
    pub fn normalize(schedule: &DaySchedule) -> DaySchedule {
        let deduped = Self::dedup(schedule.transitions());
        let sorted = Self::sort(&deduped);
        Self::ensure_anchor(&DaySchedule::from_transitions(sorted))
    }

    /// Drop every transition whose time already appeared earlier in the list.
    pub fn dedup(transitions: &[Transition]) -> Vec<Transition> {
        let mut seen = HashSet::new();
        transitions
            .iter()
            .filter(|t| seen.insert(t.time))
            .cloned()
            .collect()
    }

    /// Insert a 00:00 transition at the default temperature if none exists.
    ///
    /// The inserted temperature is fixed, never inferred from neighbours.
    /// The result is re-sorted.
    pub fn ensure_anchor(schedule: &DaySchedule) -> DaySchedule {
        if schedule.anchor().is_some() {
            return DaySchedule::from_transitions(Self::sort(schedule.transitions()));
        }

        let mut transitions = Vec::with_capacity(schedule.len() + 1);
        transitions.push(Transition::anchor(DEFAULT_TEMPERATURE));
        transitions.extend_from_slice(schedule.transitions());
        DaySchedule::from_transitions(Self::sort(&transitions))
    }

    /// Stable chronological sort by time of day.
    pub fn sort(transitions: &[Transition]) -> Vec<Transition> {
        let mut sorted = transitions.to_vec();
        sorted.sort_by_key(|t| t.time);
        sorted
    }

    /// True when `schedule` is already in canonical form.
    pub fn is_normalized(schedule: &DaySchedule) -> bool {
        let transitions = schedule.transitions();
        transitions.first().is_some_and(|t| t.time.is_midnight())
            && transitions.windows(2).all(|w| w[0].time < w[1].time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TimeOfDay;
    use pretty_assertions::assert_eq;

    fn t(time: &str, temperature: f64) -> Transition {
        Transition::new(TimeOfDay::parse(time).unwrap(), temperature)
    }

    fn times(transitions: &[Transition]) -> Vec<String> {
        transitions.iter().map(|t| t.time.to_string()).collect()
    }

    #[test]
    fn test_dedup_first_occurrence_wins() {
        let out = Normalizer::dedup(&[t("06:00", 20.0), t("06:00", 24.0)]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].temperature, 20.0);
    }

    #[test]
    fn test_dedup_uses_input_order_not_sorted_order() {
        let out = Normalizer::dedup(&[t("08:00", 17.0), t("06:00", 21.0), t("08:00", 23.0)]);
        assert_eq!(times(&out), vec!["08:00", "06:00"]);
        assert_eq!(out[0].temperature, 17.0);
    }

    #[test]
    fn test_ensure_anchor_inserts_default() {
        let day = DaySchedule::from_transitions(vec![t("06:00", 22.0), t("08:00", 18.0)]);
        let anchored = Normalizer::ensure_anchor(&day);

        assert_eq!(anchored.len(), 3);
        assert_eq!(
            anchored.pairs()[0],
            ("00:00".to_string(), DEFAULT_TEMPERATURE)
        );
    }

    #[test]
    fn test_ensure_anchor_keeps_existing() {
        let day = DaySchedule::from_transitions(vec![t("07:00", 19.0), t("00:00", 16.5)]);
        let anchored = Normalizer::ensure_anchor(&day);

        assert_eq!(
            anchored.pairs(),
            vec![("00:00".to_string(), 16.5), ("07:00".to_string(), 19.0)]
        );
    }

    #[test]
    fn test_sort_chronological() {
        let out = Normalizer::sort(&[t("22:00", 18.0), t("06:00", 22.0), t("00:00", 20.0)]);
        assert_eq!(times(&out), vec!["00:00", "06:00", "22:00"]);
    }

    #[test]
    fn test_normalize_preserves_ids() {
        let moved = t("09:00", 21.0);
        let id = moved.id;
        let day = DaySchedule::from_transitions(vec![t("00:00", 20.0), t("12:00", 18.0), moved]);

        let normalized = Normalizer::normalize(&day);
        assert_eq!(normalized.transitions()[1].id, id);
        assert!(Normalizer::is_normalized(&normalized));
        assert!(!Normalizer::is_normalized(&day));
    }

    #[test]
    fn test_normalize_empty_day_yields_anchor() {
        let normalized = Normalizer::normalize(&DaySchedule::from_transitions(Vec::new()));
        assert_eq!(
            normalized.pairs(),
            vec![("00:00".to_string(), DEFAULT_TEMPERATURE)]
        );
    }
}
