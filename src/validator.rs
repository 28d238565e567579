//! Schedule validation
//!
//! Reports invariant violations as data and never changes the schedule.
//! The editing flow normalizes before validating, so violations found on a
//! committed day are residual and advisory rather than a commit gate.

use serde::Serialize;
use thiserror::Error;

use crate::codec::{admit, parse_day, parse_temperature, parse_token};
use crate::types::{
    quantize_temperature, DaySchedule, TimeOfDay, Transition, MAX_TEMPERATURE,
    MAX_TRANSITIONS, MIN_TEMPERATURE,
};

/// A single broken invariant
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    #[error("Schedule has no transitions")]
    Empty,

    #[error("First transition is at {first}, expected 00:00")]
    MissingAnchor { first: TimeOfDay },

    #[error("Schedule has {count} transitions, at most {max} allowed")]
    TooManyTransitions { count: usize, max: usize },

    #[error("Transition at {time} repeats an earlier time")]
    DuplicateTime { index: usize, time: TimeOfDay },

    #[error("Transition at {time} comes before the preceding {previous}")]
    OutOfOrder {
        index: usize,
        previous: TimeOfDay,
        time: TimeOfDay,
    },

    #[error("Temperature {temperature} at {time} is outside {min}..={max}")]
    TemperatureOutOfRange {
        time: TimeOfDay,
        temperature: f64,
        min: f64,
        max: f64,
    },

    #[error("Temperature {temperature} at {time} is not a multiple of 0.5")]
    TemperatureNotQuantized { time: TimeOfDay, temperature: f64 },

    #[error("Token {token:?} is not HH:MM/temperature")]
    MalformedToken { token: String },

    #[error("Token {token:?} has an invalid 24-hour time")]
    MalformedTime { token: String },

    #[error("Token {token:?} has an invalid temperature")]
    MalformedTemperature { token: String },

    #[error("Token {token:?} does not fit; a day holds at most {max} transitions")]
    TransitionBeyondLimit { token: String, max: usize },
}

/// Result of a validation pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    fn from_violations(violations: Vec<Violation>) -> Self {
        Self {
            valid: violations.is_empty(),
            violations,
        }
    }

    /// Human readable lines, one per violation
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(|v| v.to_string()).collect()
    }
}

/// Validator for day schedules and their transport strings
pub struct Validator;

impl Validator {
    /// Check every day invariant, independent of any normalization.
    pub fn validate(schedule: &DaySchedule) -> ValidationReport {
        let transitions = schedule.transitions();
        let mut violations = Vec::new();

        let Some(first) = transitions.first() else {
            return ValidationReport::from_violations(vec![Violation::Empty]);
        };

        if !first.time.is_midnight() {
            violations.push(Violation::MissingAnchor { first: first.time });
        }

        if transitions.len() > MAX_TRANSITIONS {
            violations.push(Violation::TooManyTransitions {
                count: transitions.len(),
                max: MAX_TRANSITIONS,
            });
        }

        for (index, pair) in transitions.windows(2).enumerate() {
            let (previous, current) = (&pair[0], &pair[1]);
            if current.time == previous.time {
                violations.push(Violation::DuplicateTime {
                    index: index + 1,
                    time: current.time,
                });
            } else if current.time < previous.time {
                violations.push(Violation::OutOfOrder {
                    index: index + 1,
                    previous: previous.time,
                    time: current.time,
                });
            }
        }

        for t in transitions {
            violations.extend(temperature_violations(t.time, t.temperature));
        }

        ValidationReport::from_violations(violations)
    }

    /// Report the tokens of a transport string that the lenient parser
    /// would drop or adjust: malformed tokens, temperatures it snaps or
    /// clamps, and transitions past the per-day cap.
    pub fn validate_transport(text: &str) -> ValidationReport {
        let mut violations = Vec::new();
        let mut decoded: Vec<(&str, Transition)> = Vec::new();

        for token in text.split_whitespace() {
            let Some((time, temperature)) = token.split_once('/') else {
                violations.push(Violation::MalformedToken {
                    token: token.to_string(),
                });
                continue;
            };
            let Some(time) = TimeOfDay::parse(time) else {
                violations.push(Violation::MalformedTime {
                    token: token.to_string(),
                });
                continue;
            };
            let Some(raw) = parse_temperature(temperature) else {
                violations.push(Violation::MalformedTemperature {
                    token: token.to_string(),
                });
                continue;
            };

            violations.extend(temperature_violations(time, raw));
            if let Some(transition) = parse_token(token) {
                decoded.push((token, transition));
            }
        }

        let transitions: Vec<Transition> = decoded.iter().map(|(_, t)| t.clone()).collect();
        let (_, refused) = admit(&transitions);
        for r in refused {
            if let Some((token, _)) = decoded.iter().find(|(_, t)| t.id == r.id) {
                violations.push(Violation::TransitionBeyondLimit {
                    token: token.to_string(),
                    max: MAX_TRANSITIONS,
                });
            }
        }

        ValidationReport::from_violations(violations)
    }

    /// Transport problems followed by the rule breaks of the day the parser
    /// recovers from `text`.
    pub fn validate_text(text: &str) -> ValidationReport {
        let mut violations = Self::validate_transport(text).violations;
        violations.extend(Self::validate(&parse_day(text)).violations);
        ValidationReport::from_violations(violations)
    }
}

fn temperature_violations(time: TimeOfDay, temperature: f64) -> Vec<Violation> {
    let mut violations = Vec::new();
    if !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&temperature) {
        violations.push(Violation::TemperatureOutOfRange {
            time,
            temperature,
            min: MIN_TEMPERATURE,
            max: MAX_TEMPERATURE,
        });
    }
    if quantize_temperature(temperature) != temperature {
        violations.push(Violation::TemperatureNotQuantized { time, temperature });
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn t(time: &str, temperature: f64) -> Transition {
        Transition::new(TimeOfDay::parse(time).unwrap(), temperature)
    }

    #[test]
    fn test_normalized_day_is_valid() {
        let report = Validator::validate(&parse_day("00:00/20 06:00/21.5 22:00/18"));
        assert!(report.valid);
        assert!(report.violations.is_empty());
    }

    #[test]
    fn test_empty_day() {
        let report = Validator::validate(&DaySchedule::from_transitions(Vec::new()));
        assert_eq!(report.violations, vec![Violation::Empty]);
        assert!(!report.valid);
    }

    #[test]
    fn test_unnormalized_day_reports_everything() {
        let day = DaySchedule::from_transitions(vec![
            t("06:00", 20.0),
            t("06:00", 22.0),
            t("05:00", 36.0),
            t("07:00", 20.25),
        ]);
        let report = Validator::validate(&day);

        let six = TimeOfDay::new(6, 0).unwrap();
        let five = TimeOfDay::new(5, 0).unwrap();
        let seven = TimeOfDay::new(7, 0).unwrap();
        assert_eq!(
            report.violations,
            vec![
                Violation::MissingAnchor { first: six },
                Violation::DuplicateTime { index: 1, time: six },
                Violation::OutOfOrder {
                    index: 2,
                    previous: six,
                    time: five
                },
                Violation::TemperatureOutOfRange {
                    time: five,
                    temperature: 36.0,
                    min: MIN_TEMPERATURE,
                    max: MAX_TEMPERATURE
                },
                Violation::TemperatureNotQuantized {
                    time: seven,
                    temperature: 20.25
                },
            ]
        );
    }

    #[test]
    fn test_too_many_transitions() {
        let day = DaySchedule::from_transitions(
            ["00:00", "01:00", "02:00", "03:00", "04:00", "05:00", "06:00"]
                .into_iter()
                .map(|time| t(time, 20.0))
                .collect(),
        );
        let report = Validator::validate(&day);
        assert_eq!(
            report.violations,
            vec![Violation::TooManyTransitions { count: 7, max: 6 }]
        );
    }

    #[test]
    fn test_transport_reports_dropped_tokens() {
        let report = Validator::validate_transport("00:00/20 junk 6:00/20 07:00/hot 08:00/19.5");
        assert_eq!(
            report.messages(),
            vec![
                "Token \"junk\" is not HH:MM/temperature".to_string(),
                "Token \"6:00/20\" has an invalid 24-hour time".to_string(),
                "Token \"07:00/hot\" has an invalid temperature".to_string(),
            ]
        );
    }

    #[test]
    fn test_transport_reports_adjusted_and_capped_tokens() {
        let report = Validator::validate_transport(
            "00:00/20.25 01:00/99 02:00/20 03:00/20 04:00/20 05:00/20 06:00/20",
        );
        let midnight = TimeOfDay::MIDNIGHT;
        let one = TimeOfDay::new(1, 0).unwrap();
        assert_eq!(
            report.violations,
            vec![
                Violation::TemperatureNotQuantized {
                    time: midnight,
                    temperature: 20.25
                },
                Violation::TemperatureOutOfRange {
                    time: one,
                    temperature: 99.0,
                    min: MIN_TEMPERATURE,
                    max: MAX_TEMPERATURE
                },
                Violation::TransitionBeyondLimit {
                    token: "06:00/20".to_string(),
                    max: MAX_TRANSITIONS
                },
            ]
        );

        // the recovered day itself is clean
        assert!(Validator::validate(&parse_day("00:00/20.25 01:00/99")).valid);
    }

    #[test]
    fn test_report_serializes_with_kind_tag() {
        let report = Validator::validate(&DaySchedule::from_transitions(Vec::new()));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(json["violations"][0]["kind"], "empty");
    }
}
