//! Transport codec
//!
//! The device speaks one string per day: whitespace separated
//! `HH:MM/temperature` tokens, e.g. `"00:00/20 06:30/21.5 22:00/18"`.
//! Integral temperatures carry no decimal point; others carry exactly one
//! decimal place. Spacing, token order and number formatting are part of
//! the wire contract.

use log::warn;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

use crate::normalizer::Normalizer;
use crate::types::{
    clamp_temperature, quantize_temperature, DayKey, DaySchedule, TimeOfDay, Transition,
    WeeklySchedule, MAX_TRANSITIONS,
};

/// Weekly transport form: one transport string per day key
pub type WeeklyTransport = BTreeMap<DayKey, String>;

/// Parse a single `HH:MM/temperature` token.
///
/// The temperature is snapped to the 0.5 grid and clamped into the settable
/// range, so every decoded transition is representable on the wire.
pub fn parse_token(token: &str) -> Option<Transition> {
    let (time, temperature) = token.split_once('/')?;
    let time = TimeOfDay::parse(time)?;
    let raw = parse_temperature(temperature)?;
    let temperature = clamp_temperature(quantize_temperature(raw));
    if temperature != raw {
        warn!("Adjusted temperature {} to {} in token {:?}", raw, temperature, token);
    }
    Some(Transition::new(time, temperature))
}

/// Decimal digits with an optional single fractional part; no sign, no exponent.
pub(crate) fn parse_temperature(text: &str) -> Option<f64> {
    let (whole, fraction) = match text.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (text, None),
    };
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !digits(whole) || fraction.is_some_and(|f| !digits(f)) {
        return None;
    }
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Split decoded transitions into those a day can hold and those refused
/// by the six-transition cap.
///
/// Repeated times keep their first occurrence. One slot is always reserved
/// for the 00:00 anchor, present or inserted later; other times are admitted
/// in input order until the day is full.
pub(crate) fn admit(transitions: &[Transition]) -> (Vec<Transition>, Vec<Transition>) {
    let mut room = MAX_TRANSITIONS - 1;
    Normalizer::dedup(transitions).into_iter().partition(|t| {
        if t.time.is_midnight() {
            true
        } else if room > 0 {
            room -= 1;
            true
        } else {
            false
        }
    })
}

/// Decode a day's transport string.
///
/// Tokens that do not match `HH:MM/temperature` are skipped, as are
/// transitions beyond the six a day can hold. A string with no valid token
/// yields the canonical default day. The result is always normalized.
pub fn parse_day(text: &str) -> DaySchedule {
    let mut transitions = Vec::new();
    for token in text.split_whitespace() {
        match parse_token(token) {
            Some(transition) => transitions.push(transition),
            None => warn!("Dropping malformed schedule token {:?}", token),
        }
    }

    if transitions.is_empty() {
        return DaySchedule::default();
    }

    let (kept, refused) = admit(&transitions);
    for t in &refused {
        warn!(
            "Dropping transition at {}: a day holds at most {} transitions",
            t.time, MAX_TRANSITIONS
        );
    }

    Normalizer::normalize(&DaySchedule::from_transitions(kept))
}

/// Format a temperature the way the device expects it.
pub fn format_temperature(temperature: f64) -> String {
    if temperature.fract() == 0.0 {
        format!("{:.0}", temperature)
    } else {
        format!("{:.1}", temperature)
    }
}

/// Encode a day as its transport string (deduplicated and sorted).
pub fn serialize_day(schedule: &DaySchedule) -> String {
    let deduped = Normalizer::dedup(schedule.transitions());
    Normalizer::sort(&deduped)
        .iter()
        .map(|t| format!("{}/{}", t.time, format_temperature(t.temperature)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decode a weekly transport map; absent days get the canonical default.
pub fn parse_weekly(transport: &WeeklyTransport) -> WeeklySchedule {
    let mut week = WeeklySchedule::default();
    for day in DayKey::ALL {
        if let Some(text) = transport.get(&day) {
            week.set_day(day, parse_day(text));
        }
    }
    week
}

/// Encode all seven days.
pub fn serialize_weekly(week: &WeeklySchedule) -> WeeklyTransport {
    week.iter()
        .map(|(day, schedule)| (day, serialize_day(schedule)))
        .collect()
}

impl From<WeeklyTransport> for WeeklySchedule {
    fn from(value: WeeklyTransport) -> Self {
        parse_weekly(&value)
    }
}

impl From<WeeklySchedule> for WeeklyTransport {
    fn from(value: WeeklySchedule) -> Self {
        serialize_weekly(&value)
    }
}

impl Serialize for WeeklySchedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_weekly(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for WeeklySchedule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        WeeklyTransport::deserialize(deserializer).map(|t| parse_weekly(&t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_TEMPERATURE;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_resolves_duplicates_and_anchor() {
        let day = parse_day("06:00/20 06:00/22 08:00/18");
        assert_eq!(
            day.pairs(),
            vec![
                ("00:00".to_string(), DEFAULT_TEMPERATURE),
                ("06:00".to_string(), 20.0),
                ("08:00".to_string(), 18.0),
            ]
        );
    }

    #[test]
    fn test_parse_skips_malformed_tokens() {
        let day = parse_day("00:00/19 garbage 7:00/20 25:00/18 09:00/abc 10:30/21.5");
        assert_eq!(
            day.pairs(),
            vec![("00:00".to_string(), 19.0), ("10:30".to_string(), 21.5)]
        );
    }

    #[test]
    fn test_parse_empty_yields_default() {
        assert!(parse_day("").same_values(&DaySchedule::default()));
        assert!(parse_day("   nonsense  ").same_values(&DaySchedule::default()));
    }

    #[test]
    fn test_parse_temperature_rejects_signs_and_exponents() {
        assert_eq!(parse_temperature("21.5"), Some(21.5));
        assert_eq!(parse_temperature("-3"), None);
        assert_eq!(parse_temperature("2e1"), None);
        assert_eq!(parse_temperature("20."), None);
        assert_eq!(parse_temperature(".5"), None);
    }

    #[test]
    fn test_parse_snaps_and_clamps_temperatures() {
        let day = parse_day("00:00/20.25 06:00/21.123 07:00/20.75 08:00/99 09:00/2");
        assert_eq!(
            day.pairs(),
            vec![
                ("00:00".to_string(), 20.5),
                ("06:00".to_string(), 21.0),
                ("07:00".to_string(), 21.0),
                ("08:00".to_string(), 35.0),
                ("09:00".to_string(), 4.0),
            ]
        );

        let text = serialize_day(&day);
        assert_eq!(text, "00:00/20.5 06:00/21 07:00/21 08:00/35 09:00/4");
        assert!(parse_day(&text).same_values(&day));
    }

    #[test]
    fn test_parse_caps_transitions_per_day() {
        // no anchor in the input: one slot stays reserved for it
        let day = parse_day("01:00/20 02:00/20 03:00/20 04:00/20 05:00/20 06:00/20");
        assert_eq!(day.len(), 6);
        assert_eq!(
            serialize_day(&day),
            "00:00/20 01:00/20 02:00/20 03:00/20 04:00/20 05:00/20"
        );

        // a late anchor is still kept, duplicates do not use up room
        let day = parse_day(
            "01:00/19 01:00/25 02:00/19 03:00/19 04:00/19 05:00/19 06:00/19 00:00/17",
        );
        assert_eq!(
            serialize_day(&day),
            "00:00/17 01:00/19 02:00/19 03:00/19 04:00/19 05:00/19"
        );
    }

    #[test]
    fn test_format_temperature() {
        assert_eq!(format_temperature(20.0), "20");
        assert_eq!(format_temperature(20.5), "20.5");
        assert_eq!(format_temperature(4.0), "4");
        assert_eq!(format_temperature(1e20), "100000000000000000000");
    }

    #[test]
    fn test_serialize_sorted_single_spaced() {
        let day = DaySchedule::from_transitions(vec![
            Transition::new(TimeOfDay::new(22, 0).unwrap(), 18.0),
            Transition::new(TimeOfDay::MIDNIGHT, 20.5),
            Transition::new(TimeOfDay::new(6, 30).unwrap(), 21.0),
        ]);
        assert_eq!(serialize_day(&day), "00:00/20.5 06:30/21 22:00/18");
    }

    #[test]
    fn test_round_trip_normalized() {
        let text = "00:00/19.5 06:15/21 08:00/17 17:45/21.5 22:30/18";
        assert_eq!(serialize_day(&parse_day(text)), text);
    }

    #[test]
    fn test_weekly_fills_missing_days() {
        let mut transport = WeeklyTransport::new();
        transport.insert(DayKey::Monday, "00:00/18 07:00/21".to_string());

        let week = parse_weekly(&transport);
        assert_eq!(week.day(DayKey::Monday).len(), 2);
        assert!(week.day(DayKey::Sunday).same_values(&DaySchedule::default()));

        let encoded = serialize_weekly(&week);
        assert_eq!(encoded.len(), 7);
        assert_eq!(encoded[&DayKey::Tuesday], "00:00/20");
    }

    #[test]
    fn test_weekly_json() {
        let json = r#"{"monday": "00:00/18 07:00/21", "friday": "08:00/22"}"#;
        let week: WeeklySchedule = serde_json::from_str(json).unwrap();
        assert_eq!(
            week.day(DayKey::Friday).pairs(),
            vec![("00:00".to_string(), 20.0), ("08:00".to_string(), 22.0)]
        );

        let value = serde_json::to_value(&week).unwrap();
        assert_eq!(value["monday"], "00:00/18 07:00/21");
        assert_eq!(value["sunday"], "00:00/20");
    }
}
