//! Marker hit testing

use crate::coords::{CoordinateMapper, Point};
use crate::types::{DaySchedule, TransitionId};

/// Transition whose marker is nearest to `logical`, within `radius`.
pub fn hit_test(
    day: &DaySchedule,
    mapper: &CoordinateMapper,
    logical: Point,
    radius: f64,
) -> Option<TransitionId> {
    day.transitions()
        .iter()
        .map(|t| (t.id, mapper.project(t).distance(logical)))
        .filter(|(_, d)| *d <= radius)
        .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(id, _)| id)
}
