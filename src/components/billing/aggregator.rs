use super::tags::TaggedEvent;
use crate::components::google_calendar::ScheduledEvent;
use chrono::Weekday;
use indexmap::IndexMap;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Hours per tag within one weekday, in first-occurrence order
pub type TagHours = IndexMap<Option<String>, f64>;

/// Event length in hours, unrounded
pub fn duration_hours(event: &ScheduledEvent) -> f64 {
    let millis = (event.end.instant() - event.start.instant()).num_milliseconds();
    millis as f64 / MILLIS_PER_HOUR
}

/// Accepted hours grouped by weekday and tag
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationResult {
    /// Weekday buckets in the order their first event appeared
    pub days: IndexMap<Weekday, TagHours>,
    /// Sum of all event durations
    pub total_hours: f64,
}

impl AggregationResult {
    /// Hours left under the cap; negative once the cap is exceeded
    pub fn remaining_hours(&self, cap: f64) -> f64 {
        cap - self.total_hours
    }

    /// Sum over every (day, tag) group
    pub fn grouped_hours(&self) -> f64 {
        self.days.values().flat_map(|tags| tags.values()).sum()
    }

    pub fn hours_for(&self, day: Weekday, tag: Option<&str>) -> Option<f64> {
        self.days
            .get(&day)?
            .iter()
            .find(|(key, _)| key.as_deref() == tag)
            .map(|(_, hours)| *hours)
    }
}

/// Group tagged events by the weekday of their start, then by tag
pub fn aggregate(events: &[TaggedEvent]) -> AggregationResult {
    let total_hours: f64 = events.iter().map(|tagged| duration_hours(&tagged.event)).sum();

    let mut days: IndexMap<Weekday, TagHours> = IndexMap::new();
    for tagged in events {
        let day = tagged.event.start.weekday();
        *days
            .entry(day)
            .or_default()
            .entry(tagged.tag.clone())
            .or_insert(0.0) += duration_hours(&tagged.event);
    }

    AggregationResult { days, total_hours }
}
