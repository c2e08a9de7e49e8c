use crate::components::google_calendar::{Event, ScheduledEvent};
use crate::config::Config;
use crate::error::ReportResult;
use tracing::debug;

/// An accepted event together with the tag it is reported under
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedEvent {
    pub event: ScheduledEvent,
    /// `None` when the viewer left no comment
    pub tag: Option<String>,
}

/// Derives grouping tags, folding busy and focus-time blocks into one tag
pub struct TagNormalizer<'a> {
    busy_markers: &'a [String],
    focus_tag: &'a str,
}

impl<'a> TagNormalizer<'a> {
    pub fn new(busy_markers: &'a [String], focus_tag: &'a str) -> Self {
        Self {
            busy_markers,
            focus_tag,
        }
    }

    pub fn from_config(config: &'a Config) -> Self {
        Self::new(&config.busy_markers, &config.focus_tag)
    }

    /// Whether the title contains one of the busy markers
    pub fn is_busy(&self, title: &str) -> bool {
        self.busy_markers
            .iter()
            .any(|marker| title.contains(marker.as_str()))
    }

    /// The tag an event is grouped under
    pub fn tag_for(&self, event: &Event) -> ReportResult<Option<String>> {
        if self.is_busy(event.title()) {
            return Ok(Some(self.focus_tag.to_string()));
        }

        Ok(event.self_attendee()?.comment.clone())
    }

    pub fn normalize(&self, event: ScheduledEvent) -> ReportResult<TaggedEvent> {
        let tag = self.tag_for(&event.event)?;
        debug!("Tagged '{}' as {:?}", event.title(), tag);
        Ok(TaggedEvent { event, tag })
    }

    pub fn normalize_all(&self, events: Vec<ScheduledEvent>) -> ReportResult<Vec<TaggedEvent>> {
        events.into_iter().map(|event| self.normalize(event)).collect()
    }
}
