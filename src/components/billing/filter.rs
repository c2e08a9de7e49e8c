use crate::components::google_calendar::{Event, ResponseStatus, ScheduledEvent};
use crate::error::{Error, ReportResult};
use tracing::{debug, warn};

/// Keep events whose self attendee answered with `accepted`, preserving order.
///
/// Start and end are parsed only for kept events, so a dropped event never
/// fails the run. A missing self attendee or a bad time on a counted event is
/// an error unless `skip_malformed` is set, in which case it is logged and the
/// event is dropped.
pub fn accepted_events(
    events: Vec<Event>,
    accepted: ResponseStatus,
    skip_malformed: bool,
) -> ReportResult<Vec<ScheduledEvent>> {
    let mut kept = Vec::with_capacity(events.len());

    for event in events {
        let status = match event.self_attendee() {
            Ok(me) => me.response_status,
            Err(e) => {
                skip_or_fail(e, skip_malformed)?;
                continue;
            }
        };

        if status != accepted {
            debug!("Dropping '{}' ({})", event.title(), status);
            continue;
        }

        match ScheduledEvent::try_from(event) {
            Ok(scheduled) => kept.push(scheduled),
            Err(e) => skip_or_fail(e, skip_malformed)?,
        }
    }

    Ok(kept)
}

fn skip_or_fail(error: Error, skip_malformed: bool) -> ReportResult<()> {
    if skip_malformed && error.is_malformed_event() {
        warn!("Skipping malformed event: {}", error);
        Ok(())
    } else {
        Err(error)
    }
}
