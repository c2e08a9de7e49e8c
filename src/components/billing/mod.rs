pub mod aggregator;
pub mod filter;
pub mod reporter;
pub mod tags;

pub use aggregator::{aggregate, duration_hours, AggregationResult};
pub use filter::accepted_events;
pub use tags::{TagNormalizer, TaggedEvent};

use crate::components::google_calendar::{Event, EventSource};
use crate::config::Config;
use crate::error::ReportResult;
use crate::utils::time::TimeRange;
use std::io::Write;
use tracing::info;

/// What a report run produced
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    /// The calendar had no events in range; only the notice was printed
    NoEvents,
    Report(AggregationResult),
}

/// Filter, tag and aggregate a fetched event list.
///
/// Event times are parsed after filtering, so only counted events can fail.
pub fn build_report(config: &Config, events: Vec<Event>) -> ReportResult<AggregationResult> {
    let fetched = events.len();
    let accepted = accepted_events(events, config.accepted_status, config.skip_malformed_events)?;
    info!("{} of {} events accepted", accepted.len(), fetched);

    let tagged = TagNormalizer::from_config(config).normalize_all(accepted)?;
    Ok(aggregate(&tagged))
}

/// Fetch events for `range` and print the billable-hours report to `out`
pub async fn run_report<S, W>(
    config: &Config,
    source: &S,
    range: &TimeRange,
    out: &mut W,
) -> ReportResult<ReportOutcome>
where
    S: EventSource + ?Sized,
    W: Write,
{
    let events = match source.list_events(range).await? {
        Some(events) if !events.is_empty() => events,
        _ => {
            reporter::write_no_events(out)?;
            return Ok(ReportOutcome::NoEvents);
        }
    };

    // Count every fetched event, including ones filtered or skipped below
    reporter::write_range_header(out, events.len(), range)?;
    let result = build_report(config, events)?;
    reporter::write_report(out, &result, config.max_billable_hours)?;

    info!(
        "Accounted for {} of {} hours",
        result.total_hours, config.max_billable_hours
    );

    Ok(ReportOutcome::Report(result))
}
