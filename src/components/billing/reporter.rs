use super::aggregator::AggregationResult;
use crate::utils::time::TimeRange;
use chrono::Weekday;
use std::io::{self, Write};

/// Printed instead of a report when the calendar returned nothing
pub const NO_EVENTS_MESSAGE: &str = "No upcoming events found.";

/// Label for events without a comment
pub const UNTAGGED_LABEL: &str = "undefined";

/// English name of a weekday, used as the day header
pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Hours as the shortest decimal that round-trips (`2`, `1.5`)
pub fn format_hours(hours: f64) -> String {
    format!("{}", hours)
}

pub fn write_no_events<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", NO_EVENTS_MESSAGE)
}

/// Line announcing how many events were fetched for which range
pub fn write_range_header<W: Write>(
    out: &mut W,
    count: usize,
    range: &TimeRange,
) -> io::Result<()> {
    writeln!(
        out,
        "Upcoming {} events from {} to {}:",
        count,
        range.start.format("%Y-%m-%d %H:%M %:z"),
        range.end.format("%Y-%m-%d %H:%M %:z")
    )
}

/// Day headers with their tag lines, then the two summary lines
pub fn write_report<W: Write>(out: &mut W, result: &AggregationResult, cap: f64) -> io::Result<()> {
    for (day, tags) in &result.days {
        writeln!(out, "{}", day_name(*day))?;
        for (tag, hours) in tags {
            writeln!(
                out,
                "{} => {}",
                tag.as_deref().unwrap_or(UNTAGGED_LABEL),
                format_hours(*hours)
            )?;
        }
    }

    writeln!(
        out,
        "Total hours accounted for: {}",
        format_hours(result.total_hours)
    )?;
    writeln!(
        out,
        "Total unaccounted hours: {}",
        format_hours(result.remaining_hours(cap))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn render(result: &AggregationResult, cap: f64) -> String {
        let mut out = Vec::new();
        write_report(&mut out, result, cap).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_format_hours_unrounded() {
        assert_eq!(format_hours(2.0), "2");
        assert_eq!(format_hours(1.5), "1.5");
        assert_eq!(format_hours(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_hours(-4.25), "-4.25");
    }

    #[test]
    fn test_report_layout() {
        let mut friday = IndexMap::new();
        friday.insert(Some("ProjectA".to_string()), 2.0);
        friday.insert(None, 0.5);
        let mut monday = IndexMap::new();
        monday.insert(Some("FOCUS_TIME".to_string()), 1.5);

        let mut days = IndexMap::new();
        days.insert(Weekday::Fri, friday);
        days.insert(Weekday::Mon, monday);

        let result = AggregationResult {
            days,
            total_hours: 4.0,
        };

        assert_eq!(
            render(&result, 40.0),
            "Friday\n\
             ProjectA => 2\n\
             undefined => 0.5\n\
             Monday\n\
             FOCUS_TIME => 1.5\n\
             Total hours accounted for: 4\n\
             Total unaccounted hours: 36\n"
        );
    }

    #[test]
    fn test_over_cap_prints_negative() {
        let result = AggregationResult {
            days: IndexMap::new(),
            total_hours: 45.5,
        };
        assert!(render(&result, 40.0).ends_with("Total unaccounted hours: -5.5\n"));
    }
}
