use crate::config::Config;
use crate::error::{config_error, ReportResult};
use chrono::{DateTime, Datelike, Duration, FixedOffset, Local, NaiveDate, TimeZone, Utc};

/// Length of the business range counted from Monday
const BUSINESS_DAYS: i64 = 5;

/// Half-open time range `[start, end)` that events are requested for
#[derive(Debug, Clone, PartialEq)]
pub struct TimeRange {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl TimeRange {
    /// RFC 3339 lower bound for the `timeMin` query parameter
    pub fn time_min(&self) -> String {
        self.start.with_timezone(&Utc).to_rfc3339()
    }

    /// RFC 3339 upper bound for the `timeMax` query parameter
    pub fn time_max(&self) -> String {
        self.end.with_timezone(&Utc).to_rfc3339()
    }
}

/// Midnight at the start of `date` in the given timezone
pub fn local_midnight<Z: TimeZone>(
    tz: &Z,
    date: NaiveDate,
) -> ReportResult<DateTime<FixedOffset>> {
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| config_error("Failed to create datetime"))?;

    match tz.from_local_datetime(&midnight) {
        chrono::LocalResult::Single(dt) => Ok(dt.fixed_offset()),
        chrono::LocalResult::Ambiguous(earliest, _) => Ok(earliest.fixed_offset()),
        chrono::LocalResult::None => Err(config_error(&format!(
            "Midnight of {} does not exist in the report timezone",
            date
        ))),
    }
}

/// Monday of the week containing `date`
pub fn week_monday(date: NaiveDate) -> NaiveDate {
    date.checked_sub_signed(Duration::days(
        date.weekday().num_days_from_monday() as i64,
    ))
    .unwrap_or(date)
}

/// Days `start..=end_inclusive` as a half-open range of local midnights
pub fn date_range<Z: TimeZone>(
    tz: &Z,
    start: NaiveDate,
    end_inclusive: NaiveDate,
) -> ReportResult<TimeRange> {
    let end = end_inclusive
        .checked_add_signed(Duration::days(1))
        .ok_or_else(|| config_error("Report end date out of range"))?;

    Ok(TimeRange {
        start: local_midnight(tz, start)?,
        end: local_midnight(tz, end)?,
    })
}

/// Monday 00:00 to Saturday 00:00 of the week containing `now`
pub fn business_week_range<Z: TimeZone>(now: &DateTime<Z>) -> ReportResult<TimeRange> {
    let monday = week_monday(now.date_naive());
    let friday = monday + Duration::days(BUSINESS_DAYS - 1);
    date_range(&now.timezone(), monday, friday)
}

/// Resolve the range a report covers from configuration, relative to `now`.
///
/// Without a configured timezone the range is computed in the system's local zone.
pub fn report_range(config: &Config, now: DateTime<Utc>) -> ReportResult<TimeRange> {
    match config.tz()? {
        Some(tz) => range_in(&tz, config, now),
        None => range_in(&Local, config, now),
    }
}

fn range_in<Z: TimeZone>(tz: &Z, config: &Config, now: DateTime<Utc>) -> ReportResult<TimeRange> {
    match (config.range_start, config.range_end) {
        (Some(start), Some(end)) => date_range(tz, start, end),
        (Some(start), None) => date_range(tz, start, start + Duration::days(BUSINESS_DAYS - 1)),
        (None, Some(end)) => date_range(tz, end - Duration::days(BUSINESS_DAYS - 1), end),
        (None, None) => business_week_range(&now.with_timezone(tz)),
    }
}
