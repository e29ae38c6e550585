//! Wall-clock and instant handling for activity planning.
//!
//! Activity bounds are configured as "HH:MM" (or "HH:MM:SS") readings in the
//! activity's timezone, while connections carry absolute UTC instants. This
//! module converts between the two. Every zone-aware conversion goes through
//! [`zoned_local`], so daylight-saving transitions are resolved the same way
//! everywhere.
//!
//! The typed functions return `Result`; the string-facing functions at the
//! bottom of the module are total and map failures to fixed sentinels.

use std::cmp::Ordering;
use std::fmt;
use std::ops::RangeInclusive;

use chrono::{
    DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Offset, SecondsFormat, TimeZone,
    Timelike, Utc,
};
use chrono_tz::Tz;

/// Returned by [`local_time_to_utc_time_of_day`] when the input is invalid.
pub const UTC_TIME_OF_DAY_FALLBACK: &str = "00:00:00";

/// Returned by [`local_time_to_utc_instant`] when the input is invalid.
pub const UTC_INSTANT_FALLBACK: &str = "0000-00-00T00:00:00Z";

/// Placeholder for a local time of day that could not be computed.
pub const TIME_OF_DAY_UNAVAILABLE: &str = "--:--";

/// Error returned by the typed time operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeError {
    /// The string is not an `H:MM` or `H:MM:SS` reading.
    #[error("invalid time of day: {0}")]
    InvalidTimeOfDay(&'static str),

    /// The year/month/day triple does not name a calendar day.
    #[error("invalid civil date {year:04}-{month:02}-{day:02}")]
    InvalidCivilDate { year: i32, month: u32, day: u32 },

    /// The string is not an ISO-8601 instant, or arithmetic left the
    /// representable range.
    #[error("invalid instant: {0}")]
    InvalidInstant(String),

    /// The local reading could not be placed on the timeline.
    #[error("local time cannot be resolved in this timezone")]
    Unresolvable,
}

/// A year/month/day triple that has not yet been checked against the
/// calendar.
///
/// Conversions take the date separately from the time of day so that the
/// same configured time can be re-anchored onto different activity days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CivilDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl CivilDate {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    /// Resolves the triple to a calendar day.
    ///
    /// # Examples
    ///
    /// ```
    /// use journey_engine::domain::CivilDate;
    ///
    /// assert!(CivilDate::new(2024, 2, 29).resolve().is_ok());
    /// assert!(CivilDate::new(2023, 2, 29).resolve().is_err());
    /// ```
    pub fn resolve(self) -> Result<NaiveDate, TimeError> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day).ok_or(
            TimeError::InvalidCivilDate {
                year: self.year,
                month: self.month,
                day: self.day,
            },
        )
    }
}

impl From<NaiveDate> for CivilDate {
    fn from(date: NaiveDate) -> Self {
        use chrono::Datelike;
        Self::new(date.year(), date.month(), date.day())
    }
}

/// A civil clock reading without a date or timezone.
///
/// Displays as "HH:MM". Seconds are kept when parsed from "H:MM:SS" so that
/// conversions stay exact; use [`LocalTimeOfDay::truncated`] to drop them.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalTimeOfDay(NaiveTime);

impl LocalTimeOfDay {
    /// Wraps a `NaiveTime`.
    pub fn new(time: NaiveTime) -> Self {
        Self(time)
    }

    /// Parse an `H:MM` or `H:MM:SS` reading.
    ///
    /// # Examples
    ///
    /// ```
    /// use journey_engine::domain::LocalTimeOfDay;
    ///
    /// assert_eq!(LocalTimeOfDay::parse("9:05").unwrap().to_string(), "09:05");
    /// assert_eq!(LocalTimeOfDay::parse("14:30:15").unwrap().to_string(), "14:30");
    ///
    /// assert!(LocalTimeOfDay::parse("1430").is_err());
    /// assert!(LocalTimeOfDay::parse("24:00").is_err());
    /// assert!(LocalTimeOfDay::parse("12:5").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        let parts: Vec<&str> = s.split(':').collect();
        if !(2..=3).contains(&parts.len()) {
            return Err(TimeError::InvalidTimeOfDay("expected H:MM or H:MM:SS"));
        }

        let hour = parse_digits(parts[0], 1..=2)
            .ok_or(TimeError::InvalidTimeOfDay("invalid hour digits"))?;
        if hour > 23 {
            return Err(TimeError::InvalidTimeOfDay("hour must be 0-23"));
        }

        let minute = parse_digits(parts[1], 2..=2)
            .ok_or(TimeError::InvalidTimeOfDay("invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::InvalidTimeOfDay("minute must be 0-59"));
        }

        let second = match parts.get(2) {
            Some(part) => {
                let second = parse_digits(part, 2..=2)
                    .ok_or(TimeError::InvalidTimeOfDay("invalid second digits"))?;
                if second > 59 {
                    return Err(TimeError::InvalidTimeOfDay("second must be 0-59"));
                }
                second
            }
            None => 0,
        };

        NaiveTime::from_hms_opt(hour, minute, second)
            .map(Self)
            .ok_or(TimeError::InvalidTimeOfDay("invalid time"))
    }

    /// Returns the underlying time.
    pub fn time(&self) -> NaiveTime {
        self.0
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// Drops seconds and sub-second precision.
    pub fn truncated(self) -> Self {
        Self(NaiveTime::from_hms_opt(self.hour(), self.minute(), 0).unwrap_or(self.0))
    }

    /// Places this reading on a calendar day (no timezone yet).
    pub fn on(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.0)
    }
}

impl Ord for LocalTimeOfDay {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl PartialOrd for LocalTimeOfDay {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for LocalTimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LocalTimeOfDay({:02}:{:02}:{:02})",
            self.hour(),
            self.minute(),
            self.0.second()
        )
    }
}

impl fmt::Display for LocalTimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl serde::Serialize for LocalTimeOfDay {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parse an ASCII digit run whose length lies in `len`.
fn parse_digits(s: &str, len: RangeInclusive<usize>) -> Option<u32> {
    if !len.contains(&s.len()) || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Place a wall-clock reading on the timeline of `zone`.
///
/// This is the only place where local readings become instants:
///
/// - an unambiguous reading maps to its instant;
/// - a reading repeated by a backward transition maps to the earlier instant;
/// - a reading skipped by a forward transition is read with the offset in
///   force before the gap, so 02:30 on a +01:00 → +02:00 day is 03:30.
///
/// # Examples
///
/// ```
/// use journey_engine::domain::zoned_local;
/// use chrono::{NaiveDate, NaiveTime, Utc};
///
/// let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
/// let time = NaiveTime::from_hms_opt(14, 30, 0).unwrap();
/// let dt = zoned_local(date, time, chrono_tz::Europe::Vienna).unwrap();
/// assert_eq!(dt.with_timezone(&Utc).format("%H:%M").to_string(), "13:30");
/// ```
pub fn zoned_local(date: NaiveDate, time: NaiveTime, zone: Tz) -> Result<DateTime<Tz>, TimeError> {
    let naive = date.and_time(time);
    if let Some(dt) = zone.from_local_datetime(&naive).earliest() {
        return Ok(dt);
    }

    let before = naive
        .checked_sub_signed(Duration::days(1))
        .ok_or(TimeError::Unresolvable)?;
    let offset = zone.offset_from_utc_datetime(&before).fix();
    let utc = naive
        .checked_sub_signed(Duration::seconds(i64::from(offset.local_minus_utc())))
        .ok_or(TimeError::Unresolvable)?;
    Ok(zone.from_utc_datetime(&utc))
}

/// Parse and anchor a configured reading onto a civil date in `zone`.
pub fn anchor(time: &str, date: CivilDate, zone: Tz) -> Result<DateTime<Tz>, TimeError> {
    let time = LocalTimeOfDay::parse(time)?;
    let date = date.resolve()?;
    zoned_local(date, time.time(), zone)
}

/// Parse an ISO-8601 instant.
///
/// Accepts RFC 3339 strings with any offset; strings without an offset are
/// read as UTC.
pub fn parse_instant(s: &str) -> Result<DateTime<Utc>, TimeError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| TimeError::InvalidInstant(s.to_string()))
}

/// The "HH:MM" reading of an instant on the wall clock of `zone`.
pub fn local_time_of_day(instant: DateTime<Utc>, zone: Tz) -> LocalTimeOfDay {
    LocalTimeOfDay::new(instant.with_timezone(&zone).time()).truncated()
}

/// The later of two readings, assuming both fall on the same day.
///
/// A missing side yields the other one. "23:30" is later than "00:15" here
/// even when the second reading belongs to the following day.
pub fn later_of_same_day(
    a: Option<LocalTimeOfDay>,
    b: Option<LocalTimeOfDay>,
) -> Option<LocalTimeOfDay> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

/// The earlier of two readings, assuming both fall on the same day.
pub fn earlier_of_same_day(
    a: Option<LocalTimeOfDay>,
    b: Option<LocalTimeOfDay>,
) -> Option<LocalTimeOfDay> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

// String-facing operations. These never fail.

/// Convert a local reading in `zone` to the UTC time of day ("HH:MM:SS").
///
/// Returns [`UTC_TIME_OF_DAY_FALLBACK`] for invalid input.
///
/// # Examples
///
/// ```
/// use journey_engine::domain::{CivilDate, local_time_to_utc_time_of_day};
///
/// let date = CivilDate::new(2024, 1, 15);
/// let utc = local_time_to_utc_time_of_day("14:30", date, chrono_tz::Europe::Vienna);
/// assert_eq!(utc, "13:30:00");
/// ```
pub fn local_time_to_utc_time_of_day(time: &str, date: CivilDate, zone: Tz) -> String {
    anchor(time, date, zone)
        .map(|dt| dt.with_timezone(&Utc).format("%H:%M:%S").to_string())
        .unwrap_or_else(|_| UTC_TIME_OF_DAY_FALLBACK.to_string())
}

/// Convert a local reading in `zone` to a full UTC instant
/// ("YYYY-MM-DDTHH:MM:SSZ").
///
/// Returns [`UTC_INSTANT_FALLBACK`] for invalid input.
pub fn local_time_to_utc_instant(time: &str, date: CivilDate, zone: Tz) -> String {
    anchor(time, date, zone)
        .map(|dt| {
            dt.with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Secs, true)
        })
        .unwrap_or_else(|_| UTC_INSTANT_FALLBACK.to_string())
}

/// Normalize a configured reading to "HH:MM" as it appears on the display
/// clock of `zone` on the given day.
///
/// Readings skipped by a forward transition come out shifted by the gap.
/// Returns [`TIME_OF_DAY_UNAVAILABLE`] for invalid input.
pub fn config_time_to_local_time_of_day(time: &str, date: CivilDate, zone: Tz) -> String {
    anchor(time, date, zone)
        .map(|dt| LocalTimeOfDay::new(dt.time()).to_string())
        .unwrap_or_else(|_| TIME_OF_DAY_UNAVAILABLE.to_string())
}

/// Render an ISO instant as "HH:MM" on the wall clock of `zone`.
///
/// Returns [`TIME_OF_DAY_UNAVAILABLE`] if the instant cannot be parsed.
pub fn utc_instant_to_local_time_of_day(instant: &str, zone: Tz) -> String {
    parse_instant(instant)
        .map(|dt| local_time_of_day(dt, zone).to_string())
        .unwrap_or_else(|_| TIME_OF_DAY_UNAVAILABLE.to_string())
}

/// The later of two "HH:MM" readings on an implicit common day.
///
/// If only one side parses, that side wins. If neither parses, the first
/// non-empty input is returned unchanged, else [`TIME_OF_DAY_UNAVAILABLE`].
///
/// # Examples
///
/// ```
/// use journey_engine::domain::later_of;
///
/// assert_eq!(later_of("09:00", "10:15"), "10:15");
/// assert_eq!(later_of("", "10:15"), "10:15");
/// assert_eq!(later_of("", ""), "--:--");
/// ```
pub fn later_of(t1: &str, t2: &str) -> String {
    pick_same_day(t1, t2, later_of_same_day)
}

/// The earlier of two "HH:MM" readings on an implicit common day.
///
/// Fallbacks as for [`later_of`].
pub fn earlier_of(t1: &str, t2: &str) -> String {
    pick_same_day(t1, t2, earlier_of_same_day)
}

fn pick_same_day(
    t1: &str,
    t2: &str,
    pick: fn(Option<LocalTimeOfDay>, Option<LocalTimeOfDay>) -> Option<LocalTimeOfDay>,
) -> String {
    let a = LocalTimeOfDay::parse(t1).ok();
    let b = LocalTimeOfDay::parse(t2).ok();
    match pick(a, b) {
        Some(time) => time.to_string(),
        None => [t1, t2]
            .into_iter()
            .find(|t| !t.is_empty() && *t != TIME_OF_DAY_UNAVAILABLE)
            .unwrap_or(TIME_OF_DAY_UNAVAILABLE)
            .to_string(),
    }
}

/// Shift an ISO instant by a (possibly negative) number of minutes.
///
/// Unlike the other string operations this one fails: callers are expected
/// to have validated the instant already.
///
/// # Examples
///
/// ```
/// use journey_engine::domain::add_minutes;
///
/// let shifted = add_minutes("2024-01-15T23:50:00Z", 20).unwrap();
/// assert_eq!(shifted.to_rfc3339(), "2024-01-16T00:10:00+00:00");
/// assert!(add_minutes("yesterday", 20).is_err());
/// ```
pub fn add_minutes(instant: &str, minutes: i64) -> Result<DateTime<Utc>, TimeError> {
    let parsed = parse_instant(instant)?;
    Duration::try_minutes(minutes)
        .and_then(|delta| parsed.checked_add_signed(delta))
        .ok_or_else(|| TimeError::InvalidInstant(instant.to_string()))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use chrono_tz::Europe::Vienna;
    use proptest::prelude::*;

    prop_compose! {
        // Vienna only ever skips or repeats readings between 02:00 and 03:00.
        fn existing_time()(hour in (0u32..24).prop_filter("DST window", |h| *h != 2),
                           minute in 0u32..60) -> String {
            format!("{:02}:{:02}", hour, minute)
        }
    }

    prop_compose! {
        fn valid_date()(
            year in 2000i32..2100,
            month in 1u32..=12,
            day in 1u32..=28
        ) -> CivilDate {
            CivilDate::new(year, month, day)
        }
    }

    proptest! {
        /// Local -> UTC -> local reproduces the reading.
        #[test]
        fn local_utc_roundtrip(time in existing_time(), date in valid_date()) {
            let instant = local_time_to_utc_instant(&time, date, Vienna);
            prop_assert_eq!(utc_instant_to_local_time_of_day(&instant, Vienna), time);
        }

        /// Round trip also holds on the DST transition days themselves.
        #[test]
        fn roundtrip_on_transition_days(
            time in existing_time(),
            day in prop::sample::select(vec![
                CivilDate::new(2024, 3, 31),
                CivilDate::new(2024, 10, 27),
                CivilDate::new(2025, 3, 30),
                CivilDate::new(2025, 10, 26),
            ])
        ) {
            let instant = local_time_to_utc_instant(&time, day, Vienna);
            prop_assert_eq!(utc_instant_to_local_time_of_day(&instant, Vienna), time);
        }

        /// Parse then display roundtrips for zero-padded readings.
        #[test]
        fn parse_display_roundtrip(hour in 0u32..24, minute in 0u32..60) {
            let s = format!("{:02}:{:02}", hour, minute);
            prop_assert_eq!(LocalTimeOfDay::parse(&s).unwrap().to_string(), s);
        }

        /// later_of and earlier_of always return one of their inputs.
        #[test]
        fn pick_returns_an_input(a in existing_time(), b in existing_time()) {
            let later = later_of(&a, &b);
            let earlier = earlier_of(&a, &b);
            prop_assert!(later == a || later == b);
            prop_assert!(earlier == a || earlier == b);
            prop_assert!(earlier <= later);
        }

        /// Adding then subtracting the same minutes is the identity.
        #[test]
        fn add_minutes_inverse(minutes in -10_000i64..10_000) {
            let start = "2024-06-01T12:00:00Z";
            let shifted = add_minutes(start, minutes).unwrap();
            let back = add_minutes(&shifted.to_rfc3339(), -minutes).unwrap();
            prop_assert_eq!(back, parse_instant(start).unwrap());
        }
    }
}
