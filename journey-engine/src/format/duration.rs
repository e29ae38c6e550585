//! Duration rendering and parsing.
//!
//! Two differences are computed here. [`instant_difference`] works on raw
//! UTC instants and takes hours and minutes from the unrounded delta;
//! [`local_duration_result`] rounds the total first and derives hours and
//! minutes from it. The two can disagree by a minute at rounding boundaries,
//! and callers rely on each behaving as it does.

use chrono::{DateTime, TimeZone};
use serde::Serialize;

use super::{Translate, TranslationKey};

/// Outcome of measuring the time between two local datetimes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationResult {
    pub text: String,
    pub hours: i64,
    pub minutes: i64,
    pub total_minutes: i64,
}

impl DurationResult {
    fn empty(text: String) -> Self {
        Self {
            text,
            hours: 0,
            minutes: 0,
            total_minutes: 0,
        }
    }
}

/// Render a minute count as "H:MMh" or "M min".
///
/// Negative counts render as the unavailable placeholder.
///
/// # Examples
///
/// ```
/// use journey_engine::format::{EnglishUnits, format_minutes};
///
/// assert_eq!(format_minutes(90, &EnglishUnits), "1:30h");
/// assert_eq!(format_minutes(45, &EnglishUnits), "45 min");
/// assert_eq!(format_minutes(-5, &EnglishUnits), "--");
/// ```
pub fn format_minutes<T: Translate + ?Sized>(minutes: i64, t: &T) -> String {
    if minutes < 0 {
        return t.translate(TranslationKey::Unavailable);
    }
    format_parts(minutes / 60, minutes % 60, t)
}

fn format_parts<T: Translate + ?Sized>(hours: i64, minutes: i64, t: &T) -> String {
    if hours > 0 {
        format!(
            "{hours}:{minutes:02}{}",
            t.translate(TranslationKey::HoursShort)
        )
    } else {
        format!("{minutes} {}", t.translate(TranslationKey::MinutesShort))
    }
}

/// Render the time between two instants.
///
/// Hours are the floor of the fractional hour delta; minutes are the rounded
/// total minutes modulo 60. A negative delta renders as unavailable.
///
/// # Examples
///
/// ```
/// use journey_engine::format::{EnglishUnits, instant_difference};
/// use chrono::{TimeZone, Utc};
///
/// let start = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
/// let end = Utc.with_ymd_and_hms(2024, 1, 15, 11, 30, 0).unwrap();
/// assert_eq!(instant_difference(start, end, &EnglishUnits), "1:30h");
/// ```
pub fn instant_difference<Z, T>(start: DateTime<Z>, end: DateTime<Z>, t: &T) -> String
where
    Z: TimeZone,
    T: Translate + ?Sized,
{
    let seconds = end.signed_duration_since(start).num_seconds();
    if seconds < 0 {
        return t.translate(TranslationKey::Unavailable);
    }

    let total_minutes = seconds as f64 / 60.0;
    let hours = (total_minutes / 60.0).floor() as i64;
    let minutes = (total_minutes.round() as i64) % 60;
    format_parts(hours, minutes, t)
}

/// Measure the time between two datetimes already anchored to calendar days.
///
/// A missing endpoint yields the unavailable placeholder. An end before the
/// start is an ordering error and yields the end-before-start message with a
/// zero total; it is never reported as a negative duration.
pub fn local_duration_result<Z, T>(
    start: Option<DateTime<Z>>,
    end: Option<DateTime<Z>>,
    t: &T,
) -> DurationResult
where
    Z: TimeZone,
    T: Translate + ?Sized,
{
    let (Some(start), Some(end)) = (start, end) else {
        return DurationResult::empty(t.translate(TranslationKey::Unavailable));
    };

    if end < start {
        return DurationResult::empty(t.translate(TranslationKey::EndBeforeStart));
    }

    let seconds = end.signed_duration_since(start).num_seconds();
    let total_minutes = (seconds as f64 / 60.0).round() as i64;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    DurationResult {
        text: format_parts(hours, minutes, t),
        hours,
        minutes,
        total_minutes,
    }
}

/// Read back a duration produced by [`format_minutes`].
///
/// Returns 0 when the text carries neither unit.
///
/// # Examples
///
/// ```
/// use journey_engine::format::{EnglishUnits, parse_minutes};
///
/// assert_eq!(parse_minutes("1:30h", &EnglishUnits), 90);
/// assert_eq!(parse_minutes("45 min", &EnglishUnits), 45);
/// assert_eq!(parse_minutes("--", &EnglishUnits), 0);
/// ```
pub fn parse_minutes<T: Translate + ?Sized>(text: &str, t: &T) -> i64 {
    let hours_unit = t.translate(TranslationKey::HoursShort);
    let minutes_unit = t.translate(TranslationKey::MinutesShort);
    let text = text.trim();

    if let Some((hours, minutes)) = text
        .strip_suffix(hours_unit.as_str())
        .and_then(|body| body.split_once(':'))
    {
        return match (hours.trim().parse::<i64>(), minutes.trim().parse::<i64>()) {
            (Ok(hours), Ok(minutes)) => hours * 60 + minutes,
            _ => 0,
        };
    }

    text.strip_suffix(minutes_unit.as_str())
        .and_then(|body| body.trim().parse().ok())
        .unwrap_or(0)
}

/// Render a multi-day stay, e.g. "3 days / 2 nights".
pub fn format_stay<T: Translate + ?Sized>(days: i64, nights: i64, t: &T) -> String {
    format!(
        "{days} {} / {nights} {}",
        t.translate(TranslationKey::Days),
        t.translate(TranslationKey::Nights)
    )
}
