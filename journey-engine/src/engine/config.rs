//! Activity configuration for a search.

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::domain::{LocalTimeOfDay, TimeError};

/// Error raised when a configuration is unusable.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A configured time is not an `H:MM[:SS]` reading
    #[error("invalid {field}: {source}")]
    InvalidTime {
        field: &'static str,
        source: TimeError,
    },

    /// The required activity duration is zero or negative
    #[error("required duration must be positive, got {0} minutes")]
    NonPositiveDuration(i64),

    /// An earliest bound lies after its latest bound
    #[error("{earliest} must not be after {latest}")]
    InvertedBounds {
        earliest: &'static str,
        latest: &'static str,
    },

    /// A multi-day range ends before it starts
    #[error("end date {end} is before start date {start}")]
    EndDateBeforeStart { start: NaiveDate, end: NaiveDate },

    /// The configuration could not be read
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Time bounds and required duration of the activity.
///
/// All times are wall-clock readings in `timezone`. The configuration is
/// fixed for the lifetime of a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityConfig {
    /// Earliest time the activity may start.
    pub earliest_start_time: String,

    /// Latest time the activity may start.
    /// Anytime connections to the activity arrive at this time.
    pub latest_start_time: String,

    /// Earliest time the activity may end.
    /// Anytime connections from the activity leave at this time.
    pub earliest_end_time: String,

    /// Latest time the activity may end.
    pub latest_end_time: String,

    /// Recommended time at the activity (minutes).
    pub duration_minutes: i64,

    /// IANA timezone of the activity location.
    pub timezone: Tz,

    /// Whether the activity spans several days.
    #[serde(default)]
    pub multiday: bool,
}

impl ActivityConfig {
    /// Create a single-day configuration.
    pub fn new(
        earliest_start_time: &str,
        latest_start_time: &str,
        earliest_end_time: &str,
        latest_end_time: &str,
        duration_minutes: i64,
        timezone: Tz,
    ) -> Self {
        Self {
            earliest_start_time: earliest_start_time.to_string(),
            latest_start_time: latest_start_time.to_string(),
            earliest_end_time: earliest_end_time.to_string(),
            latest_end_time: latest_end_time.to_string(),
            duration_minutes,
            timezone,
            multiday: false,
        }
    }

    /// Switch to multi-day mode.
    pub fn multiday(mut self) -> Self {
        self.multiday = true;
        self
    }

    /// Parse and validate a JSON configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use journey_engine::engine::ActivityConfig;
    ///
    /// let config = ActivityConfig::from_json(r#"{
    ///     "earliestStartTime": "09:00",
    ///     "latestStartTime": "10:00",
    ///     "earliestEndTime": "16:00",
    ///     "latestEndTime": "18:00",
    ///     "durationMinutes": 420,
    ///     "timezone": "Europe/Vienna"
    /// }"#).unwrap();
    ///
    /// assert_eq!(config.timezone, chrono_tz::Europe::Vienna);
    /// assert!(!config.multiday);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every configured time parses and the bounds are ordered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let earliest_start = parse_field("earliestStartTime", &self.earliest_start_time)?;
        let latest_start = parse_field("latestStartTime", &self.latest_start_time)?;
        let earliest_end = parse_field("earliestEndTime", &self.earliest_end_time)?;
        let latest_end = parse_field("latestEndTime", &self.latest_end_time)?;

        if self.duration_minutes <= 0 {
            return Err(ConfigError::NonPositiveDuration(self.duration_minutes));
        }
        if earliest_start > latest_start {
            return Err(ConfigError::InvertedBounds {
                earliest: "earliestStartTime",
                latest: "latestStartTime",
            });
        }
        if earliest_end > latest_end {
            return Err(ConfigError::InvertedBounds {
                earliest: "earliestEndTime",
                latest: "latestEndTime",
            });
        }

        Ok(())
    }
}

fn parse_field(field: &'static str, value: &str) -> Result<LocalTimeOfDay, ConfigError> {
    LocalTimeOfDay::parse(value).map_err(|source| ConfigError::InvalidTime { field, source })
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self::new(
            "09:00",
            "10:00",
            "16:00",
            "18:00",
            420, // 7 hours
            chrono_tz::Europe::Vienna,
        )
    }
}

/// The calendar day (or days) chosen for the activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDates {
    /// Day the activity starts.
    pub start: NaiveDate,

    /// Day a multi-day activity ends, once chosen.
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

impl ActivityDates {
    /// A single activity day.
    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: None,
        }
    }

    /// A multi-day range.
    pub fn range(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    /// The day the activity ends on.
    ///
    /// Only multi-day activities use the end date; single-day activities
    /// always end on their start date.
    pub fn end_date(&self, multiday: bool) -> NaiveDate {
        match (multiday, self.end) {
            (true, Some(end)) => end,
            _ => self.start,
        }
    }

    /// Number of days and nights covered by the range.
    pub fn stay(&self) -> (i64, i64) {
        let days = (self.end_date(true) - self.start).num_days() + 1;
        (days, days - 1)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.end {
            Some(end) if end < self.start => Err(ConfigError::EndDateBeforeStart {
                start: self.start,
                end,
            }),
            _ => Ok(()),
        }
    }
}
