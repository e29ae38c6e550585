//! The two-sided selection engine.
//!
//! The user picks one connection to the activity and one back. Picking a
//! side disables candidates on the other side that would overlap it, clears
//! an opposite selection that became impossible, and re-derives the activity
//! window and duration warnings.
//!
//! Mutation happens only through `&mut self`, so there is a single writer.
//! A multi-threaded host must wrap the engine in a lock: `select_to` and
//! `select_from` read the opposite side's flags and then write them.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::api::{ConnectionsResponse, convert_connections};
use crate::domain::{
    Connection, ConnectionId, Direction, LocalTimeOfDay, anchor, earlier_of_same_day,
    later_of_same_day, local_time_of_day, zoned_local,
};
use crate::format::{Translate, format_minutes, format_stay, local_duration_result};
use crate::normalize::ConnectionNormalizer;

use super::config::{ActivityConfig, ActivityDates, ConfigError};
use super::recommend::resolve_recommended;
use super::snapshot::{CandidateView, EngineSnapshot};
use super::state::{
    ActivityTimes, CandidateStatus, DurationWarning, Fit, SelectionState, Stay, WarningKind,
};

/// Windows longer than this multiple of the recommended duration are
/// flagged as too long.
const LONGER_TOLERANCE: f64 = 1.10;

/// Error from a selection call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    /// The index does not name a candidate
    #[error("no connection {direction} the activity at index {index}")]
    UnknownCandidate { direction: Direction, index: usize },
}

/// Selection state holder for one search.
pub struct CompatibilityEngine<T> {
    config: ActivityConfig,
    dates: ActivityDates,
    translator: T,
    to: Vec<Connection>,
    from: Vec<Connection>,
    to_status: Vec<CandidateStatus>,
    from_status: Vec<CandidateStatus>,
    recommended_to: Option<usize>,
    recommended_from: Option<usize>,
    selection: SelectionState,
    times: ActivityTimes,
}

impl<T: Translate> CompatibilityEngine<T> {
    /// Create an engine over already-normalized candidate lists.
    ///
    /// Fails if the configuration or the dates do not validate.
    /// Recommendations default to the first candidate on each side.
    pub fn new(
        config: ActivityConfig,
        dates: ActivityDates,
        to: Vec<Connection>,
        from: Vec<Connection>,
        translator: T,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        dates.validate()?;

        let mut engine = Self {
            recommended_to: resolve_recommended(&to, None),
            recommended_from: resolve_recommended(&from, None),
            to_status: vec![CandidateStatus::default(); to.len()],
            from_status: vec![CandidateStatus::default(); from.len()],
            config,
            dates,
            translator,
            to,
            from,
            selection: SelectionState::default(),
            times: ActivityTimes::default(),
        };
        engine.refresh();
        Ok(engine)
    }

    /// Convert, normalize and load a routing-API response.
    ///
    /// Malformed connections are skipped; see [`convert_connections`].
    pub fn from_response(
        response: &ConnectionsResponse,
        config: ActivityConfig,
        dates: ActivityDates,
        translator: T,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        dates.validate()?;

        let normalizer = ConnectionNormalizer::new(&config, dates);
        let to = normalizer.normalize_all(
            convert_connections(&response.to, Direction::ToActivity),
            Direction::ToActivity,
        );
        let from = normalizer.normalize_all(
            convert_connections(&response.from, Direction::FromActivity),
            Direction::FromActivity,
        );

        let recommended_to = response.recommended_to.as_deref().map(ConnectionId::new);
        let recommended_from = response.recommended_from.as_deref().map(ConnectionId::new);

        Ok(Self::new(config, dates, to, from, translator)?
            .with_recommendations(recommended_to.as_ref(), recommended_from.as_ref()))
    }

    /// Resolve the API's recommended ids against the candidate lists.
    pub fn with_recommendations(
        mut self,
        to: Option<&ConnectionId>,
        from: Option<&ConnectionId>,
    ) -> Self {
        self.recommended_to = resolve_recommended(&self.to, to);
        self.recommended_from = resolve_recommended(&self.from, from);
        self
    }

    pub fn config(&self) -> &ActivityConfig {
        &self.config
    }

    pub fn dates(&self) -> ActivityDates {
        self.dates
    }

    pub fn selection(&self) -> SelectionState {
        self.selection
    }

    pub fn activity_times(&self) -> &ActivityTimes {
        &self.times
    }

    /// Returns the normalized candidates for one side.
    pub fn candidates(&self, direction: Direction) -> &[Connection] {
        match direction {
            Direction::ToActivity => &self.to,
            Direction::FromActivity => &self.from,
        }
    }

    /// Returns the flags of every candidate on one side.
    pub fn statuses(&self, direction: Direction) -> &[CandidateStatus] {
        match direction {
            Direction::ToActivity => &self.to_status,
            Direction::FromActivity => &self.from_status,
        }
    }

    pub fn status(&self, direction: Direction, index: usize) -> Option<CandidateStatus> {
        self.statuses(direction).get(index).copied()
    }

    /// Position of the recommended candidate on one side.
    pub fn recommended(&self, direction: Direction) -> Option<usize> {
        match direction {
            Direction::ToActivity => self.recommended_to,
            Direction::FromActivity => self.recommended_from,
        }
    }

    pub fn selected_to(&self) -> Option<&Connection> {
        self.selection.selected_to.map(|i| &self.to[i])
    }

    pub fn selected_from(&self) -> Option<&Connection> {
        self.selection.selected_from.map(|i| &self.from[i])
    }

    /// Select the connection to the activity, or clear it with `None`.
    ///
    /// Candidates home that leave before this connection arrives become
    /// incompatible; a selected one is dropped along with the activity end.
    pub fn select_to(&mut self, index: Option<usize>) -> Result<(), SelectionError> {
        let Some(index) = index else {
            self.clear_to();
            return Ok(());
        };
        let arrival = self
            .to
            .get(index)
            .ok_or(SelectionError::UnknownCandidate {
                direction: Direction::ToActivity,
                index,
            })?
            .end();

        self.selection.selected_to = Some(index);
        for (candidate, status) in self.from.iter().zip(&mut self.from_status) {
            status.incompatible = candidate.start() < arrival;
        }

        if let Some(from) = self.selection.selected_from {
            if self.from_status[from].incompatible {
                debug!(to = index, from, "Dropping incompatible connection home");
                self.selection.selected_from = None;
                self.times.set_end(None);
                reset(&mut self.to_status);
            }
        }

        let earliest_start =
            self.configured_time(&self.config.earliest_start_time, self.dates.start);
        self.times.set_start(later_of_same_day(
            Some(local_time_of_day(arrival, self.zone())),
            earliest_start,
        ));
        self.refresh();

        debug!(
            index,
            arrival = %arrival,
            start = ?self.times.start(),
            "Selected connection to activity"
        );
        Ok(())
    }

    /// Select the connection home, or clear it with `None`.
    ///
    /// Candidates to the activity that arrive after this connection leaves
    /// become incompatible; a selected one is dropped along with the
    /// activity start.
    pub fn select_from(&mut self, index: Option<usize>) -> Result<(), SelectionError> {
        let Some(index) = index else {
            self.clear_from();
            return Ok(());
        };
        let departure = self
            .from
            .get(index)
            .ok_or(SelectionError::UnknownCandidate {
                direction: Direction::FromActivity,
                index,
            })?
            .start();

        self.selection.selected_from = Some(index);
        for (candidate, status) in self.to.iter().zip(&mut self.to_status) {
            status.incompatible = candidate.end() > departure;
        }

        if let Some(to) = self.selection.selected_to {
            if self.to_status[to].incompatible {
                debug!(to, from = index, "Dropping incompatible connection to activity");
                self.selection.selected_to = None;
                self.times.set_start(None);
                reset(&mut self.from_status);
            }
        }

        let end_date = self.dates.end_date(self.config.multiday);
        let latest_end = self.configured_time(&self.config.latest_end_time, end_date);
        self.times.set_end(earlier_of_same_day(
            Some(local_time_of_day(departure, self.zone())),
            latest_end,
        ));
        self.refresh();

        debug!(
            index,
            departure = %departure,
            end = ?self.times.end(),
            "Selected connection home"
        );
        Ok(())
    }

    /// Select the recommended connection to the activity, then the
    /// recommended one home if it is still compatible.
    pub fn select_recommended(&mut self) -> Result<(), SelectionError> {
        if let Some(to) = self.recommended_to {
            self.select_to(Some(to))?;
        }
        if let Some(from) = self.recommended_from {
            if !self.from_status[from].incompatible {
                self.select_from(Some(from))?;
            }
        }
        Ok(())
    }

    /// A read-only view of the current state for rendering.
    pub fn snapshot(&self) -> EngineSnapshot {
        let zone = self.zone();
        let views = |list: &[Connection],
                     statuses: &[CandidateStatus],
                     recommended: Option<usize>,
                     selected: Option<usize>|
         -> Vec<CandidateView> {
            list.iter()
                .zip(statuses)
                .enumerate()
                .map(|(i, (connection, status))| {
                    CandidateView::new(
                        connection,
                        *status,
                        zone,
                        &self.translator,
                        recommended == Some(i),
                        selected == Some(i),
                    )
                })
                .collect()
        };

        EngineSnapshot {
            phase: self.selection.phase(),
            selection: self.selection,
            activity_times: self.times.clone(),
            to: views(
                &self.to,
                &self.to_status,
                self.recommended_to,
                self.selection.selected_to,
            ),
            from: views(
                &self.from,
                &self.from_status,
                self.recommended_from,
                self.selection.selected_from,
            ),
        }
    }

    fn zone(&self) -> Tz {
        self.config.timezone
    }

    fn clear_to(&mut self) {
        debug!("Cleared connection to activity");
        self.selection.selected_to = None;
        self.times.set_start(None);
        reset(&mut self.from_status);
        self.refresh();
    }

    fn clear_from(&mut self) {
        debug!("Cleared connection home");
        self.selection.selected_from = None;
        self.times.set_end(None);
        reset(&mut self.to_status);
        self.refresh();
    }

    /// A configured bound as it reads on the activity clock on `date`.
    fn configured_time(&self, time: &str, date: NaiveDate) -> Option<LocalTimeOfDay> {
        anchor(time, date.into(), self.zone())
            .ok()
            .map(|dt| LocalTimeOfDay::new(dt.time()).truncated())
    }

    fn refresh(&mut self) {
        self.refresh_duration();
        self.refresh_fit();
    }

    fn refresh_duration(&mut self) {
        if self.config.multiday {
            let (days, nights) = self.dates.stay();
            self.times.set_stay(Some(Stay { days, nights }));
            self.times
                .set_duration(format_stay(days, nights, &self.translator), None);
            return;
        }

        self.times.set_stay(None);
        let (Some(start), Some(end)) = (self.times.start(), self.times.end()) else {
            self.times.set_duration(String::new(), None);
            return;
        };

        // Both readings sit on the activity day, even if the trip home is
        // after midnight.
        let zone = self.zone();
        let start = zoned_local(self.dates.start, start.time(), zone).ok();
        let end = zoned_local(self.dates.start, end.time(), zone).ok();
        let result = local_duration_result(start, end, &self.translator);

        let warning = match (start, end) {
            (Some(start), Some(end)) if end >= start => duration_warning(
                result.total_minutes,
                self.config.duration_minutes,
                &self.translator,
            ),
            _ => None,
        };
        self.times.set_duration(result.text, warning);
    }

    fn refresh_fit(&mut self) {
        let single_day = !self.config.multiday;
        let zone = self.zone();
        let required = self.config.duration_minutes;

        let arrival = self.selection.selected_to.map(|i| self.to[i].end());
        for (candidate, status) in self.from.iter().zip(&mut self.from_status) {
            status.fit = match arrival {
                Some(arrival) if single_day && !status.incompatible => Some(classify(
                    arrival,
                    candidate.start(),
                    zone,
                    required,
                    &self.translator,
                )),
                _ => None,
            };
        }

        let departure = self.selection.selected_from.map(|i| self.from[i].start());
        for (candidate, status) in self.to.iter().zip(&mut self.to_status) {
            status.fit = match departure {
                Some(departure) if single_day && !status.incompatible => Some(classify(
                    candidate.end(),
                    departure,
                    zone,
                    required,
                    &self.translator,
                )),
                _ => None,
            };
        }
    }
}

fn reset(statuses: &mut [CandidateStatus]) {
    statuses.fill(CandidateStatus::default());
}

fn exceeds_tolerance(actual: i64, required: i64) -> bool {
    required > 0 && actual as f64 / required as f64 > LONGER_TOLERANCE
}

fn duration_warning<T: Translate>(actual: i64, required: i64, t: &T) -> Option<DurationWarning> {
    let diff = actual - required;
    if diff < 0 {
        Some(DurationWarning {
            kind: WarningKind::Shorter,
            magnitude: format_minutes(-diff, t),
        })
    } else if diff > 0 && exceeds_tolerance(actual, required) {
        Some(DurationWarning {
            kind: WarningKind::Longer,
            magnitude: format_minutes(diff, t),
        })
    } else {
        None
    }
}

/// Rate the time at the activity between an arrival and a departure.
fn classify<T: Translate>(
    arrival: DateTime<Utc>,
    departure: DateTime<Utc>,
    zone: Tz,
    required: i64,
    t: &T,
) -> Fit {
    let actual = local_duration_result(
        Some(arrival.with_timezone(&zone)),
        Some(departure.with_timezone(&zone)),
        t,
    )
    .total_minutes;

    if actual < required {
        Fit::TooShort
    } else if exceeds_tolerance(actual, required) {
        Fit::TooLong
    } else {
        Fit::Neutral
    }
}
