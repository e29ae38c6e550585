//! Selection state and the values derived from it.

use serde::Serialize;

use crate::domain::LocalTimeOfDay;

/// The connections currently chosen on each side.
///
/// Indices point into the engine's normalized candidate lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    pub selected_to: Option<usize>,
    pub selected_from: Option<usize>,
}

/// Which sides have a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionPhase {
    Empty,
    ToOnly,
    FromOnly,
    Both,
}

impl SelectionState {
    pub fn phase(&self) -> SelectionPhase {
        match (self.selected_to, self.selected_from) {
            (None, None) => SelectionPhase::Empty,
            (Some(_), None) => SelectionPhase::ToOnly,
            (None, Some(_)) => SelectionPhase::FromOnly,
            (Some(_), Some(_)) => SelectionPhase::Both,
        }
    }
}

/// Direction of a duration warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WarningKind {
    /// Less time at the activity than recommended
    Shorter,
    /// More than 10% over the recommended time
    Longer,
}

/// A deviation from the recommended activity duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DurationWarning {
    pub kind: WarningKind,
    /// Formatted size of the deviation, e.g. "30 min".
    pub magnitude: String,
}

/// Days and nights spent on a multi-day activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stay {
    pub days: i64,
    pub nights: i64,
}

/// The activity window implied by the current selection.
///
/// `start` and `end` are wall-clock readings in the activity timezone. In
/// single-day mode `duration` is the formatted time between them; in
/// multi-day mode it is the day/night count of the chosen date range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityTimes {
    start: Option<LocalTimeOfDay>,
    end: Option<LocalTimeOfDay>,
    duration: String,
    warning_duration: bool,
    warning: Option<DurationWarning>,
    stay: Option<Stay>,
}

impl ActivityTimes {
    pub fn start(&self) -> Option<LocalTimeOfDay> {
        self.start
    }

    pub fn end(&self) -> Option<LocalTimeOfDay> {
        self.end
    }

    pub fn duration(&self) -> &str {
        &self.duration
    }

    /// Returns true if the window deviates from the recommended duration.
    pub fn warning_duration(&self) -> bool {
        self.warning_duration
    }

    pub fn warning(&self) -> Option<&DurationWarning> {
        self.warning.as_ref()
    }

    pub fn stay(&self) -> Option<Stay> {
        self.stay
    }

    pub(crate) fn set_start(&mut self, start: Option<LocalTimeOfDay>) {
        self.start = start;
    }

    pub(crate) fn set_end(&mut self, end: Option<LocalTimeOfDay>) {
        self.end = end;
    }

    pub(crate) fn set_duration(&mut self, duration: String, warning: Option<DurationWarning>) {
        self.duration = duration;
        self.warning_duration = warning.is_some();
        self.warning = warning;
    }

    pub(crate) fn set_stay(&mut self, stay: Option<Stay>) {
        self.stay = stay;
    }
}

/// Advisory marker for a compatible candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Fit {
    /// Leaves less time at the activity than recommended
    TooShort,
    /// Leaves more than 10% over the recommended time
    TooLong,
    Neutral,
}

/// Per-candidate flags recomputed after every selection change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CandidateStatus {
    /// Cannot be combined with the selection on the other side.
    pub incompatible: bool,
    /// Only set for compatible candidates in single-day mode.
    pub fit: Option<Fit>,
}
