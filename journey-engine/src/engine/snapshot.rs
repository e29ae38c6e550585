//! Serializable views of the engine state.

use chrono_tz::Tz;
use serde::Serialize;

use crate::domain::{
    Alert, Connection, ConnectionId, Leg, LegKind, LocalTimeOfDay, local_time_of_day,
};
use crate::format::{Translate, instant_difference};

use super::state::{ActivityTimes, CandidateStatus, Fit, SelectionPhase, SelectionState};

/// Everything a front end needs to render one search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSnapshot {
    pub phase: SelectionPhase,
    pub selection: SelectionState,
    pub activity_times: ActivityTimes,
    pub to: Vec<CandidateView>,
    pub from: Vec<CandidateView>,
}

/// One candidate connection as displayed.
///
/// Times are wall-clock readings in the activity timezone.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateView {
    pub id: ConnectionId,
    pub departure: LocalTimeOfDay,
    pub arrival: LocalTimeOfDay,
    pub duration: String,
    pub transfers: u32,
    pub anytime: bool,
    pub legs: Vec<LegView>,
    pub recommended: bool,
    pub selected: bool,
    pub incompatible: bool,
    pub fit: Option<Fit>,
}

impl CandidateView {
    pub(crate) fn new<T: Translate>(
        connection: &Connection,
        status: CandidateStatus,
        zone: Tz,
        t: &T,
        recommended: bool,
        selected: bool,
    ) -> Self {
        Self {
            id: connection.id().clone(),
            departure: local_time_of_day(connection.start(), zone),
            arrival: local_time_of_day(connection.end(), zone),
            duration: instant_difference(connection.start(), connection.end(), t),
            transfers: connection.transfers(),
            anytime: connection.is_anytime(),
            legs: connection
                .legs()
                .iter()
                .map(|leg| LegView::new(leg, zone, t))
                .collect(),
            recommended,
            selected,
            incompatible: status.incompatible,
            fit: status.fit,
        }
    }
}

/// One leg of a displayed candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegView {
    pub kind: LegKind,
    pub departure: LocalTimeOfDay,
    pub arrival: LocalTimeOfDay,
    pub duration: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alerts: Vec<Alert>,
}

impl LegView {
    fn new<T: Translate>(leg: &Leg, zone: Tz, t: &T) -> Self {
        Self {
            kind: leg.kind(),
            departure: local_time_of_day(leg.departure(), zone),
            arrival: local_time_of_day(leg.arrival(), zone),
            duration: instant_difference(leg.departure(), leg.arrival(), t),
            line: leg.vehicle().and_then(|v| v.line.clone()),
            origin: leg.origin().map(str::to_string),
            destination: leg.destination().map(str::to_string),
            alerts: leg.alerts().to_vec(),
        }
    }
}
