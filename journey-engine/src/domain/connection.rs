//! Connection types.
//!
//! A `Connection` is one candidate way of travelling to or from the activity,
//! made of one or more legs. Connections arrive pre-computed from the routing
//! API, are adjusted once by the normalizer and are read-only afterwards.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{DomainError, Leg};

/// Which side of the activity a connection serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    /// Travelling to the activity
    ToActivity,
    /// Travelling home from the activity
    FromActivity,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::ToActivity => write!(f, "to"),
            Direction::FromActivity => write!(f, "from"),
        }
    }
}

/// Stable identifier assigned by the routing API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A candidate connection to or from the activity.
///
/// # Invariants
///
/// - At least one leg
/// - `start <= end`
/// - Once normalized, legs are contiguous (each departs no earlier than the
///   previous one arrives); see [`Connection::is_contiguous`]
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    id: ConnectionId,
    legs: Vec<Leg>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    transfers: u32,
    anytime: bool,
    normalized: bool,
}

impl Connection {
    /// Constructs a connection whose window spans its legs.
    ///
    /// # Examples
    ///
    /// ```
    /// use journey_engine::domain::{Connection, ConnectionId, Leg, LegKind};
    /// use chrono::{Duration, TimeZone, Utc};
    ///
    /// let dep = Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap();
    /// let ride = Leg::new(LegKind::Ride, dep, dep + Duration::minutes(40)).unwrap();
    /// let walk = Leg::new(
    ///     LegKind::Walk,
    ///     dep + Duration::minutes(40),
    ///     dep + Duration::minutes(44),
    /// ).unwrap();
    ///
    /// let conn = Connection::new(ConnectionId::new("c1"), vec![ride, walk], 0, false).unwrap();
    /// assert_eq!(conn.start(), dep);
    /// assert_eq!(conn.end(), dep + Duration::minutes(44));
    /// assert_eq!(conn.leg_count(), 2);
    /// ```
    pub fn new(
        id: ConnectionId,
        legs: Vec<Leg>,
        transfers: u32,
        anytime: bool,
    ) -> Result<Self, DomainError> {
        let (Some(first), Some(last)) = (legs.first(), legs.last()) else {
            return Err(DomainError::EmptyConnection);
        };
        let (start, end) = (first.departure(), last.arrival());
        Self::with_window(id, legs, start, end, transfers, anytime)
    }

    /// Constructs a connection with an explicit window.
    ///
    /// The routing API may report a window that differs from the legs (for
    /// example when it already accounts for a final walk).
    pub fn with_window(
        id: ConnectionId,
        legs: Vec<Leg>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        transfers: u32,
        anytime: bool,
    ) -> Result<Self, DomainError> {
        if legs.is_empty() {
            return Err(DomainError::EmptyConnection);
        }
        if end < start {
            return Err(DomainError::EndBeforeStart {
                id: id.to_string(),
            });
        }

        Ok(Connection {
            id,
            legs,
            start,
            end,
            transfers,
            anytime,
            normalized: false,
        })
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    /// Returns all legs in order.
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    pub fn leg_count(&self) -> usize {
        self.legs.len()
    }

    /// Departure from the origin.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Arrival at the destination.
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn transfers(&self) -> u32 {
        self.transfers
    }

    /// Returns true for an unscheduled walk that can happen at any time.
    pub fn is_anytime(&self) -> bool {
        self.anytime
    }

    /// Returns true once the normalizer has processed this connection.
    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    /// Returns the total travel time.
    pub fn duration(&self) -> Duration {
        self.end.signed_duration_since(self.start)
    }

    /// Returns true if every leg departs no earlier than the previous arrives.
    pub fn is_contiguous(&self) -> bool {
        self.legs
            .windows(2)
            .all(|pair| pair[1].departure() >= pair[0].arrival())
    }

    pub(crate) fn legs_mut(&mut self) -> &mut Vec<Leg> {
        &mut self.legs
    }

    pub(crate) fn set_window(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) {
        debug_assert!(start <= end);
        self.start = start;
        self.end = end;
    }

    pub(crate) fn mark_normalized(&mut self) {
        self.normalized = true;
    }
}
