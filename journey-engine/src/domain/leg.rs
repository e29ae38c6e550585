//! Journey leg type.
//!
//! A `Leg` is one segment of a connection: a ride on a vehicle, a walk, or a
//! transfer inside a station. Legs are owned by exactly one connection.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::DomainError;

/// What a leg consists of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegKind {
    /// Walking between places
    Walk,
    /// Changing platforms or stops within an interchange
    Transfer,
    /// Riding a scheduled vehicle
    Ride,
    /// Any other mode reported by the routing API
    Other,
}

impl LegKind {
    /// Map a routing-API leg type onto a kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use journey_engine::domain::LegKind;
    ///
    /// assert_eq!(LegKind::parse("WALK"), LegKind::Walk);
    /// assert_eq!(LegKind::parse("ride"), LegKind::Ride);
    /// assert_eq!(LegKind::parse("CABLE_CAR"), LegKind::Other);
    /// ```
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "WALK" | "FOOT" => LegKind::Walk,
            "TRANSFER" => LegKind::Transfer,
            "RIDE" | "TRANSIT" => LegKind::Ride,
            _ => LegKind::Other,
        }
    }
}

/// Vehicle details for a ride.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Vehicle {
    /// Line name shown to passengers (e.g., "U4")
    pub line: Option<String>,
    /// Transport mode (e.g., "SUBWAY", "BUS")
    pub mode: Option<String>,
    /// Headsign or direction
    pub direction: Option<String>,
}

/// A service alert attached to a leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub summary: String,
    pub description: Option<String>,
}

/// A segment of a connection.
///
/// # Invariants
///
/// - `arrival >= departure`
#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
    kind: LegKind,
    departure: DateTime<Utc>,
    arrival: DateTime<Utc>,
    vehicle: Option<Vehicle>,
    alerts: Vec<Alert>,
    origin: Option<String>,
    destination: Option<String>,
}

impl Leg {
    /// Construct a leg, validating that it does not run backwards in time.
    ///
    /// # Examples
    ///
    /// ```
    /// use journey_engine::domain::{Leg, LegKind};
    /// use chrono::{Duration, TimeZone, Utc};
    ///
    /// let dep = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
    /// let arr = dep + Duration::minutes(4);
    ///
    /// let walk = Leg::new(LegKind::Walk, dep, arr).unwrap();
    /// assert_eq!(walk.duration(), Duration::minutes(4));
    ///
    /// assert!(Leg::new(LegKind::Walk, arr, dep).is_err());
    /// ```
    pub fn new(
        kind: LegKind,
        departure: DateTime<Utc>,
        arrival: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if arrival < departure {
            return Err(DomainError::InvalidLeg(
                "arrival must not precede departure",
            ));
        }

        Ok(Leg {
            kind,
            departure,
            arrival,
            vehicle: None,
            alerts: Vec::new(),
            origin: None,
            destination: None,
        })
    }

    /// Attach vehicle details.
    pub fn with_vehicle(mut self, vehicle: Vehicle) -> Self {
        self.vehicle = Some(vehicle);
        self
    }

    /// Attach service alerts.
    pub fn with_alerts(mut self, alerts: Vec<Alert>) -> Self {
        self.alerts = alerts;
        self
    }

    /// Attach origin and destination place names.
    pub fn with_places(mut self, origin: Option<String>, destination: Option<String>) -> Self {
        self.origin = origin;
        self.destination = destination;
        self
    }

    pub fn kind(&self) -> LegKind {
        self.kind
    }

    pub fn departure(&self) -> DateTime<Utc> {
        self.departure
    }

    pub fn arrival(&self) -> DateTime<Utc> {
        self.arrival
    }

    pub fn vehicle(&self) -> Option<&Vehicle> {
        self.vehicle.as_ref()
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    /// Returns the time spent on this leg.
    pub fn duration(&self) -> Duration {
        self.arrival.signed_duration_since(self.departure)
    }

    /// Returns true if this is a walking leg.
    pub fn is_walk(&self) -> bool {
        self.kind == LegKind::Walk
    }

    /// Move the leg to a new window, keeping other details.
    pub(crate) fn retime(&mut self, departure: DateTime<Utc>, arrival: DateTime<Utc>) {
        debug_assert!(departure <= arrival);
        self.departure = departure;
        self.arrival = arrival;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, h, m, 0).unwrap()
    }

    #[test]
    fn kind_parsing() {
        assert_eq!(LegKind::parse("WALK"), LegKind::Walk);
        assert_eq!(LegKind::parse("foot"), LegKind::Walk);
        assert_eq!(LegKind::parse("TRANSFER"), LegKind::Transfer);
        assert_eq!(LegKind::parse("RIDE"), LegKind::Ride);
        assert_eq!(LegKind::parse("Transit"), LegKind::Ride);
        assert_eq!(LegKind::parse("FERRY"), LegKind::Other);
        assert_eq!(LegKind::parse(""), LegKind::Other);
    }

    #[test]
    fn zero_length_leg_is_valid() {
        let leg = Leg::new(LegKind::Transfer, at(10, 0), at(10, 0)).unwrap();
        assert_eq!(leg.duration(), Duration::zero());
    }

    #[test]
    fn backwards_leg_rejected() {
        let err = Leg::new(LegKind::Ride, at(11, 0), at(10, 0)).unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidLeg("arrival must not precede departure")
        );
    }

    #[test]
    fn builder_methods() {
        let leg = Leg::new(LegKind::Ride, at(10, 0), at(10, 25))
            .unwrap()
            .with_vehicle(Vehicle {
                line: Some("U4".into()),
                mode: Some("SUBWAY".into()),
                direction: Some("Heiligenstadt".into()),
            })
            .with_alerts(vec![Alert {
                summary: "Lift out of service".into(),
                description: None,
            }])
            .with_places(Some("Karlsplatz".into()), Some("Schottenring".into()));

        assert_eq!(leg.vehicle().and_then(|v| v.line.as_deref()), Some("U4"));
        assert_eq!(leg.alerts().len(), 1);
        assert_eq!(leg.origin(), Some("Karlsplatz"));
        assert_eq!(leg.destination(), Some("Schottenring"));
        assert!(!leg.is_walk());
    }

    #[test]
    fn retime_moves_window() {
        let mut leg = Leg::new(LegKind::Walk, at(10, 0), at(10, 12)).unwrap();
        leg.retime(at(14, 48), at(15, 0));
        assert_eq!(leg.departure(), at(14, 48));
        assert_eq!(leg.arrival(), at(15, 0));
        assert_eq!(leg.duration(), Duration::minutes(12));
    }
}
