//! Conversion from routing API DTOs to domain types.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::domain::{
    Alert, Connection, ConnectionId, Direction, DomainError, Leg, LegKind, Vehicle,
    parse_instant,
};

use super::types::{RawConnection, RawLeg};

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConversionError {
    /// A timestamp did not parse
    #[error("invalid {field}: {value:?}")]
    InvalidInstant { field: &'static str, value: String },

    /// The converted values break a domain invariant
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Convert a candidate list, skipping connections that do not convert.
///
/// A single malformed connection never fails the whole list.
pub fn convert_connections(raw: &[RawConnection], direction: Direction) -> Vec<Connection> {
    let mut results = Vec::with_capacity(raw.len());

    for item in raw {
        match convert_connection(item) {
            Ok(connection) => results.push(connection),
            Err(e) => {
                warn!(id = %item.id, %direction, error = %e, "Skipping connection");
            }
        }
    }

    results
}

/// Convert a single connection.
pub fn convert_connection(raw: &RawConnection) -> Result<Connection, ConversionError> {
    let legs = raw
        .legs
        .iter()
        .map(convert_leg)
        .collect::<Result<Vec<_>, _>>()?;

    let transfers = raw.transfers.unwrap_or_else(|| implied_transfers(&legs));
    let id = ConnectionId::new(raw.id.clone());

    let connection = match (raw.start.as_deref(), raw.end.as_deref()) {
        (None, None) => Connection::new(id, legs, transfers, raw.anytime)?,
        (start, end) => {
            let (Some(first), Some(last)) = (legs.first(), legs.last()) else {
                return Err(DomainError::EmptyConnection.into());
            };
            let start = match start {
                Some(s) => instant("start", s)?,
                None => first.departure(),
            };
            let end = match end {
                Some(s) => instant("end", s)?,
                None => last.arrival(),
            };
            Connection::with_window(id, legs, start, end, transfers, raw.anytime)?
        }
    };

    Ok(connection)
}

fn convert_leg(raw: &RawLeg) -> Result<Leg, ConversionError> {
    let departure = instant("departure", &raw.departure)?;
    let arrival = instant("arrival", &raw.arrival)?;

    let mut leg = Leg::new(LegKind::parse(&raw.kind), departure, arrival)?
        .with_places(raw.from_name.clone(), raw.to_name.clone());

    if raw.line.is_some() || raw.mode.is_some() || raw.direction.is_some() {
        leg = leg.with_vehicle(Vehicle {
            line: raw.line.clone(),
            mode: raw.mode.clone(),
            direction: raw.direction.clone(),
        });
    }

    if !raw.alerts.is_empty() {
        leg = leg.with_alerts(
            raw.alerts
                .iter()
                .map(|a| Alert {
                    summary: a.summary.clone(),
                    description: a.description.clone(),
                })
                .collect(),
        );
    }

    Ok(leg)
}

fn instant(field: &'static str, value: &str) -> Result<DateTime<Utc>, ConversionError> {
    parse_instant(value).map_err(|_| ConversionError::InvalidInstant {
        field,
        value: value.to_string(),
    })
}

/// One fewer than the number of rides, or zero.
fn implied_transfers(legs: &[Leg]) -> u32 {
    let rides = legs.iter().filter(|l| l.kind() == LegKind::Ride).count() as u32;
    rides.saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn raw_leg(kind: &str, dep: &str, arr: &str) -> RawLeg {
        RawLeg {
            kind: kind.to_string(),
            departure: dep.to_string(),
            arrival: arr.to_string(),
            line: None,
            mode: None,
            direction: None,
            from_name: None,
            to_name: None,
            alerts: vec![],
        }
    }

    fn raw_connection(id: &str, legs: Vec<RawLeg>) -> RawConnection {
        RawConnection {
            id: id.to_string(),
            legs,
            start: None,
            end: None,
            transfers: None,
            anytime: false,
        }
    }

    fn utc(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, h, m, 0).unwrap()
    }

    #[test]
    fn converts_legs_and_window() {
        let mut ride = raw_leg("RIDE", "2024-01-15T08:00:00Z", "2024-01-15T08:40:00Z");
        ride.line = Some("S1".into());
        let walk = raw_leg("WALK", "2024-01-15T08:40:00Z", "2024-01-15T08:44:00Z");

        let conn = convert_connection(&raw_connection("c1", vec![ride, walk])).unwrap();

        assert_eq!(conn.id().as_str(), "c1");
        assert_eq!(conn.start(), utc(8, 0));
        assert_eq!(conn.end(), utc(8, 44));
        assert_eq!(conn.legs()[0].vehicle().and_then(|v| v.line.as_deref()), Some("S1"));
        assert!(conn.legs()[1].vehicle().is_none());
        assert!(conn.legs()[1].is_walk());
    }

    #[test]
    fn offset_timestamps_are_normalized_to_utc() {
        let ride = raw_leg("RIDE", "2024-01-15T09:00:00+01:00", "2024-01-15T09:30:00+01:00");
        let conn = convert_connection(&raw_connection("c1", vec![ride])).unwrap();
        assert_eq!(conn.start(), utc(8, 0));
    }

    #[test]
    fn explicit_window_overrides_legs() {
        let ride = raw_leg("RIDE", "2024-01-15T08:00:00Z", "2024-01-15T08:40:00Z");
        let mut raw = raw_connection("c1", vec![ride]);
        raw.end = Some("2024-01-15T08:50:00Z".into());

        let conn = convert_connection(&raw).unwrap();
        assert_eq!(conn.start(), utc(8, 0));
        assert_eq!(conn.end(), utc(8, 50));
    }

    #[test]
    fn transfers_default_to_rides_minus_one() {
        let legs = vec![
            raw_leg("RIDE", "2024-01-15T08:00:00Z", "2024-01-15T08:20:00Z"),
            raw_leg("TRANSFER", "2024-01-15T08:20:00Z", "2024-01-15T08:25:00Z"),
            raw_leg("RIDE", "2024-01-15T08:25:00Z", "2024-01-15T08:50:00Z"),
        ];
        let conn = convert_connection(&raw_connection("c1", legs)).unwrap();
        assert_eq!(conn.transfers(), 1);

        let walk_only = vec![raw_leg("WALK", "2024-01-15T08:00:00Z", "2024-01-15T08:20:00Z")];
        let conn = convert_connection(&raw_connection("c2", walk_only)).unwrap();
        assert_eq!(conn.transfers(), 0);
    }

    #[test]
    fn rejects_bad_instant() {
        let ride = raw_leg("RIDE", "yesterday", "2024-01-15T08:40:00Z");
        let err = convert_connection(&raw_connection("c1", vec![ride])).unwrap_err();
        assert!(matches!(
            err,
            ConversionError::InvalidInstant {
                field: "departure",
                ..
            }
        ));
    }

    #[test]
    fn rejects_empty_and_inverted() {
        let err = convert_connection(&raw_connection("c1", vec![])).unwrap_err();
        assert!(matches!(
            err,
            ConversionError::Domain(DomainError::EmptyConnection)
        ));

        let ride = raw_leg("RIDE", "2024-01-15T08:00:00Z", "2024-01-15T08:40:00Z");
        let mut raw = raw_connection("c2", vec![ride]);
        raw.start = Some("2024-01-15T09:00:00Z".into());
        let err = convert_connection(&raw).unwrap_err();
        assert!(matches!(
            err,
            ConversionError::Domain(DomainError::EndBeforeStart { .. })
        ));
    }

    #[test]
    fn list_conversion_skips_malformed() {
        let good = raw_connection(
            "good",
            vec![raw_leg("RIDE", "2024-01-15T08:00:00Z", "2024-01-15T08:40:00Z")],
        );
        let bad = raw_connection(
            "bad",
            vec![raw_leg("RIDE", "2024-01-15T08:40:00Z", "2024-01-15T08:00:00Z")],
        );
        let empty = raw_connection("empty", vec![]);

        let converted = convert_connections(&[bad, good, empty], Direction::ToActivity);
        assert_eq!(converted.len(), 1);
        assert_eq!(converted[0].id().as_str(), "good");
    }
}
